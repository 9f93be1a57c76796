#![allow(dead_code)]

use cartera::fees::{Broker, FeeConfig, FeeResolver};
use cartera::types::Lot;
use chrono::NaiveDate;

pub fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

/// IOL at 0.45%, 21% VAT, 0.05% equity levy, 0.01% bond levy.
pub fn fee_config() -> FeeConfig {
    FeeConfig {
        vat: 1.21,
        equity_levy: 0.0005,
        bond_levy: 0.0001,
        iol_rate: 0.0045,
        ..FeeConfig::default()
    }
}

pub fn resolver() -> FeeResolver {
    FeeResolver::new(fee_config())
}

/// 10 GGAL bought at 100 through IOL.
pub fn ggal_lot() -> Lot {
    Lot {
        ticker: "GGAL.BA".to_string(),
        acquired: date("2024-01-01"),
        quantity: 10,
        price: 100.0,
        broker: Broker::Iol,
        take_profit: 0.0,
        stop_loss: 0.0,
    }
}

/// 1000 nominals of AL30 bought at 50 through Cocos (zero commission).
pub fn al30_lot() -> Lot {
    Lot {
        ticker: "AL30.BA".to_string(),
        acquired: date("2024-02-01"),
        quantity: 1000,
        price: 50.0,
        broker: Broker::Cocos,
        take_profit: 0.0,
        stop_loss: 0.0,
    }
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
