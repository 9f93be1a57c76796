use crate::fees::Broker;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Two lots of the same ticker may open on the same day, so the acquisition
/// price is part of the identity. Prices come back from the store as floats,
/// so identity comparison uses an absolute tolerance.
pub const PRICE_ID_TOLERANCE: f64 = 0.01;

/// An open position slice: a quantity of one instrument bought at one price
/// on one date, tracked until fully sold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lot {
    pub ticker: String,
    pub acquired: NaiveDate,
    pub quantity: u32,
    pub price: f64,
    #[serde(default)]
    pub broker: Broker,
    /// Take-profit alert threshold. 0.0 means not configured.
    #[serde(default)]
    pub take_profit: f64,
    /// Stop-loss alert threshold. 0.0 means not configured.
    #[serde(default)]
    pub stop_loss: f64,
}

impl Lot {
    pub fn id(&self) -> LotId {
        LotId {
            ticker: self.ticker.clone(),
            acquired: self.acquired,
            price: self.price,
        }
    }
}

/// The identity tuple of a lot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotId {
    pub ticker: String,
    pub acquired: NaiveDate,
    pub price: f64,
}

impl LotId {
    pub fn matches(&self, lot: &Lot) -> bool {
        lot.ticker == self.ticker
            && lot.acquired == self.acquired
            && (lot.price - self.price).abs() <= PRICE_ID_TOLERANCE
    }
}

impl std::fmt::Display for LotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} @ {:.2}", self.ticker, self.acquired, self.price)
    }
}

/// Immutable record of a completed sale, full or partial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedTrade {
    pub ticker: String,
    pub acquired: NaiveDate,
    pub acquisition_price: f64,
    pub sale_date: NaiveDate,
    pub sale_price: f64,
    pub quantity: u32,
    /// Acquisition gross plus acquisition-side fees.
    pub cost_basis: f64,
    /// Sale gross minus sale-side fees.
    pub net_proceeds: f64,
    pub realized_result: f64,
    pub broker: Broker,
}

/// The store-side change a successful sale requires. The engine never
/// persists anything itself; the caller applies this through the store.
#[derive(Debug, Clone, PartialEq)]
pub enum LotMutation {
    /// The lot was fully sold and must be removed.
    Delete(LotId),
    /// The lot was partially sold; this is its remaining quantity.
    SetQuantity { id: LotId, quantity: u32 },
}

/// Uppercases a raw ticker and appends the `.BA` suffix to short local
/// mnemonics, so that "ggal" and "GGAL.BA" name the same instrument.
pub fn normalize_ticker(raw: &str) -> String {
    let t = raw.trim().to_uppercase();
    if !t.ends_with(".BA") && t.len() < 9 {
        format!("{t}.BA")
    } else {
        t
    }
}
