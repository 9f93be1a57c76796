use crate::fees::{Broker, FeeResolver};
use crate::instrument::classify;
use crate::types::Lot;
use chrono::NaiveDate;
use std::collections::HashMap;

/// Sell alert for one open lot, first match wins: a configured stop-loss
/// takes priority over a configured take-profit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SellSignal {
    StopLoss,
    TakeProfit,
    Neutral,
}

/// Mark-to-market figures for one lot at the current quote, computed with
/// the same divisor and fee logic as a real sale.
#[derive(Debug, Clone, PartialEq)]
pub struct Marks {
    pub current_price: f64,
    /// (current price × quantity) / divisor, before exit fees.
    pub market_value: f64,
    /// Acquisition gross plus estimated acquisition-side fees.
    pub cost_basis: f64,
    /// What a sale at the current price would net after fees.
    pub net_exit_value: f64,
    pub gross_gain: f64,
    pub unrealized_gain: f64,
    /// Gross gain over acquisition gross. None when the acquisition gross
    /// is zero.
    pub gross_gain_pct: Option<f64>,
    pub unrealized_gain_pct: Option<f64>,
    pub signal: SellSignal,
}

/// Valuation of one open lot. A ticker absent from the price map yields
/// `PriceMissing` rather than zeros, so a dead quote never masquerades as a
/// flat position.
#[derive(Debug, Clone, PartialEq)]
pub enum Valuation {
    Priced(Marks),
    PriceMissing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LotValuation {
    pub ticker: String,
    pub acquired: NaiveDate,
    pub quantity: u32,
    pub price: f64,
    pub broker: Broker,
    pub valuation: Valuation,
}

/// Values every open lot against one immutable price snapshot. A missing
/// quote degrades that lot only; the rest of the portfolio still values.
pub fn evaluate(
    open_lots: &[Lot],
    prices: &HashMap<String, f64>,
    fees: &FeeResolver,
) -> Vec<LotValuation> {
    open_lots
        .iter()
        .map(|lot| LotValuation {
            ticker: lot.ticker.clone(),
            acquired: lot.acquired,
            quantity: lot.quantity,
            price: lot.price,
            broker: lot.broker,
            valuation: match prices.get(&lot.ticker) {
                Some(&current) => Valuation::Priced(mark(lot, current, fees)),
                None => Valuation::PriceMissing,
            },
        })
        .collect()
}

fn mark(lot: &Lot, current_price: f64, fees: &FeeResolver) -> Marks {
    let instrument = classify(&lot.ticker);
    let divisor = instrument.price_divisor();
    let quantity = f64::from(lot.quantity);

    let gross_buy = lot.price * quantity / divisor;
    let market_value = current_price * quantity / divisor;

    let cost_basis = gross_buy + fees.transaction_cost(gross_buy, lot.broker, instrument);
    let net_exit_value =
        market_value - fees.transaction_cost(market_value, lot.broker, instrument);

    let gross_gain = market_value - gross_buy;
    let unrealized_gain = net_exit_value - cost_basis;

    let gross_gain_pct = (gross_buy != 0.0).then(|| market_value / gross_buy - 1.0);
    let unrealized_gain_pct = (cost_basis != 0.0).then(|| unrealized_gain / cost_basis);

    Marks {
        current_price,
        market_value,
        cost_basis,
        net_exit_value,
        gross_gain,
        unrealized_gain,
        gross_gain_pct,
        unrealized_gain_pct,
        signal: signal_for(lot, current_price),
    }
}

/// Threshold evaluation never fails; a threshold at or below zero is
/// simply not configured, never "trigger at zero price".
fn signal_for(lot: &Lot, current_price: f64) -> SellSignal {
    if lot.stop_loss > 0.0 && current_price <= lot.stop_loss {
        SellSignal::StopLoss
    } else if lot.take_profit > 0.0 && current_price >= lot.take_profit {
        SellSignal::TakeProfit
    } else {
        SellSignal::Neutral
    }
}
