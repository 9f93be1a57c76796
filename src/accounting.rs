use crate::fees::FeeResolver;
use crate::instrument::classify;
use crate::types::{ClosedTrade, Lot, LotMutation, PRICE_ID_TOLERANCE};
use chrono::NaiveDate;
use thiserror::Error;

/// A request to sell part or all of one open lot.
#[derive(Debug, Clone)]
pub struct SellRequest {
    pub ticker: String,
    pub acquired: NaiveDate,
    /// Disambiguates between lots opened the same day at different prices.
    /// When set, the stored acquisition price must match within tolerance.
    pub price_hint: Option<f64>,
    pub quantity: u32,
    pub sale_price: f64,
    pub sale_date: NaiveDate,
}

/// What a successful sale produces: the trade to append to the history and
/// the mutation the store must apply to the originating lot. Both come
/// together or not at all.
#[derive(Debug, Clone, PartialEq)]
pub struct SellOutcome {
    pub trade: ClosedTrade,
    pub mutation: LotMutation,
}

#[derive(Debug, Error)]
pub enum AccountingError {
    #[error("no open lot matches {ticker} acquired {acquired}")]
    LotNotFound { ticker: String, acquired: NaiveDate },
    #[error("lot holds {available} units, cannot sell {requested}")]
    InsufficientQuantity { requested: u32, available: u32 },
    #[error("sell quantity must be at least 1")]
    InvalidQuantity,
}

/// Resolves a sell request against the open lots and computes the realized
/// result after fees on both legs. Pure: identical inputs produce identical
/// outcomes, and no mutation is emitted on any error path.
pub fn sell(
    open_lots: &[Lot],
    request: &SellRequest,
    fees: &FeeResolver,
) -> Result<SellOutcome, AccountingError> {
    if request.quantity == 0 {
        return Err(AccountingError::InvalidQuantity);
    }

    let lot = open_lots
        .iter()
        .find(|lot| {
            lot.ticker == request.ticker
                && lot.acquired == request.acquired
                && request
                    .price_hint
                    .map(|hint| (lot.price - hint).abs() <= PRICE_ID_TOLERANCE)
                    .unwrap_or(true)
        })
        .ok_or_else(|| AccountingError::LotNotFound {
            ticker: request.ticker.clone(),
            acquired: request.acquired,
        })?;

    if request.quantity > lot.quantity {
        return Err(AccountingError::InsufficientQuantity {
            requested: request.quantity,
            available: lot.quantity,
        });
    }

    let instrument = classify(&lot.ticker);
    let divisor = instrument.price_divisor();
    let quantity = f64::from(request.quantity);

    let gross_buy = lot.price * quantity / divisor;
    let gross_sell = request.sale_price * quantity / divisor;

    let cost_basis = gross_buy + fees.transaction_cost(gross_buy, lot.broker, instrument);
    let net_proceeds = gross_sell - fees.transaction_cost(gross_sell, lot.broker, instrument);

    let trade = ClosedTrade {
        ticker: lot.ticker.clone(),
        acquired: lot.acquired,
        acquisition_price: lot.price,
        sale_date: request.sale_date,
        sale_price: request.sale_price,
        quantity: request.quantity,
        cost_basis,
        net_proceeds,
        realized_result: net_proceeds - cost_basis,
        broker: lot.broker,
    };

    let mutation = if request.quantity == lot.quantity {
        LotMutation::Delete(lot.id())
    } else {
        LotMutation::SetQuantity {
            id: lot.id(),
            quantity: lot.quantity - request.quantity,
        }
    };

    Ok(SellOutcome { trade, mutation })
}
