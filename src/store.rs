use crate::types::{ClosedTrade, Lot, LotId, LotMutation};
use thiserror::Error;

pub mod csv_store;

/// Row-shaped persistence for open lots and closed trades. The accounting
/// engine never touches the store; it emits a `LotMutation` and the caller
/// applies it here. A sale's mutation must be applied before the next
/// evaluation pass reads lots, or the same lot could be sold twice.
pub trait LotStore: Send + Sync {
    fn list_open_lots(&self) -> Result<Vec<Lot>, StoreError>;

    /// Registers a buy: appends a new open lot.
    fn add_lot(&mut self, lot: Lot) -> Result<(), StoreError>;

    fn append_closed_trade(&mut self, trade: &ClosedTrade) -> Result<(), StoreError>;

    fn list_closed_trades(&self) -> Result<Vec<ClosedTrade>, StoreError>;

    fn mutate_lot_quantity(&mut self, id: &LotId, new_quantity: u32) -> Result<(), StoreError>;

    fn delete_lot(&mut self, id: &LotId) -> Result<(), StoreError>;

    /// Rewrites a lot's alert thresholds. 0.0 clears a threshold.
    fn update_alerts(
        &mut self,
        id: &LotId,
        take_profit: f64,
        stop_loss: f64,
    ) -> Result<(), StoreError>;

    /// Applies a completed sale: trade first, then the lot mutation.
    fn apply_sale(&mut self, trade: &ClosedTrade, mutation: &LotMutation) -> Result<(), StoreError> {
        self.append_closed_trade(trade)?;
        match mutation {
            LotMutation::Delete(id) => self.delete_lot(id),
            LotMutation::SetQuantity { id, quantity } => self.mutate_lot_quantity(id, *quantity),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("lot {0} not found in store")]
    LotNotFound(LotId),
    #[error("failed to read {0}: {1}")]
    ReadError(String, String),
    #[error("failed to write {0}: {1}")]
    WriteError(String, String),
}
