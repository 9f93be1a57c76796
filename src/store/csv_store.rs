use super::{LotStore, StoreError};
use crate::types::{normalize_ticker, ClosedTrade, Lot, LotId};
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Lot store backed by two CSV files: one with the open lots, one with the
/// append-only closed-trade history. Mutations are read-modify-write over
/// the whole portfolio file; fine for a personal portfolio of a few dozen
/// rows.
pub struct CsvStore {
    portfolio_path: PathBuf,
    history_path: PathBuf,
}

impl CsvStore {
    pub fn new(portfolio_path: impl Into<PathBuf>, history_path: impl Into<PathBuf>) -> Self {
        Self {
            portfolio_path: portfolio_path.into(),
            history_path: history_path.into(),
        }
    }

    fn read_lots(&self) -> Result<Vec<Lot>, StoreError> {
        if !self.portfolio_path.exists() {
            return Ok(Vec::new());
        }
        let mut rdr = ReaderBuilder::new()
            .from_path(&self.portfolio_path)
            .map_err(|err| read_error(&self.portfolio_path, err))?;

        let mut lots = Vec::new();
        for result in rdr.deserialize::<Lot>() {
            match result {
                Ok(mut lot) => {
                    // Hand-edited files carry lowercase or suffix-less
                    // tickers; normalize on the way in.
                    lot.ticker = normalize_ticker(&lot.ticker);
                    if lot.quantity == 0 {
                        warn!("Skipping zero-quantity lot row for {}", lot.ticker);
                        continue;
                    }
                    lots.push(lot);
                }
                Err(err) => warn!(
                    "Skipping malformed row in {}: {err}",
                    self.portfolio_path.display()
                ),
            }
        }
        Ok(lots)
    }

    fn write_lots(&self, lots: &[Lot]) -> Result<(), StoreError> {
        let mut wtr = WriterBuilder::new()
            .from_path(&self.portfolio_path)
            .map_err(|err| write_error(&self.portfolio_path, err))?;
        for lot in lots {
            wtr.serialize(lot)
                .map_err(|err| write_error(&self.portfolio_path, err))?;
        }
        wtr.flush()
            .map_err(|err| write_error(&self.portfolio_path, err))
    }

    /// Loads, edits in place and rewrites the portfolio file.
    fn edit_lot<F>(&self, id: &LotId, edit: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Vec<Lot>, usize),
    {
        let mut lots = self.read_lots()?;
        let index = lots
            .iter()
            .position(|lot| id.matches(lot))
            .ok_or_else(|| StoreError::LotNotFound(id.clone()))?;
        edit(&mut lots, index);
        self.write_lots(&lots)
    }
}

impl LotStore for CsvStore {
    fn list_open_lots(&self) -> Result<Vec<Lot>, StoreError> {
        self.read_lots()
    }

    fn add_lot(&mut self, mut lot: Lot) -> Result<(), StoreError> {
        lot.ticker = normalize_ticker(&lot.ticker);
        let mut lots = self.read_lots()?;
        lots.push(lot);
        self.write_lots(&lots)
    }

    fn append_closed_trade(&mut self, trade: &ClosedTrade) -> Result<(), StoreError> {
        let needs_headers = self
            .history_path
            .metadata()
            .map(|m| m.len() == 0)
            .unwrap_or(true);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.history_path)
            .map_err(|err| write_error(&self.history_path, err))?;
        let mut wtr = WriterBuilder::new()
            .has_headers(needs_headers)
            .from_writer(file);
        wtr.serialize(trade)
            .map_err(|err| write_error(&self.history_path, err))?;
        wtr.flush()
            .map_err(|err| write_error(&self.history_path, err))
    }

    fn list_closed_trades(&self) -> Result<Vec<ClosedTrade>, StoreError> {
        if !self.history_path.exists() {
            return Ok(Vec::new());
        }
        let mut rdr = ReaderBuilder::new()
            .from_path(&self.history_path)
            .map_err(|err| read_error(&self.history_path, err))?;
        let mut trades = Vec::new();
        for result in rdr.deserialize::<ClosedTrade>() {
            match result {
                Ok(trade) => trades.push(trade),
                Err(err) => warn!(
                    "Skipping malformed row in {}: {err}",
                    self.history_path.display()
                ),
            }
        }
        Ok(trades)
    }

    fn mutate_lot_quantity(&mut self, id: &LotId, new_quantity: u32) -> Result<(), StoreError> {
        self.edit_lot(id, |lots, index| {
            if new_quantity == 0 {
                lots.remove(index);
            } else {
                lots[index].quantity = new_quantity;
            }
        })
    }

    fn delete_lot(&mut self, id: &LotId) -> Result<(), StoreError> {
        self.edit_lot(id, |lots, index| {
            lots.remove(index);
        })
    }

    fn update_alerts(
        &mut self,
        id: &LotId,
        take_profit: f64,
        stop_loss: f64,
    ) -> Result<(), StoreError> {
        self.edit_lot(id, |lots, index| {
            lots[index].take_profit = take_profit;
            lots[index].stop_loss = stop_loss;
        })
    }
}

fn read_error(path: &Path, err: impl std::fmt::Display) -> StoreError {
    StoreError::ReadError(path.display().to_string(), err.to_string())
}

fn write_error(path: &Path, err: impl std::fmt::Display) -> StoreError {
    StoreError::WriteError(path.display().to_string(), err.to_string())
}
