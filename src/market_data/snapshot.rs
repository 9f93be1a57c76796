use super::{MarketDataError, MarketDataProvider, PriceHistory};
use async_trait::async_trait;
use std::collections::HashMap;

/// Provider over a fixed in-memory snapshot. Used by tests and for offline
/// runs; tickers outside the snapshot simply come back absent.
pub struct SnapshotProvider {
    name: String,
    prices: HashMap<String, f64>,
    history: PriceHistory,
}

impl SnapshotProvider {
    pub fn new(name: String, prices: HashMap<String, f64>) -> Self {
        Self {
            name,
            prices,
            history: PriceHistory::new(),
        }
    }

    pub fn with_history(mut self, history: PriceHistory) -> Self {
        self.history = history;
        self
    }
}

#[async_trait]
impl MarketDataProvider for SnapshotProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn current_prices(
        &self,
        tickers: &[String],
    ) -> Result<HashMap<String, f64>, MarketDataError> {
        Ok(tickers
            .iter()
            .filter_map(|t| self.prices.get(t).map(|price| (t.clone(), *price)))
            .collect())
    }

    async fn daily_history(
        &self,
        tickers: &[String],
        _days: i64,
    ) -> Result<PriceHistory, MarketDataError> {
        Ok(tickers
            .iter()
            .filter_map(|t| self.history.get(t).map(|series| (t.clone(), series.clone())))
            .collect())
    }
}
