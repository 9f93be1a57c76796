use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use thiserror::Error;

pub mod iol;
pub mod snapshot;

/// Daily closes in chronological order.
pub type PriceSeries = Vec<(NaiveDate, f64)>;
pub type PriceHistory = HashMap<String, PriceSeries>;

/// Source of quotes and daily history. Consumers treat a ticker absent
/// from the returned map as "price missing", never as zero.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn current_prices(
        &self,
        tickers: &[String],
    ) -> Result<HashMap<String, f64>, MarketDataError>;

    async fn daily_history(
        &self,
        tickers: &[String],
        days: i64,
    ) -> Result<PriceHistory, MarketDataError>;
}

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("authentication against `{0}` failed: {1}")]
    AuthFailure(String, String),
    #[error("request to `{0}` failed: {1}")]
    RequestFailure(String, String),
}
