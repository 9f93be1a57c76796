pub mod accounting;
pub mod config;
pub mod fees;
pub mod instrument;
pub mod market_data;
pub mod screener;
pub mod store;
pub mod types;
pub mod valuation;
