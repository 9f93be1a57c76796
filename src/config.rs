use std::collections::HashMap;

use crate::fees::FeeConfig;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub store: StoreConfig,
    /// IOL API credentials. Commands that need live quotes fail without
    /// them; pure ledger commands work offline.
    #[serde(default)]
    pub iol: Option<IolCredentials>,
    #[serde(default)]
    pub fees: FeeConfig,
    /// How many calendar days of history to request for the screener.
    #[serde(default = "default_history_days")]
    pub history_days: i64,
    /// Named ticker panels (favorites, leaders, cedears, bonds, ...).
    #[serde(default)]
    pub panels: HashMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct StoreConfig {
    pub portfolio_path: String,
    pub history_path: String,
}

#[derive(Debug, Deserialize)]
pub struct IolCredentials {
    pub username: String,
    pub password: String,
}

fn default_history_days() -> i64 {
    200
}

impl AppConfig {
    pub fn deserialize_from_file(path: &str) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;
        let config = config.try_deserialize()?;
        Ok(config)
    }
}
