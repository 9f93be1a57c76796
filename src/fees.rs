use crate::instrument::Instrument;
use serde::{Deserialize, Serialize};

/// The brokers the fee schedule knows about. Free-text broker names from
/// the store or the CLI are parsed into this closed set; anything
/// unrecognized lands on `Default` so the fallback is visible in the type
/// instead of buried in a map lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Broker {
    Iol,
    Bull,
    Cocos,
    Veta,
    #[default]
    Default,
}

impl Broker {
    /// Case-insensitive parse; unknown names degrade to `Default`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "IOL" => Broker::Iol,
            "BULL" => Broker::Bull,
            "COCOS" => Broker::Cocos,
            "VETA" => Broker::Veta,
            _ => Broker::Default,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Broker::Iol => "IOL",
            Broker::Bull => "BULL",
            Broker::Cocos => "COCOS",
            Broker::Veta => "VETA",
            Broker::Default => "DEFAULT",
        }
    }
}

impl From<String> for Broker {
    fn from(raw: String) -> Self {
        Broker::parse(&raw)
    }
}

impl From<Broker> for String {
    fn from(broker: Broker) -> Self {
        broker.as_str().to_string()
    }
}

impl std::fmt::Display for Broker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static fee schedule, loaded once at startup and immutable afterwards.
/// Rates are fractions of gross notional; `vat` is a multiplier (1.21 for
/// the 21% rate) applied to the broker commission of equity trades only.
#[derive(Debug, Clone, Deserialize)]
pub struct FeeConfig {
    #[serde(default = "default_vat")]
    pub vat: f64,
    /// Market/registry levy on equity trades.
    #[serde(default = "default_equity_levy")]
    pub equity_levy: f64,
    /// Market/registry levy on bond trades, lower than the equity one.
    #[serde(default = "default_bond_levy")]
    pub bond_levy: f64,
    #[serde(default = "default_standard_rate")]
    pub iol_rate: f64,
    #[serde(default = "default_standard_rate")]
    pub bull_rate: f64,
    /// Cocos charges no commission; trades still pay the market levy.
    #[serde(default)]
    pub cocos_rate: f64,
    #[serde(default = "default_veta_rate")]
    pub veta_rate: f64,
    /// Fixed floor on Veta's commission, in pesos.
    #[serde(default = "default_veta_minimum")]
    pub veta_minimum: f64,
    #[serde(default = "default_standard_rate")]
    pub default_rate: f64,
}

fn default_vat() -> f64 {
    1.21
}
fn default_equity_levy() -> f64 {
    0.0008
}
fn default_bond_levy() -> f64 {
    0.0001
}
fn default_standard_rate() -> f64 {
    0.006
}
fn default_veta_rate() -> f64 {
    0.0015
}
fn default_veta_minimum() -> f64 {
    50.0
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            vat: default_vat(),
            equity_levy: default_equity_levy(),
            bond_levy: default_bond_levy(),
            iol_rate: default_standard_rate(),
            bull_rate: default_standard_rate(),
            cocos_rate: 0.0,
            veta_rate: default_veta_rate(),
            veta_minimum: default_veta_minimum(),
            default_rate: default_standard_rate(),
        }
    }
}

impl FeeConfig {
    /// Commission rate and optional minimum-fee floor for a broker.
    fn schedule(&self, broker: Broker) -> (f64, Option<f64>) {
        match broker {
            Broker::Iol => (self.iol_rate, None),
            Broker::Bull => (self.bull_rate, None),
            Broker::Cocos => (self.cocos_rate, None),
            Broker::Veta => (self.veta_rate, Some(self.veta_minimum)),
            Broker::Default => (self.default_rate, None),
        }
    }
}

/// Resolves the total transaction cost of one trade leg.
pub struct FeeResolver {
    config: FeeConfig,
}

impl FeeResolver {
    pub fn new(config: FeeConfig) -> Self {
        Self { config }
    }

    /// Total cost of trading `gross` pesos of notional (already divided by
    /// the instrument's price divisor): broker commission, with the
    /// minimum-fee floor where the broker has one, VAT on the commission for
    /// equities, plus the class-keyed market levy. Bond trades are
    /// VAT-exempt.
    pub fn transaction_cost(&self, gross: f64, broker: Broker, instrument: Instrument) -> f64 {
        let (rate, minimum) = self.config.schedule(broker);

        let mut commission = gross * rate;
        if let Some(floor) = minimum {
            commission = commission.max(floor);
        }

        let (vat, levy) = match instrument {
            Instrument::Equity => (self.config.vat, self.config.equity_levy),
            Instrument::Bond => (1.0, self.config.bond_levy),
        };

        commission * vat + gross * levy
    }
}
