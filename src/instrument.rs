/// Instrument class of a BYMA ticker. Bonds are quoted per 100 of face
/// value, so their monetary math uses a price divisor of 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instrument {
    Equity,
    Bond,
}

impl Instrument {
    pub fn price_divisor(self) -> f64 {
        match self {
            Instrument::Equity => 1.0,
            Instrument::Bond => 100.0,
        }
    }
}

/// Sovereign bond series open with these prefixes followed by a maturity
/// year, e.g. AL30, GD35, AE38 (and their D-suffixed dollar legs).
const SOVEREIGN_PREFIXES: [&str; 3] = ["AL", "GD", "AE"];

/// Older bond mnemonics that carry no digit and would otherwise pass as
/// equities.
const LEGACY_BONDS: [&str; 4] = ["PARP", "PARA", "DICP", "CUAP"];

/// Classifies a ticker by mnemonic pattern. The digit requirement keeps
/// equities that share a sovereign prefix (ALUA vs AL30) out of the bond
/// bucket. Anything unrecognized defaults to Equity.
pub fn classify(ticker: &str) -> Instrument {
    let symbol = ticker
        .trim()
        .to_uppercase()
        .trim_end_matches(".BA")
        .to_string();

    if LEGACY_BONDS.contains(&symbol.as_str()) {
        return Instrument::Bond;
    }

    let has_digit = symbol.chars().any(|c| c.is_ascii_digit());
    if has_digit
        && SOVEREIGN_PREFIXES
            .iter()
            .any(|prefix| symbol.starts_with(prefix))
    {
        return Instrument::Bond;
    }

    Instrument::Equity
}
