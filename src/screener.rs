use crate::market_data::{PriceHistory, PriceSeries};
use std::collections::BTreeMap;

const RSI_PERIOD: usize = 14;
const DRAWDOWN_LONG_WINDOW: usize = 30;
const DRAWDOWN_SHORT_WINDOW: usize = 5;

/// Bond pairs used to derive the MEP dollar, in liquidity order.
const MEP_PAIRS: [(&str, &str); 2] = [("AL30.BA", "AL30D.BA"), ("GD30.BA", "GD30D.BA")];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuySignal {
    Buy,
    Neutral,
}

/// Screening indicators for one ticker, all derived from its daily closes.
/// Drawdowns are negative fractions relative to the window maximum.
#[derive(Debug, Clone)]
pub struct TickerIndicators {
    pub ticker: String,
    pub price: f64,
    pub rsi: f64,
    pub drawdown_30d: f64,
    pub drawdown_5d: f64,
    pub day_change: f64,
    /// |30-day drawdown| + |5-day drawdown|; the dip-buying score.
    pub combined_drawdown: f64,
    pub signal: BuySignal,
}

/// Scores every ticker in the history and sorts buy candidates first,
/// deepest combined drawdown on top. Tickers with an empty series are
/// dropped.
pub fn screen(history: &PriceHistory) -> Vec<TickerIndicators> {
    let mut rows: Vec<TickerIndicators> = history
        .iter()
        .filter_map(|(ticker, series)| indicators(ticker, series))
        .collect();
    rows.sort_by(|a, b| {
        let by_signal = (a.signal == BuySignal::Neutral).cmp(&(b.signal == BuySignal::Neutral));
        by_signal.then(
            b.combined_drawdown
                .partial_cmp(&a.combined_drawdown)
                .unwrap_or(std::cmp::Ordering::Equal),
        )
    });
    rows
}

fn indicators(ticker: &str, series: &PriceSeries) -> Option<TickerIndicators> {
    let closes: Vec<f64> = series.iter().map(|(_, close)| *close).collect();
    let price = *closes.last()?;

    let mut rsi_value = 0.0;
    let mut drawdown_30d = 0.0;
    let mut drawdown_5d = 0.0;
    let mut day_change = 0.0;

    if closes.len() > RSI_PERIOD {
        rsi_value = rsi(&closes, RSI_PERIOD).unwrap_or(0.0);
        drawdown_30d = drawdown(&closes, DRAWDOWN_LONG_WINDOW);
        drawdown_5d = drawdown(&closes, DRAWDOWN_SHORT_WINDOW);
        if closes.len() >= 2 {
            let yesterday = closes[closes.len() - 2];
            if yesterday > 0.0 {
                day_change = price / yesterday - 1.0;
            }
        }
    }

    let combined_drawdown = drawdown_30d.abs() + drawdown_5d.abs();

    Some(TickerIndicators {
        ticker: ticker.to_string(),
        price,
        rsi: rsi_value,
        drawdown_30d,
        drawdown_5d,
        day_change,
        combined_drawdown,
        signal: buy_signal(rsi_value, combined_drawdown),
    })
}

/// A dip is only worth buying when the required pullback grows as momentum
/// weakens: strong RSI tolerates a 10% combined drawdown, weak RSI demands
/// 15%.
fn buy_signal(rsi: f64, combined_drawdown: f64) -> BuySignal {
    let buy = (rsi >= 60.0 && combined_drawdown > 0.10)
        || ((40.0..60.0).contains(&rsi) && combined_drawdown > 0.12)
        || (rsi > 0.0 && rsi < 40.0 && combined_drawdown > 0.15);
    if buy {
        BuySignal::Buy
    } else {
        BuySignal::Neutral
    }
}

/// Wilder-smoothed RSI over the whole series. None until there are more
/// closes than the period.
pub fn rsi(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() <= period {
        return None;
    }

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for pair in closes.windows(2).take(period) {
        let delta = pair[1] - pair[0];
        if delta > 0.0 {
            avg_gain += delta;
        } else {
            avg_loss -= delta;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;

    for pair in closes.windows(2).skip(period) {
        let delta = pair[1] - pair[0];
        let gain = delta.max(0.0);
        let loss = (-delta).max(0.0);
        avg_gain = (avg_gain * (period as f64 - 1.0) + gain) / period as f64;
        avg_loss = (avg_loss * (period as f64 - 1.0) + loss) / period as f64;
    }

    if avg_loss == 0.0 {
        return Some(100.0);
    }
    Some(100.0 - 100.0 / (1.0 + avg_gain / avg_loss))
}

/// Last close relative to the maximum of the trailing window.
fn drawdown(closes: &[f64], window: usize) -> f64 {
    let tail = &closes[closes.len().saturating_sub(window)..];
    let max = tail.iter().copied().fold(f64::MIN, f64::max);
    let last = closes[closes.len() - 1];
    if max > 0.0 {
        last / max - 1.0
    } else {
        0.0
    }
}

/// The MEP dollar implied by a peso/dollar bond pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MepQuote {
    pub rate: f64,
    /// Day-over-day variation of the implied rate.
    pub day_change: f64,
}

/// Implied dollar rate from the first MEP pair with overlapping history.
/// Series are joined by date; days quoted on only one leg are ignored.
pub fn dollar_mep(history: &PriceHistory) -> Option<MepQuote> {
    for (peso_ticker, dollar_ticker) in MEP_PAIRS {
        let (Some(pesos), Some(dollars)) = (history.get(peso_ticker), history.get(dollar_ticker))
        else {
            continue;
        };

        let dollar_by_date: BTreeMap<_, _> = dollars.iter().copied().collect();
        let ratios: Vec<f64> = pesos
            .iter()
            .filter_map(|(date, peso)| {
                let dollar = dollar_by_date.get(date)?;
                (*dollar > 0.0).then(|| peso / dollar)
            })
            .collect();

        if let Some(&rate) = ratios.last() {
            let day_change = if ratios.len() >= 2 && ratios[ratios.len() - 2] > 0.0 {
                rate / ratios[ratios.len() - 2] - 1.0
            } else {
                0.0
            };
            return Some(MepQuote { rate, day_change });
        }
    }
    None
}
