use super::{MarketDataError, MarketDataProvider, PriceHistory, PriceSeries};
use async_trait::async_trait;
use chrono::{Duration, Local, NaiveDate};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, warn};

const IOL_BASE_URL: &str = "https://api.invertironline.com";

/// InvertirOnline HTTP provider. Quotes come from the per-symbol
/// `Cotizacion` endpoint, history from `seriehistorica`, both behind an
/// OAuth password-grant token fetched per batch.
pub struct IolProvider {
    name: String,
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Quote {
    ultimo_precio: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryBar {
    fecha_hora: String,
    ultimo_precio: f64,
}

impl IolProvider {
    pub fn new(name: String, username: String, password: String) -> Self {
        Self {
            name,
            http: reqwest::Client::new(),
            base_url: IOL_BASE_URL.to_string(),
            username,
            password,
        }
    }

    async fn token(&self) -> Result<String, MarketDataError> {
        let params = [
            ("username", self.username.as_str()),
            ("password", self.password.as_str()),
            ("grant_type", "password"),
        ];
        let response = self
            .http
            .post(format!("{}/token", self.base_url))
            .form(&params)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| MarketDataError::AuthFailure(self.name.clone(), err.to_string()))?;
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|err| MarketDataError::AuthFailure(self.name.clone(), err.to_string()))?;
        Ok(token.access_token)
    }

    async fn fetch_quote(&self, ticker: &str, token: &str) -> Option<(String, f64)> {
        let url = format!(
            "{}/api/v2/bCBA/Titulos/{}/Cotizacion",
            self.base_url,
            local_symbol(ticker)
        );
        match self.get_json::<Quote>(&url, token).await {
            Ok(quote) => Some((ticker.to_string(), quote.ultimo_precio)),
            Err(err) => {
                warn!("No quote for {ticker}: {err}");
                None
            }
        }
    }

    async fn fetch_history(
        &self,
        ticker: &str,
        token: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Option<(String, PriceSeries)> {
        let url = format!(
            "{}/api/v2/bCBA/Titulos/{}/Cotizacion/seriehistorica/{}/{}/sinAjustar",
            self.base_url,
            local_symbol(ticker),
            from,
            to
        );
        match self.get_json::<Vec<HistoryBar>>(&url, token).await {
            Ok(bars) => {
                let mut series: PriceSeries = bars
                    .iter()
                    .filter_map(|bar| {
                        parse_bar_date(&bar.fecha_hora).map(|d| (d, bar.ultimo_precio))
                    })
                    .collect();
                series.sort_by_key(|(date, _)| *date);
                series.dedup_by_key(|(date, _)| *date);
                Some((ticker.to_string(), series))
            }
            Err(err) => {
                warn!("No history for {ticker}: {err}");
                None
            }
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        token: &str,
    ) -> Result<T, MarketDataError> {
        self.http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| MarketDataError::RequestFailure(self.name.clone(), err.to_string()))?
            .json()
            .await
            .map_err(|err| MarketDataError::RequestFailure(self.name.clone(), err.to_string()))
    }
}

#[async_trait]
impl MarketDataProvider for IolProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn current_prices(
        &self,
        tickers: &[String],
    ) -> Result<HashMap<String, f64>, MarketDataError> {
        let token = self.token().await?;
        debug!("Fetching {} quotes from {}", tickers.len(), self.name);
        let fetches = tickers.iter().map(|t| self.fetch_quote(t, &token));
        let results = futures::future::join_all(fetches).await;
        Ok(results.into_iter().flatten().collect())
    }

    async fn daily_history(
        &self,
        tickers: &[String],
        days: i64,
    ) -> Result<PriceHistory, MarketDataError> {
        let token = self.token().await?;
        let to = Local::now().date_naive();
        let from = to - Duration::days(days);
        let fetches = tickers
            .iter()
            .map(|t| self.fetch_history(t, &token, from, to));
        let results = futures::future::join_all(fetches).await;
        Ok(results.into_iter().flatten().collect())
    }
}

/// IOL takes the plain BYMA symbol, without the `.BA` suffix.
fn local_symbol(ticker: &str) -> String {
    ticker.trim_end_matches(".BA").to_uppercase()
}

/// Bar timestamps arrive as `2024-05-03T17:00:00`; only the date matters.
fn parse_bar_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok()
}
