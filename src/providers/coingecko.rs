//! CoinGecko API client implementation.

use super::http::fetch_json;
use super::{PriceProvider, ProviderError};
use crate::domain::{Currency, Decimal, PricePoint, TimeMs};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// One day in milliseconds, for downsampling interval detection.
const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// CoinGecko price provider using the free v3 API.
///
/// An optional demo API key is sent as the `x-cg-demo-api-key` header.
#[derive(Debug, Clone)]
pub struct CoingeckoProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl CoingeckoProvider {
    /// Create a new CoinGecko provider.
    pub fn new(client: Client, base_url: String, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }

    /// Create with the default CoinGecko API URL and no API key.
    pub fn default_url(client: Client) -> Self {
        Self::new(
            client,
            "https://api.coingecko.com/api/v3".to_string(),
            None,
        )
    }

    async fn get_json(&self, path_and_query: &str) -> Result<serde_json::Value, ProviderError> {
        let mut request = self
            .client
            .get(format!("{}/{}", self.base_url, path_and_query));
        if let Some(key) = &self.api_key {
            request = request.header("x-cg-demo-api-key", key);
        }
        fetch_json(request).await
    }
}

#[async_trait]
impl PriceProvider for CoingeckoProvider {
    async fn fetch_spot_prices(
        &self,
        currencies: &[Currency],
    ) -> Result<BTreeMap<Currency, Decimal>, ProviderError> {
        let vs_currencies = currencies
            .iter()
            .map(Currency::as_str)
            .collect::<Vec<_>>()
            .join(",");
        debug!("Fetching CoinGecko spot prices for {}", vs_currencies);

        let response = self
            .get_json(&format!(
                "simple/price?ids=bitcoin&vs_currencies={}",
                vs_currencies
            ))
            .await?;

        parse_spot_prices(&response, currencies)
    }

    async fn fetch_supported_currencies(&self) -> Result<Vec<Currency>, ProviderError> {
        debug!("Fetching CoinGecko supported currencies");

        let response = self.get_json("simple/supported_vs_currencies").await?;

        let codes = response
            .as_array()
            .ok_or_else(|| ProviderError::Parse("Expected array response".to_string()))?;

        let mut currencies = Vec::new();
        for code in codes {
            let code_str = code
                .as_str()
                .ok_or_else(|| ProviderError::Parse("Expected string currency code".to_string()))?;
            match Currency::parse(code_str) {
                Ok(currency) => currencies.push(currency),
                Err(e) => warn!("Skipping unparseable currency code: {}", e),
            }
        }
        currencies.sort();
        Ok(currencies)
    }

    async fn fetch_price_history(
        &self,
        currency: &Currency,
        days: u32,
    ) -> Result<Vec<PricePoint>, ProviderError> {
        debug!(
            "Fetching CoinGecko price history for {} over {} days",
            currency, days
        );

        let response = self
            .get_json(&format!(
                "coins/bitcoin/market_chart?vs_currency={}&days={}&interval=daily",
                currency, days
            ))
            .await?;

        let points = parse_history(&response)?;
        Ok(downsample_to_daily(points))
    }
}

fn parse_spot_prices(
    response: &serde_json::Value,
    requested: &[Currency],
) -> Result<BTreeMap<Currency, Decimal>, ProviderError> {
    let bitcoin = response
        .get("bitcoin")
        .and_then(|v| v.as_object())
        .ok_or_else(|| ProviderError::Parse("Missing bitcoin object".to_string()))?;

    let mut prices = BTreeMap::new();
    for currency in requested {
        if let Some(rate) = bitcoin.get(currency.as_str()) {
            let rate = parse_rate(rate)?;
            prices.insert(currency.clone(), rate);
        }
    }
    Ok(prices)
}

fn parse_history(response: &serde_json::Value) -> Result<Vec<PricePoint>, ProviderError> {
    let prices = response
        .get("prices")
        .and_then(|v| v.as_array())
        .ok_or_else(|| ProviderError::Parse("Missing prices array".to_string()))?;

    let mut points = Vec::with_capacity(prices.len());
    for pair in prices {
        let pair = pair
            .as_array()
            .filter(|p| p.len() == 2)
            .ok_or_else(|| ProviderError::Parse("Expected [ms, rate] pair".to_string()))?;
        let time_ms = pair[0]
            .as_i64()
            .or_else(|| pair[0].as_f64().map(|f| f as i64))
            .ok_or_else(|| ProviderError::Parse("Invalid history timestamp".to_string()))?;
        let rate = parse_rate(&pair[1])?;
        points.push(PricePoint::new(TimeMs::new(time_ms), rate));
    }
    Ok(points)
}

fn parse_rate(value: &serde_json::Value) -> Result<Decimal, ProviderError> {
    // CoinGecko sends rates as JSON numbers; go through the decimal string
    // form to avoid float drift where the payload allows it.
    if let Some(s) = value.as_str() {
        return Decimal::from_str_canonical(s)
            .map_err(|e| ProviderError::Parse(format!("Invalid rate: {}", e)));
    }
    if value.is_number() {
        return Decimal::from_str_canonical(&value.to_string())
            .map_err(|e| ProviderError::Parse(format!("Invalid rate: {}", e)));
    }
    Err(ProviderError::Parse("Invalid rate value".to_string()))
}

/// Thin a sub-daily series to daily granularity by keeping every 24th point.
///
/// CoinGecko serves hourly points for some ranges even when daily interval is
/// requested; already-daily series are returned untouched.
fn downsample_to_daily(points: Vec<PricePoint>) -> Vec<PricePoint> {
    let spacing = match (points.first(), points.get(1)) {
        (Some(a), Some(b)) => b.time_ms.as_i64() - a.time_ms.as_i64(),
        _ => return points,
    };
    // Allow slack for upstream jitter around the 24h boundary.
    if spacing >= DAY_MS - DAY_MS / 24 {
        return points;
    }
    points.into_iter().step_by(24).collect()
}
