//! CoinCap API client implementation.

use super::http::fetch_json;
use super::{PriceProvider, ProviderError};
use crate::domain::{Currency, Decimal, PricePoint, TimeMs};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::BTreeMap;
use tracing::debug;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// The subset of CoinCap's `/rates` coverage this provider relies on.
const COVERED_CURRENCIES: [&str; 7] = ["usd", "eur", "gbp", "jpy", "sek", "dkk", "thb"];

/// CoinCap price provider.
///
/// CoinCap quotes BTC in USD only; other fiat prices are derived from its
/// `/rates` endpoint as `priceUsd / rateUsd(currency)`. History is served
/// USD-denominated and refused for other currencies.
#[derive(Debug, Clone)]
pub struct CoincapProvider {
    client: Client,
    base_url: String,
}

impl CoincapProvider {
    /// Create a new CoinCap provider.
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// Create with the default CoinCap API URL.
    pub fn default_url(client: Client) -> Self {
        Self::new(client, "https://api.coincap.io/v2".to_string())
    }

    async fn get_json(&self, path_and_query: &str) -> Result<serde_json::Value, ProviderError> {
        fetch_json(
            self.client
                .get(format!("{}/{}", self.base_url, path_and_query)),
        )
        .await
    }
}

#[async_trait]
impl PriceProvider for CoincapProvider {
    async fn fetch_spot_prices(
        &self,
        currencies: &[Currency],
    ) -> Result<BTreeMap<Currency, Decimal>, ProviderError> {
        debug!("Fetching CoinCap spot prices");

        let needs_rates = currencies
            .iter()
            .any(|c| c.as_str() != "usd" && COVERED_CURRENCIES.contains(&c.as_str()));

        let (asset, rates) = if needs_rates {
            let (asset, rates) = futures::future::try_join(
                self.get_json("assets/bitcoin"),
                self.get_json("rates"),
            )
            .await?;
            (asset, Some(rates))
        } else {
            (self.get_json("assets/bitcoin").await?, None)
        };

        let price_usd = parse_price_usd(&asset)?;
        let fiat_rates = rates.as_ref().map(parse_usd_rates).transpose()?;

        let mut prices = BTreeMap::new();
        for currency in currencies {
            if !COVERED_CURRENCIES.contains(&currency.as_str()) {
                continue;
            }
            if currency.as_str() == "usd" {
                prices.insert(currency.clone(), price_usd);
                continue;
            }
            if let Some(rate_usd) = fiat_rates.as_ref().and_then(|r| r.get(currency)) {
                if rate_usd.is_positive() {
                    prices.insert(currency.clone(), price_usd / *rate_usd);
                }
            }
        }
        Ok(prices)
    }

    async fn fetch_supported_currencies(&self) -> Result<Vec<Currency>, ProviderError> {
        let mut currencies: Vec<Currency> = COVERED_CURRENCIES
            .iter()
            .map(|code| Currency::parse(code).expect("static code is valid"))
            .collect();
        currencies.sort();
        Ok(currencies)
    }

    async fn fetch_price_history(
        &self,
        currency: &Currency,
        days: u32,
    ) -> Result<Vec<PricePoint>, ProviderError> {
        if currency.as_str() != "usd" {
            return Err(ProviderError::HistoryUnsupported {
                provider: "CoinCap".to_string(),
            });
        }
        debug!("Fetching CoinCap price history over {} days", days);

        let end = TimeMs::now().as_i64();
        let start = end - i64::from(days) * DAY_MS;
        let response = self
            .get_json(&format!(
                "assets/bitcoin/history?interval=d1&start={}&end={}",
                start, end
            ))
            .await?;

        parse_history(&response)
    }
}

fn parse_price_usd(response: &serde_json::Value) -> Result<Decimal, ProviderError> {
    let price_str = response
        .get("data")
        .and_then(|d| d.get("priceUsd"))
        .and_then(|v| v.as_str())
        .ok_or_else(|| ProviderError::Parse("Missing priceUsd field".to_string()))?;
    Decimal::from_str_canonical(price_str)
        .map_err(|e| ProviderError::Parse(format!("Invalid priceUsd: {}", e)))
}

/// Parse the `/rates` response into fiat-per-USD rates for covered currencies.
fn parse_usd_rates(
    response: &serde_json::Value,
) -> Result<BTreeMap<Currency, Decimal>, ProviderError> {
    let entries = response
        .get("data")
        .and_then(|v| v.as_array())
        .ok_or_else(|| ProviderError::Parse("Missing rates data array".to_string()))?;

    let mut rates = BTreeMap::new();
    for entry in entries {
        let symbol = match entry.get("symbol").and_then(|v| v.as_str()) {
            Some(s) => s,
            None => continue,
        };
        let currency = match Currency::parse(symbol) {
            Ok(c) if COVERED_CURRENCIES.contains(&c.as_str()) => c,
            _ => continue,
        };
        let rate_str = entry
            .get("rateUsd")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ProviderError::Parse("Missing rateUsd field".to_string()))?;
        let rate = Decimal::from_str_canonical(rate_str)
            .map_err(|e| ProviderError::Parse(format!("Invalid rateUsd: {}", e)))?;
        rates.insert(currency, rate);
    }
    Ok(rates)
}

fn parse_history(response: &serde_json::Value) -> Result<Vec<PricePoint>, ProviderError> {
    let entries = response
        .get("data")
        .and_then(|v| v.as_array())
        .ok_or_else(|| ProviderError::Parse("Missing history data array".to_string()))?;

    let mut points = Vec::with_capacity(entries.len());
    for entry in entries {
        let time_ms = entry
            .get("time")
            .and_then(|v| v.as_i64())
            .ok_or_else(|| ProviderError::Parse("Missing time field".to_string()))?;
        let price_str = entry
            .get("priceUsd")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ProviderError::Parse("Missing priceUsd field".to_string()))?;
        let rate = Decimal::from_str_canonical(price_str)
            .map_err(|e| ProviderError::Parse(format!("Invalid priceUsd: {}", e)))?;
        points.push(PricePoint::new(TimeMs::new(time_ms), rate));
    }
    Ok(points)
}
