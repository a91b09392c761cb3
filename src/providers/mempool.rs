//! Mempool.space API client implementation.

use super::http::fetch_json;
use super::{FeeSource, PriceProvider, ProviderError};
use crate::domain::{Currency, Decimal, PricePoint, RecommendedFees};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::BTreeMap;
use tracing::debug;

/// The fiat currencies mempool.space quotes in its `/prices` response.
const COVERED_CURRENCIES: [&str; 7] = ["usd", "eur", "gbp", "cad", "chf", "aud", "jpy"];

/// Mempool.space price provider.
///
/// Quotes a fixed set of currencies, serves no price history, and doubles as
/// the source of recommended on-chain fee rates.
#[derive(Debug, Clone)]
pub struct MempoolProvider {
    client: Client,
    base_url: String,
}

impl MempoolProvider {
    /// Create a new Mempool.space provider.
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// Create with the default mempool.space API URL.
    pub fn default_url(client: Client) -> Self {
        Self::new(client, "https://mempool.space/api/v1".to_string())
    }

    /// The static currency coverage set, sorted ascending.
    pub fn covered_currencies() -> Vec<Currency> {
        let mut currencies: Vec<Currency> = COVERED_CURRENCIES
            .iter()
            .map(|code| Currency::parse(code).expect("static code is valid"))
            .collect();
        currencies.sort();
        currencies
    }

    async fn get_json(&self, path: &str) -> Result<serde_json::Value, ProviderError> {
        fetch_json(self.client.get(format!("{}/{}", self.base_url, path))).await
    }
}

#[async_trait]
impl PriceProvider for MempoolProvider {
    async fn fetch_spot_prices(
        &self,
        currencies: &[Currency],
    ) -> Result<BTreeMap<Currency, Decimal>, ProviderError> {
        debug!("Fetching Mempool.space spot prices");

        let response = self.get_json("prices").await?;
        parse_spot_prices(&response, currencies)
    }

    async fn fetch_supported_currencies(&self) -> Result<Vec<Currency>, ProviderError> {
        Ok(Self::covered_currencies())
    }

    async fn fetch_price_history(
        &self,
        _currency: &Currency,
        _days: u32,
    ) -> Result<Vec<PricePoint>, ProviderError> {
        Err(ProviderError::HistoryUnsupported {
            provider: "Mempool.space".to_string(),
        })
    }

    fn supports_history(&self) -> bool {
        false
    }
}

#[async_trait]
impl FeeSource for MempoolProvider {
    async fn fetch_recommended_fees(&self) -> Result<RecommendedFees, ProviderError> {
        debug!("Fetching Mempool.space recommended fees");

        let response = self.get_json("fees/recommended").await?;
        serde_json::from_value(response)
            .map_err(|e| ProviderError::Parse(format!("Invalid fees response: {}", e)))
    }
}

fn parse_spot_prices(
    response: &serde_json::Value,
    requested: &[Currency],
) -> Result<BTreeMap<Currency, Decimal>, ProviderError> {
    if !response.is_object() {
        return Err(ProviderError::Parse("Expected object response".to_string()));
    }

    // Response keys are uppercase: {"time":1767662705,"USD":93973,"EUR":80220,...}
    let mut prices = BTreeMap::new();
    for currency in requested {
        if !COVERED_CURRENCIES.contains(&currency.as_str()) {
            continue;
        }
        if let Some(rate) = response.get(currency.to_uppercase()) {
            let rate = rate
                .as_f64()
                .and_then(Decimal::from_f64)
                .ok_or_else(|| ProviderError::Parse("Invalid rate value".to_string()))?;
            prices.insert(currency.clone(), rate);
        }
    }
    Ok(prices)
}
