//! Blockchain.info API client implementation.

use super::http::fetch_json;
use super::{PriceProvider, ProviderError};
use crate::domain::{Currency, Decimal, PricePoint, TimeMs};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Blockchain.info price provider.
///
/// Spot prices come from the ticker endpoint; history from the market-price
/// chart API, which is USD-denominated only.
#[derive(Debug, Clone)]
pub struct BlockchainProvider {
    client: Client,
    ticker_url: String,
    charts_url: String,
}

impl BlockchainProvider {
    /// Create a new Blockchain.info provider.
    pub fn new(client: Client, ticker_url: String, charts_url: String) -> Self {
        Self {
            client,
            ticker_url,
            charts_url,
        }
    }

    /// Create with the default Blockchain.info API URLs.
    pub fn default_url(client: Client) -> Self {
        Self::new(
            client,
            "https://blockchain.info".to_string(),
            "https://api.blockchain.info".to_string(),
        )
    }

    async fn get_json(&self, url: &str) -> Result<serde_json::Value, ProviderError> {
        fetch_json(self.client.get(url)).await
    }
}

#[async_trait]
impl PriceProvider for BlockchainProvider {
    async fn fetch_spot_prices(
        &self,
        currencies: &[Currency],
    ) -> Result<BTreeMap<Currency, Decimal>, ProviderError> {
        debug!("Fetching Blockchain.info ticker");

        let url = format!("{}/ticker", self.ticker_url);
        let response = self.get_json(&url).await?;
        parse_ticker(&response, currencies)
    }

    async fn fetch_supported_currencies(&self) -> Result<Vec<Currency>, ProviderError> {
        let url = format!("{}/ticker", self.ticker_url);
        let response = self.get_json(&url).await?;

        let ticker = response
            .as_object()
            .ok_or_else(|| ProviderError::Parse("Expected object response".to_string()))?;

        let mut currencies = Vec::new();
        for key in ticker.keys() {
            match Currency::parse(key) {
                Ok(currency) => currencies.push(currency),
                Err(e) => warn!("Skipping unparseable ticker key: {}", e),
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
        if currency.as_str() != "usd" {
            return Err(ProviderError::HistoryUnsupported {
                provider: "Blockchain.info".to_string(),
            });
        }
        debug!("Fetching Blockchain.info market-price chart over {} days", days);

        let url = format!(
            "{}/charts/market-price?timespan={}days&format=json",
            self.charts_url, days
        );
        let response = self.get_json(&url).await?;
        parse_chart(&response)
    }
}

fn parse_ticker(
    response: &serde_json::Value,
    requested: &[Currency],
) -> Result<BTreeMap<Currency, Decimal>, ProviderError> {
    let ticker = response
        .as_object()
        .ok_or_else(|| ProviderError::Parse("Expected object response".to_string()))?;

    let mut prices = BTreeMap::new();
    for currency in requested {
        if let Some(entry) = ticker.get(&currency.to_uppercase()) {
            let last = entry
                .get("last")
                .and_then(|v| v.as_f64())
                .and_then(Decimal::from_f64)
                .ok_or_else(|| ProviderError::Parse("Invalid ticker last value".to_string()))?;
            prices.insert(currency.clone(), last);
        }
    }
    Ok(prices)
}

fn parse_chart(response: &serde_json::Value) -> Result<Vec<PricePoint>, ProviderError> {
    let values = response
        .get("values")
        .and_then(|v| v.as_array())
        .ok_or_else(|| ProviderError::Parse("Missing chart values array".to_string()))?;

    let mut points = Vec::with_capacity(values.len());
    for value in values {
        // Chart x values are epoch seconds
        let time_s = value
            .get("x")
            .and_then(|v| v.as_i64())
            .ok_or_else(|| ProviderError::Parse("Missing x field".to_string()))?;
        let rate = value
            .get("y")
            .and_then(|v| v.as_f64())
            .and_then(Decimal::from_f64)
            .ok_or_else(|| ProviderError::Parse("Invalid y value".to_string()))?;
        points.push(PricePoint::new(TimeMs::new(time_s * 1000), rate));
    }
    Ok(points)
}
