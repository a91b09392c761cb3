//! Mock price provider for testing without network calls.

use super::{FeeSource, PriceProvider, ProviderError};
use crate::domain::{Currency, Decimal, PricePoint, RecommendedFees};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Mock provider that returns predefined prices, history, and fees.
#[derive(Debug, Default)]
pub struct MockProvider {
    spot: BTreeMap<Currency, Decimal>,
    history: BTreeMap<Currency, Vec<PricePoint>>,
    supported: Vec<Currency>,
    supports_history: bool,
    fees: Option<RecommendedFees>,
    failure: Option<ProviderError>,
    spot_calls: AtomicUsize,
    history_calls: AtomicUsize,
}

impl MockProvider {
    /// Create a new mock provider with no data.
    pub fn new() -> Self {
        Self {
            supports_history: true,
            ..Default::default()
        }
    }

    /// Set the spot rate returned for a currency.
    pub fn with_spot(mut self, currency: Currency, rate: Decimal) -> Self {
        if !self.supported.contains(&currency) {
            self.supported.push(currency.clone());
            self.supported.sort();
        }
        self.spot.insert(currency, rate);
        self
    }

    /// Set the history series returned for a currency.
    pub fn with_history(mut self, currency: Currency, points: Vec<PricePoint>) -> Self {
        self.history.insert(currency, points);
        self
    }

    /// Override the supported currency list.
    pub fn with_supported(mut self, currencies: Vec<Currency>) -> Self {
        self.supported = currencies;
        self.supported.sort();
        self
    }

    /// Mark the provider as history-less, like Mempool.space.
    pub fn without_history(mut self) -> Self {
        self.supports_history = false;
        self
    }

    /// Set the recommended fees returned by the fee source.
    pub fn with_fees(mut self, fees: RecommendedFees) -> Self {
        self.fees = Some(fees);
        self
    }

    /// Make every call fail with the given error.
    pub fn failing(mut self, error: ProviderError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Number of spot fetches that reached this provider.
    pub fn spot_call_count(&self) -> usize {
        self.spot_calls.load(Ordering::SeqCst)
    }

    /// Number of history fetches that reached this provider.
    pub fn history_call_count(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }

    fn check_failure(&self) -> Result<(), ProviderError> {
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PriceProvider for MockProvider {
    async fn fetch_spot_prices(
        &self,
        currencies: &[Currency],
    ) -> Result<BTreeMap<Currency, Decimal>, ProviderError> {
        self.spot_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;

        Ok(currencies
            .iter()
            .filter_map(|c| self.spot.get(c).map(|rate| (c.clone(), *rate)))
            .collect())
    }

    async fn fetch_supported_currencies(&self) -> Result<Vec<Currency>, ProviderError> {
        self.check_failure()?;
        Ok(self.supported.clone())
    }

    async fn fetch_price_history(
        &self,
        currency: &Currency,
        _days: u32,
    ) -> Result<Vec<PricePoint>, ProviderError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;

        if !self.supports_history {
            return Err(ProviderError::HistoryUnsupported {
                provider: "Mock".to_string(),
            });
        }
        self.history
            .get(currency)
            .cloned()
            .ok_or_else(|| ProviderError::Parse(format!("no history fixture for {}", currency)))
    }

    fn supports_history(&self) -> bool {
        self.supports_history
    }
}

#[async_trait]
impl FeeSource for MockProvider {
    async fn fetch_recommended_fees(&self) -> Result<RecommendedFees, ProviderError> {
        self.check_failure()?;
        self.fees.ok_or_else(|| {
            ProviderError::Parse("no fees fixture configured".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TimeMs;

    fn usd() -> Currency {
        Currency::parse("usd").unwrap()
    }

    #[tokio::test]
    async fn test_mock_spot_filters_requested() {
        let mock = MockProvider::new()
            .with_spot(usd(), Decimal::from_u64(100_000))
            .with_spot(Currency::parse("eur").unwrap(), Decimal::from_u64(90_000));

        let prices = mock
            .fetch_spot_prices(&[usd(), Currency::parse("thb").unwrap()])
            .await
            .unwrap();
        assert_eq!(prices.len(), 1);
        assert_eq!(prices[&usd()], Decimal::from_u64(100_000));
        assert_eq!(mock.spot_call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_history_and_counter() {
        let points = vec![PricePoint::new(TimeMs::new(0), Decimal::from_u64(50_000))];
        let mock = MockProvider::new().with_history(usd(), points.clone());

        let fetched = mock.fetch_price_history(&usd(), 30).await.unwrap();
        assert_eq!(fetched, points);
        assert_eq!(mock.history_call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_without_history() {
        let mock = MockProvider::new().without_history();
        assert!(!mock.supports_history());
        let result = mock.fetch_price_history(&usd(), 30).await;
        assert!(matches!(
            result,
            Err(ProviderError::HistoryUnsupported { .. })
        ));
    }

    #[tokio::test]
    async fn test_mock_failing() {
        let mock = MockProvider::new()
            .with_spot(usd(), Decimal::from_u64(100_000))
            .failing(ProviderError::RateLimited);
        let result = mock.fetch_spot_prices(&[usd()]).await;
        assert!(matches!(result, Err(ProviderError::RateLimited)));
    }
}
