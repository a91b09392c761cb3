//! Price facade: delegates to the active provider and caches results.
//!
//! Spot rates live in a per-currency TTL cache; history series in a plain
//! memo keyed by `(currency, days)`. Both caches are cleared when the active
//! provider changes so a switch never serves another provider's data.

use crate::domain::{Currency, Decimal, PricePoint, RecommendedFees};
use crate::providers::{
    FeeSource, ProviderError, ProviderInfo, ProviderKind, ProviderRegistry, UnknownProvider,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone, Copy)]
struct SpotEntry {
    rate: Decimal,
    fetched_at: Instant,
}

/// The price-fetching service the rest of the app talks to.
///
/// Owns the provider registry plus the two caches. Lock sections are short
/// and never held across a fetch; duplicate concurrent fetches for the same
/// key are tolerated (last write wins).
#[derive(Debug)]
pub struct PriceService {
    registry: Arc<ProviderRegistry>,
    fees: Arc<dyn FeeSource>,
    spot_ttl: Duration,
    spot_cache: Mutex<HashMap<Currency, SpotEntry>>,
    history_cache: Mutex<HashMap<(Currency, u32), Arc<[PricePoint]>>>,
}

impl PriceService {
    /// Create a price service over a registry and fee source.
    pub fn new(registry: Arc<ProviderRegistry>, fees: Arc<dyn FeeSource>, spot_ttl: Duration) -> Self {
        Self {
            registry,
            fees,
            spot_ttl,
            spot_cache: Mutex::new(HashMap::new()),
            history_cache: Mutex::new(HashMap::new()),
        }
    }

    /// Current BTC prices for the requested currencies.
    ///
    /// Fresh cache entries are served directly; the missing or stale
    /// currencies are fetched from the active provider in one call and
    /// merged in. Currencies the provider cannot quote are omitted.
    pub async fn spot_prices(
        &self,
        currencies: &[Currency],
    ) -> Result<BTreeMap<Currency, Decimal>, ProviderError> {
        let mut result = BTreeMap::new();
        let mut missing = Vec::new();
        {
            let cache = self.spot_cache.lock().expect("spot cache lock poisoned");
            for currency in currencies {
                match cache.get(currency) {
                    Some(entry) if entry.fetched_at.elapsed() < self.spot_ttl => {
                        result.insert(currency.clone(), entry.rate);
                    }
                    _ => missing.push(currency.clone()),
                }
            }
        }

        if missing.is_empty() {
            return Ok(result);
        }

        debug!(
            "Fetching spot prices for {} currencies from {}",
            missing.len(),
            self.registry.active_kind()
        );
        let fetched = self.registry.active().fetch_spot_prices(&missing).await?;

        let now = Instant::now();
        let mut cache = self.spot_cache.lock().expect("spot cache lock poisoned");
        for (currency, rate) in fetched {
            cache.insert(
                currency.clone(),
                SpotEntry {
                    rate,
                    fetched_at: now,
                },
            );
            result.insert(currency, rate);
        }
        Ok(result)
    }

    /// Current BTC price in one currency, or `None` when the active provider
    /// does not quote it.
    pub async fn spot_price(&self, currency: &Currency) -> Result<Option<Decimal>, ProviderError> {
        let prices = self.spot_prices(std::slice::from_ref(currency)).await?;
        Ok(prices.get(currency).copied())
    }

    /// Price history for `currency` over the last `days` days, memoized.
    pub async fn price_history(
        &self,
        currency: &Currency,
        days: u32,
    ) -> Result<Arc<[PricePoint]>, ProviderError> {
        let key = (currency.clone(), days);
        {
            let cache = self
                .history_cache
                .lock()
                .expect("history cache lock poisoned");
            if let Some(points) = cache.get(&key) {
                debug!("Using cached history for {} over {} days", currency, days);
                return Ok(points.clone());
            }
        }

        debug!(
            "Fetching history for {} over {} days from {}",
            currency,
            days,
            self.registry.active_kind()
        );
        let points: Arc<[PricePoint]> = self
            .registry
            .active()
            .fetch_price_history(currency, days)
            .await?
            .into();

        self.history_cache
            .lock()
            .expect("history cache lock poisoned")
            .insert(key, points.clone());
        Ok(points)
    }

    /// Currencies the active provider can quote.
    pub async fn supported_currencies(&self) -> Result<Vec<Currency>, ProviderError> {
        self.registry.active().fetch_supported_currencies().await
    }

    /// Recommended on-chain fee rates, always served by Mempool.space
    /// regardless of the active price provider.
    pub async fn recommended_fees(&self) -> Result<RecommendedFees, ProviderError> {
        self.fees.fetch_recommended_fees().await
    }

    /// The active provider kind.
    pub fn active_provider(&self) -> ProviderKind {
        self.registry.active_kind()
    }

    /// Whether the active provider can serve price history.
    pub fn active_supports_history(&self) -> bool {
        self.registry.active().supports_history()
    }

    /// List registered providers.
    pub fn provider_list(&self) -> Vec<ProviderInfo> {
        self.registry.list()
    }

    /// Switch the active provider and drop both caches.
    pub fn switch_provider(&self, kind: ProviderKind) -> Result<(), UnknownProvider> {
        self.registry.activate(kind)?;
        self.spot_cache
            .lock()
            .expect("spot cache lock poisoned")
            .clear();
        self.history_cache
            .lock()
            .expect("history cache lock poisoned")
            .clear();
        debug!("Switched active provider to {}", kind);
        Ok(())
    }
}
