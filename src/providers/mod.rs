//! Price provider abstraction: interchangeable adapters over third-party
//! BTC/fiat price APIs, all exposing the same three-function contract.

use crate::domain::{Currency, Decimal, PricePoint, RecommendedFees};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;

pub mod blockchain;
pub mod coincap;
pub mod coingecko;
mod http;
pub mod mempool;
pub mod mock;
pub mod registry;

pub use blockchain::BlockchainProvider;
pub use coincap::CoincapProvider;
pub use coingecko::CoingeckoProvider;
pub use mempool::MempoolProvider;
pub use mock::MockProvider;
pub use registry::{
    ProviderInfo, ProviderKind, ProviderRegistry, ProviderRegistryBuilder, UnknownProvider,
};

/// Price provider trait: current prices, supported currencies, and price
/// history against a single upstream API.
///
/// Implementations handle retry/backoff and map upstream response shapes to
/// domain types.
#[async_trait]
pub trait PriceProvider: Send + Sync + fmt::Debug {
    /// Fetch the current BTC price in each requested fiat currency.
    ///
    /// Currencies the provider does not cover are omitted from the result
    /// map rather than reported as errors.
    async fn fetch_spot_prices(
        &self,
        currencies: &[Currency],
    ) -> Result<BTreeMap<Currency, Decimal>, ProviderError>;

    /// Fetch the currencies this provider can quote, sorted ascending.
    async fn fetch_supported_currencies(&self) -> Result<Vec<Currency>, ProviderError>;

    /// Fetch an ascending BTC/fiat price series covering the last `days` days.
    async fn fetch_price_history(
        &self,
        currency: &Currency,
        days: u32,
    ) -> Result<Vec<PricePoint>, ProviderError>;

    /// Whether this provider can serve price history at all.
    fn supports_history(&self) -> bool {
        true
    }
}

/// Source of recommended on-chain fee rates.
///
/// Served by Mempool.space regardless of which price provider is active.
#[async_trait]
pub trait FeeSource: Send + Sync + fmt::Debug {
    async fn fetch_recommended_fees(&self) -> Result<RecommendedFees, ProviderError>;
}

/// Error type for provider operations.
#[derive(Debug, Clone)]
pub enum ProviderError {
    /// Network error (e.g., connection timeout, DNS failure)
    Network(String),
    /// HTTP error (e.g., 401 unauthorized, 5xx server error)
    Http { status: u16, message: String },
    /// Parsing error (invalid JSON or malformed response)
    Parse(String),
    /// Rate limit exceeded and retries exhausted
    RateLimited,
    /// The provider cannot serve history for the requested currency (or at all)
    HistoryUnsupported { provider: String },
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Network(msg) => write!(f, "Network error: {}", msg),
            ProviderError::Http { status, message } => {
                write!(f, "HTTP error {}: {}", status, message)
            }
            ProviderError::Parse(msg) => write!(f, "Parse error: {}", msg),
            ProviderError::RateLimited => write!(f, "Rate limited"),
            ProviderError::HistoryUnsupported { provider } => {
                write!(f, "Historical price data is not supported by {}", provider)
            }
        }
    }
}

impl std::error::Error for ProviderError {}
