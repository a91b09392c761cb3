//! Static provider registry with a runtime-switchable active provider.

use super::PriceProvider;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Identifier of a registered price provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Coingecko,
    Mempool,
    Coincap,
    Blockchain,
}

impl ProviderKind {
    /// The stable string id used on the wire and in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Coingecko => "coingecko",
            ProviderKind::Mempool => "mempool",
            ProviderKind::Coincap => "coincap",
            ProviderKind::Blockchain => "blockchain",
        }
    }

    /// Human-readable provider name.
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::Coingecko => "CoinGecko",
            ProviderKind::Mempool => "Mempool.space",
            ProviderKind::Coincap => "CoinCap",
            ProviderKind::Blockchain => "Blockchain.info",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error for provider ids that name no known provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown provider: {0:?}")]
pub struct UnknownProvider(pub String);

impl FromStr for ProviderKind {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "coingecko" => Ok(ProviderKind::Coingecko),
            "mempool" => Ok(ProviderKind::Mempool),
            "coincap" => Ok(ProviderKind::Coincap),
            "blockchain" => Ok(ProviderKind::Blockchain),
            other => Err(UnknownProvider(other.to_string())),
        }
    }
}

/// Listing entry for one registered provider.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub id: ProviderKind,
    pub display_name: &'static str,
    pub supports_history: bool,
}

/// Maps provider kinds to adapters and tracks which one is active.
///
/// The active kind always has a registered adapter: [`ProviderRegistryBuilder::build`]
/// and [`ProviderRegistry::activate`] both enforce it. Switching the active
/// provider is a single assignment behind the lock; cache invalidation on
/// switch is the price service's concern.
#[derive(Debug)]
pub struct ProviderRegistry {
    providers: BTreeMap<ProviderKind, Arc<dyn PriceProvider>>,
    active: RwLock<ProviderKind>,
}

/// Builder for [`ProviderRegistry`]: adapters first, the active kind last.
#[derive(Debug, Default)]
pub struct ProviderRegistryBuilder {
    providers: BTreeMap<ProviderKind, Arc<dyn PriceProvider>>,
}

impl ProviderRegistryBuilder {
    /// Register an adapter under a kind.
    pub fn register(mut self, kind: ProviderKind, provider: Arc<dyn PriceProvider>) -> Self {
        self.providers.insert(kind, provider);
        self
    }

    /// Finish the registry with `active` as the initially-active provider.
    ///
    /// # Errors
    /// Returns an error if no adapter was registered under `active`.
    pub fn build(self, active: ProviderKind) -> Result<ProviderRegistry, UnknownProvider> {
        if !self.providers.contains_key(&active) {
            return Err(UnknownProvider(active.as_str().to_string()));
        }
        Ok(ProviderRegistry {
            providers: self.providers,
            active: RwLock::new(active),
        })
    }
}

impl ProviderRegistry {
    /// Start building a registry.
    pub fn builder() -> ProviderRegistryBuilder {
        ProviderRegistryBuilder::default()
    }

    /// The currently active provider kind.
    pub fn active_kind(&self) -> ProviderKind {
        *self.active.read().expect("registry lock poisoned")
    }

    /// The currently active provider adapter.
    pub fn active(&self) -> Arc<dyn PriceProvider> {
        let kind = self.active_kind();
        self.providers
            .get(&kind)
            .cloned()
            .expect("active provider is always registered")
    }

    /// Look up an adapter by kind.
    pub fn get(&self, kind: ProviderKind) -> Option<Arc<dyn PriceProvider>> {
        self.providers.get(&kind).cloned()
    }

    /// Make `kind` the active provider.
    ///
    /// # Errors
    /// Returns an error if no adapter is registered under `kind`.
    pub fn activate(&self, kind: ProviderKind) -> Result<(), UnknownProvider> {
        if !self.providers.contains_key(&kind) {
            return Err(UnknownProvider(kind.as_str().to_string()));
        }
        *self.active.write().expect("registry lock poisoned") = kind;
        Ok(())
    }

    /// List all registered providers with their capabilities.
    pub fn list(&self) -> Vec<ProviderInfo> {
        self.providers
            .iter()
            .map(|(kind, provider)| ProviderInfo {
                id: *kind,
                display_name: kind.display_name(),
                supports_history: provider.supports_history(),
            })
            .collect()
    }
}
