pub mod api;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod prices;
pub mod providers;
pub mod store;

pub use config::Config;
pub use domain::{Currency, Decimal, PricePoint, RecommendedFees, Sats, SavedItem, TimeMs};
pub use error::AppError;
pub use prices::PriceService;
pub use providers::{MockProvider, PriceProvider, ProviderError, ProviderKind, ProviderRegistry};
pub use store::PortfolioStore;
