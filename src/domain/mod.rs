//! Domain vocabulary: money, currencies, satoshis, time, and the portfolio entity.

pub mod currency;
pub mod decimal;
pub mod fees;
pub mod item;
pub mod price;
pub mod sats;
pub mod time;

pub use currency::{Currency, CurrencyError};
pub use decimal::Decimal;
pub use fees::RecommendedFees;
pub use item::SavedItem;
pub use price::PricePoint;
pub use sats::Sats;
pub use time::TimeMs;
