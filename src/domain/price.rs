//! Historical price samples.

use super::{Decimal, TimeMs};
use serde::{Deserialize, Serialize};

/// One sample of a BTC/fiat price history series: the exchange rate at a
/// point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub time_ms: TimeMs,
    pub rate: Decimal,
}

impl PricePoint {
    /// Create a PricePoint.
    pub fn new(time_ms: TimeMs, rate: Decimal) -> Self {
        Self { time_ms, rate }
    }
}
