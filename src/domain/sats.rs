//! Satoshi amounts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An amount of satoshis (1/100,000,000 BTC).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Sats(pub u64);

impl Sats {
    /// Create a Sats amount.
    pub fn new(sats: u64) -> Self {
        Sats(sats)
    }

    /// Get the underlying satoshi count.
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Saturating addition, for portfolio totals.
    pub fn saturating_add(self, rhs: Sats) -> Sats {
        Sats(self.0.saturating_add(rhs.0))
    }
}

impl fmt::Display for Sats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sats_serializes_as_number() {
        let json = serde_json::to_value(Sats::new(4000)).unwrap();
        assert_eq!(json, serde_json::json!(4000));
    }

    #[test]
    fn test_sats_saturating_add() {
        let a = Sats::new(u64::MAX - 1);
        assert_eq!(a.saturating_add(Sats::new(10)), Sats::new(u64::MAX));
    }

    #[test]
    fn test_sats_ordering() {
        assert!(Sats::new(100) < Sats::new(200));
    }
}
