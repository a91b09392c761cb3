//! Fiat currency codes as lowercase identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A fiat currency code (e.g. "usd", "eur"), normalized to lowercase ASCII.
///
/// Providers quote BTC against these codes; the app treats them as opaque
/// identifiers rather than a closed ISO 4217 set because upstream APIs also
/// quote pseudo-currencies like "sats" or "xdr".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

/// Error for malformed currency codes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid currency code: {0:?}")]
pub struct CurrencyError(pub String);

impl Currency {
    /// Parse and normalize a currency code.
    ///
    /// Accepts 2-8 ASCII alphanumeric characters; uppercase input is lowered.
    pub fn parse(input: &str) -> Result<Self, CurrencyError> {
        let trimmed = input.trim();
        if trimmed.len() < 2 || trimmed.len() > 8 {
            return Err(CurrencyError(input.to_string()));
        }
        if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CurrencyError(input.to_string()));
        }
        Ok(Currency(trimmed.to_ascii_lowercase()))
    }

    /// Get the code as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The code in uppercase, as some upstream APIs key their responses.
    pub fn to_uppercase(&self) -> String {
        self.0.to_ascii_uppercase()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Currency {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = CurrencyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.0
    }
}
