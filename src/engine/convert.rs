//! Fiat/satoshi conversion arithmetic.

use crate::domain::{Decimal, Sats};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::RoundingStrategy;
use thiserror::Error;

/// Satoshis per bitcoin.
pub const SATS_PER_BTC: u64 = 100_000_000;

/// Error type for conversion arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("exchange rate must be positive")]
    NonPositiveRate,
    #[error("amount must not be negative")]
    NegativeAmount,
    #[error("result out of range")]
    OutOfRange,
}

/// Convert a fiat price to satoshis at the given BTC/fiat rate.
///
/// `sats = round(price / rate * SATS_PER_BTC)`, rounded half away from zero.
pub fn fiat_to_sats(price: Decimal, rate: Decimal) -> Result<Sats, ConvertError> {
    if !rate.is_positive() {
        return Err(ConvertError::NonPositiveRate);
    }
    if price.is_negative() {
        return Err(ConvertError::NegativeAmount);
    }
    let sats = (price.inner() / rate.inner()) * rust_decimal::Decimal::from(SATS_PER_BTC);
    sats.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .map(Sats::new)
        .ok_or(ConvertError::OutOfRange)
}

/// Convert a satoshi amount to fiat at the given BTC/fiat rate.
pub fn sats_to_fiat(sats: Sats, rate: Decimal) -> Result<Decimal, ConvertError> {
    if !rate.is_positive() {
        return Err(ConvertError::NonPositiveRate);
    }
    let btc = Decimal::from_u64(sats.as_u64()) / Decimal::from_u64(SATS_PER_BTC);
    Ok(btc * rate)
}

/// How many satoshis one fiat unit buys at the given rate.
pub fn sats_per_unit(rate: Decimal) -> Result<Sats, ConvertError> {
    fiat_to_sats(Decimal::from_u64(1), rate)
}
