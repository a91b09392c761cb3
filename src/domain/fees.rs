//! Recommended on-chain fee rates.

use serde::{Deserialize, Serialize};

/// Mempool.space recommended fee rates in sat/vB, by confirmation priority.
///
/// Field names match the upstream `/fees/recommended` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedFees {
    pub fastest_fee: u64,
    pub half_hour_fee: u64,
    pub hour_fee: u64,
    pub economy_fee: u64,
    pub minimum_fee: u64,
}
