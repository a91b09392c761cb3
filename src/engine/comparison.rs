//! Historical-cost comparison: how an item's satoshi price moved over time.

use super::convert::fiat_to_sats;
use crate::domain::{Decimal, PricePoint, Sats, TimeMs};
use serde::Serialize;

/// Percent-change magnitude below which a price is considered stable.
const STABILITY_THRESHOLD_PCT: &str = "0.5";

/// Direction of an item's satoshi-cost move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Trend {
    Cheaper,
    MoreExpensive,
    Stable,
}

/// One point of an item's cost-in-sats series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostPoint {
    pub time_ms: TimeMs,
    pub sats: Sats,
}

/// Summary of a cost series: overall change and its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesComparison {
    pub change_pct: Decimal,
    pub trend: Trend,
}

/// Build an item's cost-in-sats series from a rate history, with the current
/// rate appended as a final "today" point.
///
/// Points with non-positive rates are skipped rather than failing the series.
pub fn item_cost_series(
    price: Decimal,
    history: &[PricePoint],
    current_rate: Decimal,
    now_ms: TimeMs,
) -> Vec<CostPoint> {
    let mut series: Vec<CostPoint> = history
        .iter()
        .filter_map(|point| {
            fiat_to_sats(price, point.rate).ok().map(|sats| CostPoint {
                time_ms: point.time_ms,
                sats,
            })
        })
        .collect();
    if let Ok(sats) = fiat_to_sats(price, current_rate) {
        series.push(CostPoint {
            time_ms: now_ms,
            sats,
        });
    }
    series
}

/// Percent change from `first` to `last`: `(last - first) / first * 100`.
///
/// A zero starting value has no defined change and is treated as zero.
pub fn percent_change(first: Sats, last: Sats) -> Decimal {
    if first.as_u64() == 0 {
        return Decimal::zero();
    }
    let first = Decimal::from_u64(first.as_u64());
    let last = Decimal::from_u64(last.as_u64());
    (last - first) / first * Decimal::hundred()
}

/// Classify a percent change against the stability threshold.
pub fn classify(change_pct: Decimal) -> Trend {
    let threshold =
        Decimal::from_str_canonical(STABILITY_THRESHOLD_PCT).expect("static threshold is valid");
    if change_pct.abs() < threshold {
        Trend::Stable
    } else if change_pct.is_negative() {
        Trend::Cheaper
    } else {
        Trend::MoreExpensive
    }
}

/// Compare the first and last points of a cost series.
///
/// Returns `None` when the series has fewer than two points (not enough data).
pub fn compare_series(series: &[CostPoint]) -> Option<SeriesComparison> {
    if series.len() < 2 {
        return None;
    }
    let first = series.first()?.sats;
    let last = series.last()?.sats;
    let change_pct = percent_change(first, last);
    Some(SeriesComparison {
        change_pct,
        trend: classify(change_pct),
    })
}
