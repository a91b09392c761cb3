//! Pure computation engine: conversion arithmetic, price-change comparison,
//! and portfolio aggregation. No I/O here.

pub mod comparison;
pub mod convert;
pub mod portfolio;

pub use comparison::{
    classify, compare_series, item_cost_series, percent_change, CostPoint, SeriesComparison, Trend,
};
pub use convert::{fiat_to_sats, sats_per_unit, sats_to_fiat, ConvertError, SATS_PER_BTC};
pub use portfolio::{filter_items, sort_items, summarize, PortfolioSummary, SortKey, SortSpec};
