use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

use crate::api::AppState;
use crate::domain::{Currency, PricePoint, Sats, TimeMs};
use crate::engine::sats_per_unit;
use crate::error::AppError;
use crate::providers::ProviderKind;

const MAX_HISTORY_DAYS: u32 = 3650;

pub(crate) fn parse_currency(input: &str) -> Result<Currency, AppError> {
    Currency::parse(input).map_err(|e| AppError::BadRequest(e.to_string()))
}

pub(crate) fn parse_days(days: Option<u32>, default: u32) -> Result<u32, AppError> {
    let days = days.unwrap_or(default);
    if days == 0 || days > MAX_HISTORY_DAYS {
        return Err(AppError::BadRequest(format!(
            "days must be between 1 and {}",
            MAX_HISTORY_DAYS
        )));
    }
    Ok(days)
}

#[derive(Debug, Deserialize)]
pub struct PricesQuery {
    pub currencies: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricesResponse {
    pub provider: ProviderKind,
    pub prices: BTreeMap<Currency, String>,
}

pub async fn get_prices(
    Query(params): Query<PricesQuery>,
    State(state): State<AppState>,
) -> Result<Json<PricesResponse>, AppError> {
    let currencies = match params.currencies.as_deref() {
        Some(csv) => {
            let currencies = csv
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(parse_currency)
                .collect::<Result<Vec<_>, _>>()?;
            if currencies.is_empty() {
                return Err(AppError::BadRequest(
                    "currencies must name at least one currency".to_string(),
                ));
            }
            currencies
        }
        None => state.config.default_currencies.clone(),
    };

    let prices = state.prices.spot_prices(&currencies).await.map_err(|e| {
        warn!("Spot price fetch failed: {}", e);
        AppError::from(e)
    })?;

    Ok(Json(PricesResponse {
        provider: state.prices.active_provider(),
        prices: prices
            .into_iter()
            .map(|(currency, rate)| (currency, rate.to_canonical_string()))
            .collect(),
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrenciesResponse {
    pub provider: ProviderKind,
    pub currencies: Vec<Currency>,
}

pub async fn get_currencies(
    State(state): State<AppState>,
) -> Result<Json<CurrenciesResponse>, AppError> {
    let currencies = state.prices.supported_currencies().await.map_err(|e| {
        warn!("Supported currencies fetch failed: {}", e);
        AppError::from(e)
    })?;

    Ok(Json(CurrenciesResponse {
        provider: state.prices.active_provider(),
        currencies,
    }))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub currency: String,
    pub days: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub provider: ProviderKind,
    pub currency: Currency,
    pub days: u32,
    pub points: Vec<PricePoint>,
}

pub async fn get_history(
    Query(params): Query<HistoryQuery>,
    State(state): State<AppState>,
) -> Result<Json<HistoryResponse>, AppError> {
    let currency = parse_currency(&params.currency)?;
    let days = parse_days(params.days, 30)?;

    let points = state
        .prices
        .price_history(&currency, days)
        .await
        .map_err(|e| {
            warn!("History fetch for {} failed: {}", currency, e);
            AppError::from(e)
        })?;

    Ok(Json(HistoryResponse {
        provider: state.prices.active_provider(),
        currency,
        days,
        points: points.to_vec(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct PurchasingPowerQuery {
    pub currency: String,
    pub days: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchasingPowerPoint {
    pub time_ms: TimeMs,
    pub sats_per_unit: Sats,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchasingPowerResponse {
    pub currency: Currency,
    pub days: u32,
    pub points: Vec<PurchasingPowerPoint>,
}

/// The fiat-leak series: how many satoshis one unit of fiat bought over time.
pub async fn get_purchasing_power(
    Query(params): Query<PurchasingPowerQuery>,
    State(state): State<AppState>,
) -> Result<Json<PurchasingPowerResponse>, AppError> {
    let currency = parse_currency(&params.currency)?;
    let days = parse_days(params.days, 1825)?;

    let history = state
        .prices
        .price_history(&currency, days)
        .await
        .map_err(|e| {
            warn!("History fetch for {} failed: {}", currency, e);
            AppError::from(e)
        })?;

    let points = history
        .iter()
        .filter_map(|point| {
            sats_per_unit(point.rate)
                .ok()
                .map(|sats| PurchasingPowerPoint {
                    time_ms: point.time_ms,
                    sats_per_unit: sats,
                })
        })
        .collect();

    Ok(Json(PurchasingPowerResponse {
        currency,
        days,
        points,
    }))
}
