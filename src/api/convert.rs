use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::prices::parse_currency;
use crate::api::AppState;
use crate::domain::{Currency, Decimal, Sats};
use crate::engine::{fiat_to_sats, sats_to_fiat};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    #[default]
    FiatToSats,
    SatsToFiat,
}

#[derive(Debug, Deserialize)]
pub struct ConvertQuery {
    pub amount: String,
    pub currency: String,
    pub direction: Option<Direction>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertResponse {
    pub direction: Direction,
    pub currency: Currency,
    pub rate: String,
    pub amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sats: Option<Sats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiat: Option<String>,
}

/// One-shot conversion at the current spot rate.
pub async fn get_convert(
    Query(params): Query<ConvertQuery>,
    State(state): State<AppState>,
) -> Result<Json<ConvertResponse>, AppError> {
    let currency = parse_currency(&params.currency)?;
    let direction = params.direction.unwrap_or_default();

    let rate = state
        .prices
        .spot_price(&currency)
        .await
        .map_err(|e| {
            warn!("Spot price fetch for {} failed: {}", currency, e);
            AppError::from(e)
        })?
        .ok_or_else(|| {
            AppError::BadRequest(format!(
                "currency {} is not quoted by provider {}",
                currency,
                state.prices.active_provider()
            ))
        })?;

    let response = match direction {
        Direction::FiatToSats => {
            let amount = Decimal::from_str_canonical(&params.amount)
                .map_err(|_| AppError::BadRequest("Invalid amount".to_string()))?;
            let sats =
                fiat_to_sats(amount, rate).map_err(|e| AppError::BadRequest(e.to_string()))?;
            ConvertResponse {
                direction,
                currency,
                rate: rate.to_canonical_string(),
                amount: amount.to_canonical_string(),
                sats: Some(sats),
                fiat: None,
            }
        }
        Direction::SatsToFiat => {
            // In this direction the amount is a whole satoshi count
            let sats = params
                .amount
                .parse::<u64>()
                .map(Sats::new)
                .map_err(|_| {
                    AppError::BadRequest("amount must be a whole satoshi count".to_string())
                })?;
            let fiat =
                sats_to_fiat(sats, rate).map_err(|e| AppError::BadRequest(e.to_string()))?;
            ConvertResponse {
                direction,
                currency,
                rate: rate.to_canonical_string(),
                amount: sats.to_string(),
                sats: None,
                fiat: Some(fiat.to_canonical_string()),
            }
        }
    };

    Ok(Json(response))
}
