use axum::extract::State;
use axum::Json;
use tracing::warn;

use crate::api::AppState;
use crate::domain::RecommendedFees;
use crate::error::AppError;

/// Recommended on-chain fee rates, served by Mempool.space regardless of
/// the active price provider.
pub async fn get_fees(State(state): State<AppState>) -> Result<Json<RecommendedFees>, AppError> {
    let fees = state.prices.recommended_fees().await.map_err(|e| {
        warn!("Recommended fees fetch failed: {}", e);
        AppError::from(e)
    })?;
    Ok(Json(fees))
}
