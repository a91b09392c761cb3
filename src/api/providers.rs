use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::AppState;
use crate::error::AppError;
use crate::providers::{ProviderInfo, ProviderKind};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvidersResponse {
    pub active: ProviderKind,
    pub providers: Vec<ProviderInfo>,
}

pub async fn get_providers(State(state): State<AppState>) -> Json<ProvidersResponse> {
    Json(ProvidersResponse {
        active: state.prices.active_provider(),
        providers: state.prices.provider_list(),
    })
}

#[derive(Debug, Deserialize)]
pub struct SwitchProviderRequest {
    pub id: String,
}

pub async fn put_active_provider(
    State(state): State<AppState>,
    Json(body): Json<SwitchProviderRequest>,
) -> Result<Json<ProvidersResponse>, AppError> {
    let kind = body
        .id
        .parse::<ProviderKind>()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    state
        .prices
        .switch_provider(kind)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    info!("Active price provider switched to {}", kind);

    Ok(Json(ProvidersResponse {
        active: state.prices.active_provider(),
        providers: state.prices.provider_list(),
    }))
}
