use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::api::AppState;
use crate::domain::{Currency, Sats};
use crate::engine::{filter_items, summarize};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub item_count: usize,
    pub total_sats: Sats,
    pub satoshi_goal: Sats,
    pub progress_pct: String,
    pub fiat_totals: BTreeMap<Currency, String>,
    pub category_totals: BTreeMap<String, Sats>,
}

pub async fn get_summary(
    Query(params): Query<SummaryQuery>,
    State(state): State<AppState>,
) -> Result<Json<SummaryResponse>, AppError> {
    let items = state.store.list_items().await;
    let items = filter_items(items, params.q.as_deref().unwrap_or(""));
    let goal = state.store.goal().await;
    let summary = summarize(&items, goal);

    Ok(Json(SummaryResponse {
        item_count: summary.item_count,
        total_sats: summary.total_sats,
        satoshi_goal: goal,
        progress_pct: summary.progress_pct.to_canonical_string(),
        fiat_totals: summary
            .fiat_totals
            .into_iter()
            .map(|(currency, total)| (currency, total.to_canonical_string()))
            .collect(),
        category_totals: summary.category_totals,
    }))
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalBody {
    pub satoshi_goal: Sats,
}

pub async fn get_goal(State(state): State<AppState>) -> Result<Json<GoalBody>, AppError> {
    Ok(Json(GoalBody {
        satoshi_goal: state.store.goal().await,
    }))
}

pub async fn put_goal(
    State(state): State<AppState>,
    Json(body): Json<GoalBody>,
) -> Result<Json<GoalBody>, AppError> {
    if body.satoshi_goal.as_u64() == 0 {
        return Err(AppError::BadRequest(
            "satoshiGoal must be positive".to_string(),
        ));
    }
    state.store.set_goal(body.satoshi_goal).await?;
    Ok(Json(body))
}
