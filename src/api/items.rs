use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::api::prices::{parse_currency, parse_days};
use crate::api::AppState;
use crate::domain::{Currency, Decimal, SavedItem, TimeMs};
use crate::engine::{
    compare_series, fiat_to_sats, filter_items, item_cost_series, percent_change, sort_items,
    CostPoint, SortSpec, Trend,
};
use crate::error::AppError;

/// A saved item, optionally enriched with today's cost and its trend.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    #[serde(flatten)]
    pub item: SavedItem,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_pct: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<Trend>,
}

fn parse_sort(sort: Option<&str>) -> Result<SortSpec, AppError> {
    match sort {
        Some(s) => s
            .parse::<SortSpec>()
            .map_err(|e| AppError::BadRequest(e.to_string())),
        None => Ok(SortSpec::default()),
    }
}

fn validate_name(name: &str) -> Result<String, AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest("name must not be empty".to_string()));
    }
    Ok(trimmed.to_string())
}

fn parse_price(price: &str) -> Result<Decimal, AppError> {
    let price = Decimal::from_str_canonical(price)
        .map_err(|_| AppError::BadRequest("Invalid price".to_string()))?;
    if !price.is_positive() {
        return Err(AppError::BadRequest("price must be positive".to_string()));
    }
    Ok(price)
}

/// Spot rate for one currency, distinguishing "provider failed" from
/// "provider does not quote this currency".
async fn require_rate(state: &AppState, currency: &Currency) -> Result<Decimal, AppError> {
    state
        .prices
        .spot_price(currency)
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
        })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemsQuery {
    pub sort: Option<String>,
    pub q: Option<String>,
    pub with_current: Option<bool>,
}

pub async fn get_items(
    Query(params): Query<ItemsQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<ItemView>>, AppError> {
    let sort = parse_sort(params.sort.as_deref())?;

    let items = state.store.list_items().await;
    let mut items = filter_items(items, params.q.as_deref().unwrap_or(""));
    sort_items(&mut items, sort);

    if !params.with_current.unwrap_or(false) {
        return Ok(Json(
            items
                .into_iter()
                .map(|item| ItemView {
                    item,
                    change_pct: None,
                    trend: None,
                })
                .collect(),
        ));
    }

    // Best-effort enrichment: a provider failure degrades to bare items
    let currencies: Vec<Currency> = {
        let mut currencies: Vec<Currency> =
            items.iter().map(|item| item.currency.clone()).collect();
        currencies.sort();
        currencies.dedup();
        currencies
    };
    let rates = match state.prices.spot_prices(&currencies).await {
        Ok(rates) => rates,
        Err(e) => {
            warn!("Item enrichment skipped, spot fetch failed: {}", e);
            Default::default()
        }
    };

    let views = items
        .into_iter()
        .map(|mut item| {
            let enriched = rates
                .get(&item.currency)
                .and_then(|rate| fiat_to_sats(item.price, *rate).ok())
                .map(|current| {
                    let change_pct = percent_change(item.sats, current);
                    (current, change_pct, crate::engine::classify(change_pct))
                });
            match enriched {
                Some((current, change_pct, trend)) => {
                    item.current_sats = Some(current);
                    ItemView {
                        item,
                        change_pct: Some(change_pct.to_canonical_string()),
                        trend: Some(trend),
                    }
                }
                None => ItemView {
                    item,
                    change_pct: None,
                    trend: None,
                },
            }
        })
        .collect();
    Ok(Json(views))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItemRequest {
    pub name: String,
    pub price: String,
    pub currency: String,
    pub category: Option<String>,
}

pub async fn post_item(
    State(state): State<AppState>,
    Json(body): Json<NewItemRequest>,
) -> Result<(StatusCode, Json<SavedItem>), AppError> {
    let name = validate_name(&body.name)?;
    let price = parse_price(&body.price)?;
    let currency = parse_currency(&body.currency)?;
    let category = body.category.filter(|c| !c.trim().is_empty());

    let rate = require_rate(&state, &currency).await?;
    let sats = fiat_to_sats(price, rate).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let item = SavedItem {
        id: Uuid::new_v4(),
        name,
        price,
        currency,
        sats,
        category,
        date_added: chrono::Utc::now(),
        current_sats: None,
    };
    state.store.insert_item(item.clone()).await?;

    Ok((StatusCode::CREATED, Json(item)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    pub price: Option<String>,
    pub currency: Option<String>,
    pub category: Option<String>,
}

/// Partial update. The item's sats are always recomputed at the current
/// rate, so an edit fails when no rate is available for its currency.
pub async fn put_item(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(body): Json<UpdateItemRequest>,
) -> Result<Json<SavedItem>, AppError> {
    let mut item = state.store.get_item(id).await?;

    if let Some(name) = body.name {
        item.name = validate_name(&name)?;
    }
    if let Some(price) = body.price {
        item.price = parse_price(&price)?;
    }
    if let Some(currency) = body.currency {
        item.currency = parse_currency(&currency)?;
    }
    if let Some(category) = body.category {
        // An explicit empty string clears the category
        item.category = Some(category).filter(|c| !c.trim().is_empty());
    }

    let rate = require_rate(&state, &item.currency).await?;
    item.sats = fiat_to_sats(item.price, rate).map_err(|e| AppError::BadRequest(e.to_string()))?;
    item.current_sats = None;

    state.store.replace_item(item.clone()).await?;
    Ok(Json(item))
}

pub async fn delete_item(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<SavedItem>, AppError> {
    let removed = state.store.remove_item(id).await?;
    Ok(Json(removed))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearResponse {
    pub cleared: usize,
}

pub async fn clear_items(State(state): State<AppState>) -> Result<Json<ClearResponse>, AppError> {
    let cleared = state.store.clear_items().await?;
    Ok(Json(ClearResponse { cleared }))
}

#[derive(Debug, Deserialize)]
pub struct ComparisonQuery {
    pub days: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResponse {
    pub item_id: Uuid,
    pub item_name: String,
    pub currency: Currency,
    pub days: u32,
    pub points: Vec<CostPoint>,
    /// Absent when the series has fewer than two points.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_pct: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<Trend>,
}

/// Historical-cost comparison: the item's sats cost over `days` plus today.
pub async fn get_comparison(
    Path(id): Path<Uuid>,
    Query(params): Query<ComparisonQuery>,
    State(state): State<AppState>,
) -> Result<Json<ComparisonResponse>, AppError> {
    let days = parse_days(params.days, 30)?;
    let item = state.store.get_item(id).await?;

    let history = state
        .prices
        .price_history(&item.currency, days)
        .await
        .map_err(|e| {
            warn!("History fetch for {} failed: {}", item.currency, e);
            AppError::from(e)
        })?;
    let current_rate = require_rate(&state, &item.currency).await?;

    let points = item_cost_series(item.price, &history, current_rate, TimeMs::now());
    let comparison = compare_series(&points);

    Ok(Json(ComparisonResponse {
        item_id: item.id,
        item_name: item.name,
        currency: item.currency,
        days,
        points,
        change_pct: comparison
            .as_ref()
            .map(|c| c.change_pct.to_canonical_string()),
        trend: comparison.map(|c| c.trend),
    }))
}
