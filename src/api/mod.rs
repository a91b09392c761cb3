pub mod convert;
pub mod fees;
pub mod health;
pub mod items;
pub mod portfolio;
pub mod prices;
pub mod providers;

use crate::config::Config;
use crate::prices::PriceService;
use crate::store::PortfolioStore;
use axum::{
    routing::{get, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<PortfolioStore>,
    pub prices: Arc<PriceService>,
    pub config: Config,
}

impl AppState {
    pub fn new(store: Arc<PortfolioStore>, prices: Arc<PriceService>, config: Config) -> Self {
        Self {
            store,
            prices,
            config,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/prices", get(prices::get_prices))
        .route("/v1/currencies", get(prices::get_currencies))
        .route("/v1/history", get(prices::get_history))
        .route("/v1/purchasing-power", get(prices::get_purchasing_power))
        .route("/v1/convert", get(convert::get_convert))
        .route(
            "/v1/items",
            get(items::get_items)
                .post(items::post_item)
                .delete(items::clear_items),
        )
        .route(
            "/v1/items/:id",
            put(items::put_item).delete(items::delete_item),
        )
        .route("/v1/items/:id/comparison", get(items::get_comparison))
        .route("/v1/portfolio/summary", get(portfolio::get_summary))
        .route(
            "/v1/portfolio/goal",
            get(portfolio::get_goal).put(portfolio::put_goal),
        )
        .route("/v1/fees", get(fees::get_fees))
        .route("/v1/providers", get(providers::get_providers))
        .route("/v1/providers/active", put(providers::put_active_provider))
        .layer(cors)
        .with_state(state)
}
