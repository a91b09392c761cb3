use axum::body::Body;
use axum::http::{Request, StatusCode};
use satstandard::api::{self, AppState};
use satstandard::config::Config;
use satstandard::providers::{MockProvider, ProviderKind, ProviderRegistry};
use satstandard::{Currency, Decimal, PortfolioStore, PriceService};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::util::ServiceExt;

fn usd() -> Currency {
    Currency::parse("usd").unwrap()
}

fn test_config(data_path: String) -> Config {
    Config {
        port: 0,
        data_path,
        price_provider: ProviderKind::Coingecko,
        default_currencies: vec![usd()],
        spot_ttl_ms: 60000,
        coingecko_api_url: "http://example.invalid".to_string(),
        coingecko_api_key: None,
        mempool_api_url: "http://example.invalid".to_string(),
        coincap_api_url: "http://example.invalid".to_string(),
        blockchain_ticker_url: "http://example.invalid".to_string(),
        blockchain_charts_url: "http://example.invalid".to_string(),
    }
}

async fn setup_test_app() -> (axum::Router, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let data_path = temp_dir
        .path()
        .join("portfolio.json")
        .to_string_lossy()
        .to_string();

    let store = Arc::new(PortfolioStore::open(&data_path).await.unwrap());
    let mock = Arc::new(
        MockProvider::new()
            .with_spot(usd(), Decimal::from_u64(100_000))
            .with_spot(Currency::parse("sek").unwrap(), Decimal::from_u64(1_000_000)),
    );
    let registry = Arc::new(
        ProviderRegistry::builder()
            .register(ProviderKind::Coingecko, mock.clone())
            .build(ProviderKind::Coingecko)
            .unwrap(),
    );
    let prices = Arc::new(PriceService::new(registry, mock, Duration::from_secs(60)));
    let state = AppState::new(store, prices, test_config(data_path));

    (api::create_router(state), temp_dir)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn create_item(app: &axum::Router, name: &str, price: &str, currency: &str, category: Option<&str>) {
    let mut body = json!({"name": name, "price": price, "currency": currency});
    if let Some(category) = category {
        body["category"] = json!(category);
    }
    let response = app
        .clone()
        .oneshot(json_request("POST", "/v1/items", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_summary_empty_portfolio() {
    let (app, _temp) = setup_test_app().await;

    let response = app
        .oneshot(get_request("/v1/portfolio/summary"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["itemCount"], json!(0));
    assert_eq!(body["totalSats"], json!(0));
    assert_eq!(body["satoshiGoal"], json!(1_000_000));
    assert_eq!(body["progressPct"], json!("0"));
    assert_eq!(body["fiatTotals"], json!({}));
    assert_eq!(body["categoryTotals"], json!({}));
}

#[tokio::test]
async fn test_summary_totals_and_buckets() {
    let (app, _temp) = setup_test_app().await;

    // 4 usd -> 4,000 sats; 2.5 usd -> 2,500 sats; 30 sek -> 3,000 sats
    create_item(&app, "Coffee", "4", "usd", Some("Food")).await;
    create_item(&app, "Snack", "2.5", "usd", Some("Food")).await;
    create_item(&app, "Bus ticket", "30", "sek", None).await;

    let response = app
        .clone()
        .oneshot(get_request("/v1/portfolio/summary"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["itemCount"], json!(3));
    assert_eq!(body["totalSats"], json!(9500));
    assert_eq!(body["progressPct"], json!("0.95"));
    assert_eq!(body["fiatTotals"], json!({"usd": "6.5", "sek": "30"}));
    assert_eq!(
        body["categoryTotals"],
        json!({"Food": 6500, "Uncategorized": 3000})
    );

    // A query filters the items before summarizing
    let response = app
        .oneshot(get_request("/v1/portfolio/summary?q=food"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["itemCount"], json!(2));
    assert_eq!(body["totalSats"], json!(6500));
}

#[tokio::test]
async fn test_goal_roundtrip() {
    let (app, _temp) = setup_test_app().await;

    let response = app
        .clone()
        .oneshot(get_request("/v1/portfolio/goal"))
        .await
        .unwrap();
    assert_eq!(body_json(response).await, json!({"satoshiGoal": 1_000_000}));

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/v1/portfolio/goal",
            json!({"satoshiGoal": 21_000_000}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get_request("/v1/portfolio/goal"))
        .await
        .unwrap();
    assert_eq!(
        body_json(response).await,
        json!({"satoshiGoal": 21_000_000})
    );
}

#[tokio::test]
async fn test_goal_must_be_positive() {
    let (app, _temp) = setup_test_app().await;

    let response = app
        .oneshot(json_request(
            "PUT",
            "/v1/portfolio/goal",
            json!({"satoshiGoal": 0}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_goal_progress_capped() {
    let (app, _temp) = setup_test_app().await;

    create_item(&app, "Coffee", "4", "usd", None).await;
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/v1/portfolio/goal",
            json!({"satoshiGoal": 1000}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get_request("/v1/portfolio/summary"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["progressPct"], json!("100"));
}
