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

/// App with a CoinGecko mock quoting usd at 100k and a CoinCap mock at 50k.
async fn setup_test_app() -> (axum::Router, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let data_path = temp_dir
        .path()
        .join("portfolio.json")
        .to_string_lossy()
        .to_string();

    let store = Arc::new(PortfolioStore::open(&data_path).await.unwrap());
    let coingecko = Arc::new(MockProvider::new().with_spot(usd(), Decimal::from_u64(100_000)));
    let coincap = Arc::new(MockProvider::new().with_spot(usd(), Decimal::from_u64(50_000)));
    let registry = Arc::new(
        ProviderRegistry::builder()
            .register(ProviderKind::Coingecko, coingecko.clone())
            .register(ProviderKind::Coincap, coincap)
            .build(ProviderKind::Coingecko)
            .unwrap(),
    );
    let prices = Arc::new(PriceService::new(
        registry,
        coingecko,
        Duration::from_secs(60),
    ));
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

async fn create_item(app: &axum::Router, name: &str, price: &str, category: Option<&str>) -> Value {
    let mut body = json!({"name": name, "price": price, "currency": "usd"});
    if let Some(category) = category {
        body["category"] = json!(category);
    }
    let response = app
        .clone()
        .oneshot(json_request("POST", "/v1/items", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[tokio::test]
async fn test_create_item_computes_sats() {
    let (app, _temp) = setup_test_app().await;

    let item = create_item(&app, "Coffee", "4", Some("Food")).await;
    // 4 usd at 100,000 usd/BTC is 4,000 sats
    assert_eq!(item["sats"], json!(4000));
    assert_eq!(item["name"], json!("Coffee"));
    assert_eq!(item["price"], json!("4"));
    assert_eq!(item["currency"], json!("usd"));
    assert_eq!(item["category"], json!("Food"));
    assert!(item["id"].is_string());
    assert!(item["dateAdded"].is_string());
    assert!(item.get("currentSats").is_none());
}

#[tokio::test]
async fn test_create_item_rejects_bad_input() {
    let (app, _temp) = setup_test_app().await;

    for body in [
        json!({"name": "  ", "price": "4", "currency": "usd"}),
        json!({"name": "Coffee", "price": "0", "currency": "usd"}),
        json!({"name": "Coffee", "price": "-1", "currency": "usd"}),
        json!({"name": "Coffee", "price": "abc", "currency": "usd"}),
        json!({"name": "Coffee", "price": "4", "currency": "!!"}),
    ] {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/v1/items", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_create_item_unquoted_currency() {
    let (app, _temp) = setup_test_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/v1/items",
            json!({"name": "Coffee", "price": "4", "currency": "thb"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("thb"));
}

#[tokio::test]
async fn test_update_item_recomputes_sats() {
    let (app, _temp) = setup_test_app().await;

    let item = create_item(&app, "Coffee", "4", Some("Food")).await;
    let id = item["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/v1/items/{}", id),
            json!({"price": "8"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["sats"], json!(8000));
    assert_eq!(updated["name"], json!("Coffee"));
    assert_eq!(updated["category"], json!("Food"));

    // An explicit empty category clears it
    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/v1/items/{}", id),
            json!({"category": ""}),
        ))
        .await
        .unwrap();
    let updated = body_json(response).await;
    assert!(updated.get("category").is_none());
}

#[tokio::test]
async fn test_update_unknown_item_is_404() {
    let (app, _temp) = setup_test_app().await;

    let response = app
        .oneshot(json_request(
            "PUT",
            "/v1/items/00000000-0000-0000-0000-000000000000",
            json!({"price": "8"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_item_returns_removed() {
    let (app, _temp) = setup_test_app().await;

    let item = create_item(&app, "Coffee", "4", None).await;
    let id = item["id"].as_str().unwrap();

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/v1/items/{}", id))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let removed = body_json(response).await;
    assert_eq!(removed["id"], json!(id));

    // Deleting again is a 404
    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/v1/items/{}", id))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_clear_items() {
    let (app, _temp) = setup_test_app().await;

    create_item(&app, "Coffee", "4", None).await;
    create_item(&app, "Snack", "2", None).await;

    let request = Request::builder()
        .method("DELETE")
        .uri("/v1/items")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"cleared": 2}));

    let response = app.oneshot(get_request("/v1/items")).await.unwrap();
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn test_list_items_filter_and_sort() {
    let (app, _temp) = setup_test_app().await;

    create_item(&app, "Coffee", "4", Some("Food")).await;
    create_item(&app, "Bus ticket", "2", Some("Transport")).await;
    create_item(&app, "Croissant", "3", Some("Food")).await;

    let response = app
        .clone()
        .oneshot(get_request("/v1/items?q=food"))
        .await
        .unwrap();
    let items = body_json(response).await;
    assert_eq!(items.as_array().unwrap().len(), 2);

    let response = app
        .clone()
        .oneshot(get_request("/v1/items?sort=name-asc"))
        .await
        .unwrap();
    let items = body_json(response).await;
    let names: Vec<&str> = items
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Bus ticket", "Coffee", "Croissant"]);

    let response = app.oneshot(get_request("/v1/items?sort=sideways")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_items_with_current_enrichment() {
    let (app, _temp) = setup_test_app().await;

    create_item(&app, "Coffee", "4", None).await;

    // Switch to the provider quoting half the rate; the item now costs twice
    // as many sats as when it was saved
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/v1/providers/active",
            json!({"id": "coincap"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get_request("/v1/items?withCurrent=true"))
        .await
        .unwrap();
    let items = body_json(response).await;
    let item = &items.as_array().unwrap()[0];
    assert_eq!(item["sats"], json!(4000));
    assert_eq!(item["currentSats"], json!(8000));
    assert_eq!(item["changePct"], json!("100"));
    assert_eq!(item["trend"], json!("moreExpensive"));
}

#[tokio::test]
async fn test_list_items_enrichment_degrades_on_provider_failure() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = temp_dir
        .path()
        .join("portfolio.json")
        .to_string_lossy()
        .to_string();

    let store = Arc::new(PortfolioStore::open(&data_path).await.unwrap());
    let healthy = Arc::new(MockProvider::new().with_spot(usd(), Decimal::from_u64(100_000)));
    let failing = Arc::new(
        MockProvider::new().failing(satstandard::ProviderError::Network("down".to_string())),
    );
    let registry = Arc::new(
        ProviderRegistry::builder()
            .register(ProviderKind::Coingecko, healthy.clone())
            .register(ProviderKind::Coincap, failing)
            .build(ProviderKind::Coingecko)
            .unwrap(),
    );
    let prices = Arc::new(PriceService::new(registry, healthy, Duration::from_secs(60)));
    let app = api::create_router(AppState::new(store, prices, test_config(data_path)));

    create_item(&app, "Coffee", "4", None).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/v1/providers/active",
            json!({"id": "coincap"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The listing still succeeds, just without enrichment
    let response = app
        .oneshot(get_request("/v1/items?withCurrent=true"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let items = body_json(response).await;
    let item = &items.as_array().unwrap()[0];
    assert_eq!(item["sats"], json!(4000));
    assert!(item.get("currentSats").is_none());
    assert!(item.get("changePct").is_none());
}
