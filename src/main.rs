use satstandard::providers::{
    BlockchainProvider, CoincapProvider, CoingeckoProvider, MempoolProvider, ProviderKind,
    ProviderRegistry,
};
use satstandard::{api, config::Config, PortfolioStore, PriceService};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let port = config.port;

    // Open the portfolio document; a corrupt file refuses to start rather
    // than being overwritten
    let store = match PortfolioStore::open(&config.data_path).await {
        Ok(s) => Arc::new(s),
        Err(e) => {
            eprintln!("Failed to open portfolio store: {}", e);
            std::process::exit(1);
        }
    };

    // All adapters share one HTTP client
    let client = reqwest::Client::new();
    let mempool = Arc::new(MempoolProvider::new(
        client.clone(),
        config.mempool_api_url.clone(),
    ));
    let registry = ProviderRegistry::builder()
        .register(
            ProviderKind::Coingecko,
            Arc::new(CoingeckoProvider::new(
                client.clone(),
                config.coingecko_api_url.clone(),
                config.coingecko_api_key.clone(),
            )),
        )
        .register(ProviderKind::Mempool, mempool.clone())
        .register(
            ProviderKind::Coincap,
            Arc::new(CoincapProvider::new(
                client.clone(),
                config.coincap_api_url.clone(),
            )),
        )
        .register(
            ProviderKind::Blockchain,
            Arc::new(BlockchainProvider::new(
                client,
                config.blockchain_ticker_url.clone(),
                config.blockchain_charts_url.clone(),
            )),
        )
        .build(config.price_provider);
    let registry = match registry {
        Ok(r) => Arc::new(r),
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    let prices = Arc::new(PriceService::new(
        registry,
        mempool,
        Duration::from_millis(config.spot_ttl_ms),
    ));

    // Create router
    let app = api::create_router(api::AppState::new(store, prices, config));

    // Bind to address
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server listening on {}", addr);

    // Run server
    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
