use crate::domain::Currency;
use crate::providers::ProviderKind;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: String,
    pub price_provider: ProviderKind,
    pub default_currencies: Vec<Currency>,
    pub spot_ttl_ms: u64,
    pub coingecko_api_url: String,
    pub coingecko_api_key: Option<String>,
    pub mempool_api_url: String,
    pub coincap_api_url: String,
    pub blockchain_ticker_url: String,
    pub blockchain_charts_url: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let data_path = env_map
            .get("DATA_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATA_PATH".to_string()))?;

        let price_provider = env_map
            .get("PRICE_PROVIDER")
            .map(|s| s.as_str())
            .unwrap_or("coingecko")
            .parse::<ProviderKind>()
            .map_err(|e| ConfigError::InvalidValue("PRICE_PROVIDER".to_string(), e.to_string()))?;

        let default_currencies = parse_currencies_from_map(&env_map)?;

        let spot_ttl_ms = env_map
            .get("SPOT_TTL_MS")
            .map(|s| s.as_str())
            .unwrap_or("60000")
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "SPOT_TTL_MS".to_string(),
                    "must be a valid u64".to_string(),
                )
            })?;

        let coingecko_api_url = env_map
            .get("COINGECKO_API_URL")
            .cloned()
            .unwrap_or_else(|| "https://api.coingecko.com/api/v3".to_string());

        let coingecko_api_key = env_map
            .get("COINGECKO_API_KEY")
            .cloned()
            .filter(|s| !s.trim().is_empty());

        let mempool_api_url = env_map
            .get("MEMPOOL_API_URL")
            .cloned()
            .unwrap_or_else(|| "https://mempool.space/api/v1".to_string());

        let coincap_api_url = env_map
            .get("COINCAP_API_URL")
            .cloned()
            .unwrap_or_else(|| "https://api.coincap.io/v2".to_string());

        let blockchain_ticker_url = env_map
            .get("BLOCKCHAIN_TICKER_URL")
            .cloned()
            .unwrap_or_else(|| "https://blockchain.info".to_string());

        let blockchain_charts_url = env_map
            .get("BLOCKCHAIN_CHARTS_URL")
            .cloned()
            .unwrap_or_else(|| "https://api.blockchain.info".to_string());

        Ok(Config {
            port,
            data_path,
            price_provider,
            default_currencies,
            spot_ttl_ms,
            coingecko_api_url,
            coingecko_api_key,
            mempool_api_url,
            coincap_api_url,
            blockchain_ticker_url,
            blockchain_charts_url,
        })
    }
}

#[cfg_attr(not(test), allow(dead_code))]
fn parse_currencies_from_map(
    env_map: &HashMap<String, String>,
) -> Result<Vec<Currency>, ConfigError> {
    let raw = env_map
        .get("DEFAULT_CURRENCIES")
        .map(|s| s.as_str())
        .unwrap_or("usd,eur,sek,dkk,thb");

    let mut currencies = Vec::new();
    for code in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let currency = Currency::parse(code).map_err(|e| {
            ConfigError::InvalidValue("DEFAULT_CURRENCIES".to_string(), e.to_string())
        })?;
        if !currencies.contains(&currency) {
            currencies.push(currency);
        }
    }
    if currencies.is_empty() {
        return Err(ConfigError::InvalidValue(
            "DEFAULT_CURRENCIES".to_string(),
            "must name at least one currency".to_string(),
        ));
    }
    Ok(currencies)
}
