use crate::lnmarkets::client::{MAINNET_API_URL, TESTNET_API_URL};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    /// Application-wide secret the vault derives per-user field keys from.
    pub app_secret: String,
    pub mainnet_api_url: String,
    pub testnet_api_url: String,
    pub http_timeout_secs: u64,
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

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let app_secret = env_map
            .get("APP_SECRET")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("APP_SECRET".to_string()))?;
        if app_secret.len() < 16 {
            return Err(ConfigError::InvalidValue(
                "APP_SECRET".to_string(),
                "must be at least 16 characters".to_string(),
            ));
        }

        let mainnet_api_url = env_map
            .get("LNM_MAINNET_URL")
            .cloned()
            .unwrap_or_else(|| MAINNET_API_URL.to_string());

        let testnet_api_url = env_map
            .get("LNM_TESTNET_URL")
            .cloned()
            .unwrap_or_else(|| TESTNET_API_URL.to_string());

        let http_timeout_secs = env_map
            .get("HTTP_TIMEOUT_SECS")
            .map(|s| s.as_str())
            .unwrap_or("15")
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "HTTP_TIMEOUT_SECS".to_string(),
                    "must be a valid u64".to_string(),
                )
            })?;
        if http_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "HTTP_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Config {
            port,
            database_path,
            app_secret,
            mainnet_api_url,
            testnet_api_url,
            http_timeout_secs,
        })
    }
}
