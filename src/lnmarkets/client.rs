//! Authenticated LN Markets REST client.

use super::records::{RawDeposit, RawTrade, RawWithdrawal};
use super::signature::sign;
use super::{ApiError, LnMarketsApi};
use crate::domain::{ApiCredentials, Network};
use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Mainnet API base, version prefix included.
pub const MAINNET_API_URL: &str = "https://api.lnmarkets.com/v2";
/// Testnet API base, version prefix included.
pub const TESTNET_API_URL: &str = "https://api.testnet.lnmarkets.com/v2";

// Wire-protocol contract: header names must match the upstream exactly.
pub const HEADER_ACCESS_KEY: &str = "LNM-ACCESS-KEY";
pub const HEADER_ACCESS_SIGNATURE: &str = "LNM-ACCESS-SIGNATURE";
pub const HEADER_ACCESS_PASSPHRASE: &str = "LNM-ACCESS-PASSPHRASE";
pub const HEADER_ACCESS_TIMESTAMP: &str = "LNM-ACCESS-TIMESTAMP";

/// REST client for the LN Markets v2 API.
///
/// Each call signs a fresh Unix-millisecond timestamp; signatures are never
/// reused. The client itself never retries — see [`crate::sync`] for the
/// backoff policy applied by callers.
#[derive(Debug, Clone)]
pub struct LnMarketsClient {
    http: reqwest::Client,
    mainnet_url: String,
    testnet_url: String,
}

impl LnMarketsClient {
    /// Client against the production mainnet/testnet hosts.
    pub fn new(timeout: Duration) -> Self {
        Self::with_base_urls(MAINNET_API_URL, TESTNET_API_URL, timeout)
    }

    /// Client with overridden base URLs (tests, staging proxies).
    pub fn with_base_urls(
        mainnet_url: impl Into<String>,
        testnet_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("reqwest client construction"),
            mainnet_url: mainnet_url.into(),
            testnet_url: testnet_url.into(),
        }
    }

    fn base_url(&self, network: Network) -> &str {
        match network {
            Network::Mainnet => &self.mainnet_url,
            Network::Testnet => &self.testnet_url,
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        creds: &ApiCredentials,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let params = encode_query(query);
        let base = self.base_url(creds.network);
        let url = if params.is_empty() {
            format!("{}{}", base, endpoint)
        } else {
            format!("{}{}?{}", base, endpoint, params)
        };
        let url = reqwest::Url::parse(&url).map_err(|e| ApiError::Network(e.to_string()))?;

        // Sign over the full path, version prefix included. The query string
        // is signed separately as the params component, never as part of the
        // path.
        let sign_path = url.path().to_string();
        let timestamp = Utc::now().timestamp_millis().to_string();
        let signature = sign(&creds.secret, &timestamp, "GET", &sign_path, &params)?;

        debug!(network = %creds.network, path = %sign_path, "LN Markets request");

        let response = self
            .http
            .get(url)
            .header(HEADER_ACCESS_KEY, creds.key.as_str())
            .header(HEADER_ACCESS_SIGNATURE, signature)
            .header(HEADER_ACCESS_PASSPHRASE, creds.passphrase.as_str())
            .header(HEADER_ACCESS_TIMESTAMP, timestamp)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()));
    }

    let code = status.as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(match code {
        401 => ApiError::InvalidCredentials,
        403 => ApiError::Forbidden,
        429 => ApiError::RateLimited,
        _ if status.is_server_error() => ApiError::Upstream(code),
        _ => ApiError::Http { status: code, body },
    })
}

fn encode_query(params: &[(&str, &str)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

#[async_trait]
impl LnMarketsApi for LnMarketsClient {
    async fn closed_trades(&self, creds: &ApiCredentials) -> Result<Vec<RawTrade>, ApiError> {
        self.get(creds, "/futures/trades", &[("type", "closed"), ("limit", "1000")])
            .await
    }

    async fn deposit_history(&self, creds: &ApiCredentials) -> Result<Vec<RawDeposit>, ApiError> {
        self.get(creds, "/user/deposits", &[]).await
    }

    async fn withdrawal_history(
        &self,
        creds: &ApiCredentials,
    ) -> Result<Vec<RawWithdrawal>, ApiError> {
        self.get(creds, "/user/withdrawals", &[]).await
    }

    async fn test_connection(&self, creds: &ApiCredentials) -> Result<(), ApiError> {
        let _: serde_json::Value = self.get(creds, "/user", &[]).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_follows_network() {
        let client = LnMarketsClient::new(Duration::from_secs(5));
        assert_eq!(client.base_url(Network::Mainnet), MAINNET_API_URL);
        assert_eq!(client.base_url(Network::Testnet), TESTNET_API_URL);
    }

    #[test]
    fn encode_query_joins_and_escapes_pairs() {
        assert_eq!(encode_query(&[]), "");
        assert_eq!(
            encode_query(&[("type", "closed"), ("limit", "1000")]),
            "type=closed&limit=1000"
        );
        assert_eq!(encode_query(&[("q", "a b")]), "q=a%20b");
    }

    #[test]
    fn header_names_match_wire_contract() {
        assert_eq!(HEADER_ACCESS_KEY, "LNM-ACCESS-KEY");
        assert_eq!(HEADER_ACCESS_SIGNATURE, "LNM-ACCESS-SIGNATURE");
        assert_eq!(HEADER_ACCESS_PASSPHRASE, "LNM-ACCESS-PASSPHRASE");
        assert_eq!(HEADER_ACCESS_TIMESTAMP, "LNM-ACCESS-TIMESTAMP");
    }
}
