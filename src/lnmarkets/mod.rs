//! LN Markets API integration: request signing, the authenticated REST
//! client, and the raw record shapes the API serves.

use crate::domain::ApiCredentials;
use async_trait::async_trait;
use thiserror::Error;

pub mod client;
pub mod mock;
pub mod records;
pub mod signature;

pub use client::LnMarketsClient;
pub use mock::MockLnMarketsApi;
pub use records::{RawDeposit, RawId, RawTimestamp, RawTrade, RawWithdrawal};
pub use signature::{sign, SignatureError};

/// Read operations against the LN Markets REST API.
///
/// Implementations authenticate every call with the supplied credentials and
/// map transport/HTTP failures to [`ApiError`]. They never retry: retry
/// policy belongs to the caller, which knows whether a failure is worth
/// waiting out (the upstream allows roughly one request per second).
#[async_trait]
pub trait LnMarketsApi: Send + Sync {
    /// Closed futures positions, newest first as served by the API.
    async fn closed_trades(&self, creds: &ApiCredentials) -> Result<Vec<RawTrade>, ApiError>;

    /// Deposit history for the account.
    async fn deposit_history(&self, creds: &ApiCredentials) -> Result<Vec<RawDeposit>, ApiError>;

    /// Withdrawal history for the account.
    async fn withdrawal_history(
        &self,
        creds: &ApiCredentials,
    ) -> Result<Vec<RawWithdrawal>, ApiError>;

    /// Lightweight authenticated call (`GET /user`) that validates the
    /// credentials without side effects.
    async fn test_connection(&self, creds: &ApiCredentials) -> Result<(), ApiError>;
}

/// Failure categories for API calls. Messages distinguish "fix your
/// credentials" from "wait and retry" because the corrective action differs.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("invalid API credentials: check key, secret, and passphrase")]
    InvalidCredentials,
    #[error("API key lacks the required permissions")]
    Forbidden,
    #[error("rate limited by LN Markets: retry after a short delay")]
    RateLimited,
    #[error("LN Markets is temporarily unavailable (HTTP {0}): try again later")]
    Upstream(u16),
    #[error("unexpected HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("failed to parse API response: {0}")]
    Parse(String),
    #[error(transparent)]
    Signature(#[from] SignatureError),
}

impl ApiError {
    /// Whether a caller-side backoff retry is appropriate.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::RateLimited | ApiError::Upstream(_))
    }
}
