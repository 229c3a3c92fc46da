//! Proxy boundary: server-side endpoints the browser calls instead of
//! talking to LN Markets directly. Credentials are resolved through the
//! vault per request and never echoed back.

pub mod connection;
pub mod deposits;
pub mod health;
pub mod sync;
pub mod trades;
pub mod withdrawals;

use crate::domain::ApiCredentials;
use crate::error::AppError;
use crate::lnmarkets::LnMarketsApi;
use crate::vault::CredentialVault;
use axum::{routing::get, routing::post, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub vault: CredentialVault,
    pub api: Arc<dyn LnMarketsApi>,
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/api/ln-markets/test", post(connection::test_connection))
        .route("/api/ln-markets/trades", post(trades::fetch_trades))
        .route("/api/ln-markets/deposits", post(deposits::fetch_deposits))
        .route(
            "/api/ln-markets/withdrawals",
            post(withdrawals::fetch_withdrawals),
        )
        .route("/api/ln-markets/sync", post(sync::sync_history))
        .layer(cors)
        .with_state(state)
}

/// Request body shared by the history endpoints.
///
/// Fields default to empty so a missing field reads as a validation error
/// (400) rather than a deserialization rejection. `credentials` is the
/// legacy mode: raw credentials in the body, bypassing the vault.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRequest {
    #[serde(default)]
    pub user_email: String,
    #[serde(default)]
    pub config_id: String,
    #[serde(default)]
    pub credentials: Option<ApiCredentials>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub has_data: bool,
}

impl<T> HistoryResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self {
            success: true,
            has_data: !data.is_empty(),
            data,
        }
    }
}

/// Validate the request and resolve credentials through the vault.
///
/// Order matters: missing fields → 400, unknown config → 404, inactive
/// config → 400 — all before any upstream call is made. Raw credentials in
/// the body short-circuit the vault entirely (legacy mode).
pub(crate) async fn resolve_credentials(
    state: &AppState,
    req: &HistoryRequest,
) -> Result<ApiCredentials, AppError> {
    if let Some(creds) = &req.credentials {
        if creds.key.trim().is_empty()
            || creds.secret.trim().is_empty()
            || creds.passphrase.trim().is_empty()
        {
            return Err(AppError::BadRequest(
                "key, secret, and passphrase are all required".to_string(),
            ));
        }
        info!("using request-supplied credentials");
        return Ok(creds.clone());
    }

    if req.user_email.trim().is_empty() {
        return Err(AppError::BadRequest("userEmail is required".to_string()));
    }
    if req.config_id.trim().is_empty() {
        return Err(AppError::BadRequest("configId is required".to_string()));
    }

    let set = state
        .vault
        .get(&req.user_email, &req.config_id)
        .await?
        .ok_or_else(|| AppError::NotFound("credential configuration not found".to_string()))?;

    if !set.is_active {
        return Err(AppError::BadRequest(
            "credential configuration is inactive".to_string(),
        ));
    }

    info!(
        user = %redact_identity(&req.user_email),
        config = %req.config_id,
        "resolved credentials"
    );
    Ok(set.credentials)
}

/// Shorten an identity for logs: first two characters survive, the rest of
/// the local part never does.
pub(crate) fn redact_identity(identity: &str) -> String {
    match identity.split_once('@') {
        Some((local, domain)) => {
            let kept: String = local.chars().take(2).collect();
            format!("{}***@{}", kept, domain)
        }
        None => {
            let kept: String = identity.chars().take(2).collect();
            format!("{}***", kept)
        }
    }
}
