//! Credential validation endpoint.
//!
//! Unlike the history endpoints this one takes raw credentials in the body:
//! the UI calls it before anything is saved to the vault, to tell the user
//! whether the key triple works at all.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::AppState;
use crate::domain::ApiCredentials;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct TestRequest {
    pub credentials: Option<ApiCredentials>,
}

pub async fn test_connection(
    State(state): State<AppState>,
    Json(req): Json<TestRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let creds = req
        .credentials
        .ok_or_else(|| AppError::BadRequest("credentials are required".to_string()))?;

    if creds.key.trim().is_empty()
        || creds.secret.trim().is_empty()
        || creds.passphrase.trim().is_empty()
    {
        return Err(AppError::BadRequest(
            "key, secret, and passphrase are all required".to_string(),
        ));
    }

    state
        .api
        .test_connection(&creds)
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    info!(network = %creds.network, "credential test succeeded");
    Ok(Json(json!({
        "success": true,
        "message": "connection successful",
    })))
}
