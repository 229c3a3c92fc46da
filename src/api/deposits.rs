use axum::extract::State;
use axum::Json;
use tracing::info;

use super::{redact_identity, resolve_credentials, AppState, HistoryRequest, HistoryResponse};
use crate::error::AppError;
use crate::lnmarkets::records::RawDeposit;

pub async fn fetch_deposits(
    State(state): State<AppState>,
    Json(req): Json<HistoryRequest>,
) -> Result<Json<HistoryResponse<RawDeposit>>, AppError> {
    let creds = resolve_credentials(&state, &req).await?;

    let deposits = state
        .api
        .deposit_history(&creds)
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    info!(
        user = %redact_identity(&req.user_email),
        count = deposits.len(),
        "fetched deposit history"
    );
    Ok(Json(HistoryResponse::new(deposits)))
}
