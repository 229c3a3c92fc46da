use axum::extract::State;
use axum::Json;
use tracing::info;

use super::{redact_identity, resolve_credentials, AppState, HistoryRequest, HistoryResponse};
use crate::error::AppError;
use crate::lnmarkets::records::RawWithdrawal;

pub async fn fetch_withdrawals(
    State(state): State<AppState>,
    Json(req): Json<HistoryRequest>,
) -> Result<Json<HistoryResponse<RawWithdrawal>>, AppError> {
    let creds = resolve_credentials(&state, &req).await?;

    let withdrawals = state
        .api
        .withdrawal_history(&creds)
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    info!(
        user = %redact_identity(&req.user_email),
        count = withdrawals.len(),
        "fetched withdrawal history"
    );
    Ok(Json(HistoryResponse::new(withdrawals)))
}
