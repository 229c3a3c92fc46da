use axum::extract::State;
use axum::Json;
use tracing::info;

use super::{redact_identity, resolve_credentials, AppState, HistoryRequest, HistoryResponse};
use crate::error::AppError;
use crate::lnmarkets::records::RawTrade;

pub async fn fetch_trades(
    State(state): State<AppState>,
    Json(req): Json<HistoryRequest>,
) -> Result<Json<HistoryResponse<RawTrade>>, AppError> {
    let creds = resolve_credentials(&state, &req).await?;

    let trades = state
        .api
        .closed_trades(&creds)
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    info!(
        user = %redact_identity(&req.user_email),
        count = trades.len(),
        "fetched closed trades"
    );
    Ok(Json(HistoryResponse::new(trades)))
}
