//! Full-history import endpoint: fetch, normalize, report.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::info;

use super::{redact_identity, resolve_credentials, AppState, HistoryRequest};
use crate::error::AppError;
use crate::sync::{HistoryImporter, ImportReport};

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub success: bool,
    pub data: ImportReport,
}

pub async fn sync_history(
    State(state): State<AppState>,
    Json(req): Json<HistoryRequest>,
) -> Result<Json<SyncResponse>, AppError> {
    let creds = resolve_credentials(&state, &req).await?;

    let importer = HistoryImporter::new(state.api.clone());
    let report = importer
        .import(&creds)
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    info!(
        user = %redact_identity(&req.user_email),
        imported = report.imported,
        failed = report.failed,
        "history sync complete"
    );
    Ok(Json(SyncResponse {
        success: true,
        data: report,
    }))
}
