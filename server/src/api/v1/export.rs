use axum::extract::{Extension, Json};
use tracing::instrument;

use crate::error::ServerResult;
use crate::export;
use crate::State;
use satchel::api::v1::export::ExportRequest;
use satchel::api::v1::outcome::OperationResult;

/// Exports the submitted coursework of a class as an archive.
#[instrument(skip_all)]
pub(crate) async fn export_archive(
    Extension(state): Extension<State>,
    Json(payload): Json<ExportRequest>,
) -> ServerResult<Json<OperationResult>> {
    let result = export::export_archive(&state, &payload.class_id).await?;
    Ok(Json(result))
}

/// Exports the grade report of a class.
#[instrument(skip_all)]
pub(crate) async fn export_report(
    Extension(state): Extension<State>,
    Json(payload): Json<ExportRequest>,
) -> ServerResult<Json<OperationResult>> {
    let result = export::export_report(&state, &payload.class_id).await?;
    Ok(Json(result))
}
