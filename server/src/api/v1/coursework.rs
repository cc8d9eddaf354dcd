use axum::extract::{Extension, Json};
use tracing::instrument;

use crate::coursework;
use crate::error::ServerResult;
use crate::State;
use satchel::api::v1::delete_coursework::DeleteCourseworkRequest;
use satchel::api::v1::outcome::OperationResult;
use satchel::api::v1::query_coursework::{CourseworkInfo, QueryCourseworkRequest};
use satchel::api::v1::rate_coursework::RateCourseworkRequest;

/// Lists the coursework records of a student in a class.
#[instrument(skip_all)]
pub(crate) async fn query_coursework(
    Extension(state): Extension<State>,
    Json(payload): Json<QueryCourseworkRequest>,
) -> ServerResult<Json<Vec<CourseworkInfo>>> {
    let records = coursework::query_coursework(&state, payload).await?;
    Ok(Json(records))
}

/// Rates a coursework record.
#[instrument(skip_all)]
pub(crate) async fn rate_coursework(
    Extension(state): Extension<State>,
    Json(payload): Json<RateCourseworkRequest>,
) -> ServerResult<Json<OperationResult>> {
    let result = coursework::rate_coursework(&state, payload).await?;
    Ok(Json(result))
}

/// Deletes a submitted artifact.
#[instrument(skip_all)]
pub(crate) async fn delete_coursework(
    Extension(state): Extension<State>,
    Json(payload): Json<DeleteCourseworkRequest>,
) -> ServerResult<Json<OperationResult>> {
    let result = coursework::delete_coursework(&state, &payload.artifact_ref).await?;
    Ok(Json(result))
}
