//! Rating assignment and record queries.

use tracing::instrument;

use crate::database::SatchelDatabase;
use crate::error::ServerResult;
use crate::StateInner;
use satchel::api::v1::outcome::{OperationResult, Outcome};
use satchel::api::v1::query_coursework::{CourseworkInfo, QueryCourseworkRequest};
use satchel::api::v1::rate_coursework::RateCourseworkRequest;
use satchel::rating::{remark_for, Rating};

/// Stores the rating of a record.
///
/// Without an explicit remark, the default remark of the rating is
/// stored.
#[instrument(skip_all, fields(record = request.record_id, rank = request.rank))]
pub async fn rate_coursework(
    state: &StateInner,
    request: RateCourseworkRequest,
) -> ServerResult<OperationResult> {
    let rating = Rating::from_rank(request.rank)?;
    let remark = remark_for(rating, request.remark.as_deref());

    let database = state.database().await?;
    database
        .rate_coursework(request.record_id, rating, remark)
        .await?;

    tracing::info!("Rated {}", rating);

    Ok(OperationResult::new(
        Outcome::Success,
        format!("Coursework rated {}", rating.label()),
    ))
}

/// Lists the records of a slot, most recent first.
#[instrument(skip_all, fields(class = %request.class_id, student = %request.student_id))]
pub async fn query_coursework(
    state: &StateInner,
    request: QueryCourseworkRequest,
) -> ServerResult<Vec<CourseworkInfo>> {
    let database = state.database().await?;
    let records = database
        .list_coursework(&request.class_id, request.student_id)
        .await?;

    Ok(records.iter().map(|r| r.to_coursework_info()).collect())
}
