//! Deletion handler.

use tracing::instrument;

use crate::database::SatchelDatabase;
use crate::error::ServerResult;
use crate::StateInner;
use satchel::api::v1::outcome::{OperationResult, Outcome};
use satchel::download::DownloadRef;

/// Deletes a stored artifact and clears every pointer to it.
///
/// A file that is already gone is not an error. The pointers are
/// cleared either way.
#[instrument(skip_all, fields(artifact_ref = %artifact_ref))]
pub async fn delete_coursework(
    state: &StateInner,
    artifact_ref: &DownloadRef,
) -> ServerResult<OperationResult> {
    let artifact = artifact_ref.to_artifact_path()?;

    let database = state.database().await?;
    let storage = state.storage().await?;

    let _slot = state
        .slot_locks
        .lock(artifact.class(), artifact.student())
        .await;

    let existed = storage.remove_artifact(&artifact).await?;
    if !existed {
        tracing::info!("Artifact was already missing");
    }

    let cleared = database.clear_artifact_ref(artifact_ref).await?;
    tracing::info!(existed, cleared, "Deleted {}", artifact);

    let message = if existed {
        "Coursework deleted"
    } else {
        "Coursework was already missing, reference cleared"
    };

    Ok(OperationResult::new(Outcome::Success, message))
}
