//! Upload stager.

use tracing::instrument;

use crate::database::entity::coursework::CourseworkModel;
use crate::database::SatchelDatabase;
use crate::error::ServerResult;
use crate::storage::{LocalStorage, StagedUpload};
use crate::StateInner;
use satchel::api::v1::outcome::{OperationResult, Outcome};
use satchel::api::v1::upload_coursework::UploadCourseworkFields;
use satchel::artifact::{self, ArtifactPath};
use satchel::download::DownloadRef;

/// A request entering the pipeline.
struct Request<'a> {
    fields: UploadCourseworkFields,
    staged: &'a StagedUpload,
}

/// The record of the slot was found.
struct Located<'a> {
    request: Request<'a>,
    record: CourseworkModel,
}

/// The target path was resolved.
struct Resolved<'a> {
    located: Located<'a>,
    target: ArtifactPath,
}

/// Replaces the artifact of a slot with a staged upload.
///
/// On success the staged file has been moved away. On failure it is
/// left for the caller to clean up.
#[instrument(skip_all, fields(class = %fields.class_id, student = %fields.student_id))]
pub async fn upload_coursework(
    state: &StateInner,
    fields: UploadCourseworkFields,
    staged: &StagedUpload,
) -> ServerResult<OperationResult> {
    // Reject bad extensions before touching anything
    artifact::extension_of(&staged.original_file_name)?;

    let database = state.database().await?;
    let storage = state.storage().await?;

    let _slot = state
        .slot_locks
        .lock(&fields.class_id, fields.student_id)
        .await;

    let request = Request { fields, staged };

    let located = locate(database, request).await?;
    let resolved = resolve(located)?;

    tracing::debug!("Provisioning class directory");
    storage.ensure_class_dir(resolved.target.class()).await?;

    clear_stale(storage, &resolved).await?;
    place(storage, &resolved).await?;
    let download_ref = record_pointer(database, &resolved).await?;

    remove_previous(storage, &resolved).await;

    tracing::info!("Stored {}", resolved.target);

    Ok(OperationResult::new(Outcome::Success, "Coursework uploaded").with_path(download_ref))
}

async fn locate<'a>(
    database: &impl SatchelDatabase,
    request: Request<'a>,
) -> ServerResult<Located<'a>> {
    let record = database
        .find_coursework(&request.fields.class_id, request.fields.student_id)
        .await?;

    tracing::debug!(record = record.id, "Located record");

    Ok(Located { request, record })
}

fn resolve(located: Located<'_>) -> ServerResult<Resolved<'_>> {
    let fields = &located.request.fields;
    let target = ArtifactPath::for_upload(
        fields.class_id.clone(),
        fields.student_id,
        &fields.display_name,
        &located.request.staged.original_file_name,
    )?;

    Ok(Resolved { located, target })
}

/// Removes a stale file at the target path.
///
/// A file the record points to is left for the rename to replace, so
/// a failure further down never leaves the pointer dangling.
async fn clear_stale(storage: &LocalStorage, resolved: &Resolved<'_>) -> ServerResult<()> {
    if previous_artifact(resolved).as_ref() == Some(&resolved.target) {
        return Ok(());
    }

    if storage.remove_artifact(&resolved.target).await? {
        tracing::debug!("Removed stale artifact at target");
    }

    Ok(())
}

async fn place(storage: &LocalStorage, resolved: &Resolved<'_>) -> ServerResult<()> {
    storage
        .place(&resolved.located.request.staged.path, &resolved.target)
        .await
}

async fn record_pointer(
    database: &impl SatchelDatabase,
    resolved: &Resolved<'_>,
) -> ServerResult<DownloadRef> {
    let download_ref = DownloadRef::artifact(&resolved.target);
    database
        .set_artifact_ref(resolved.located.record.id, &download_ref)
        .await?;

    Ok(download_ref)
}

/// Removes the artifact the record pointed to before this upload.
///
/// Runs after the pointer moved on. A failure here only leaves an
/// orphan behind for reconciliation.
async fn remove_previous(storage: &LocalStorage, resolved: &Resolved<'_>) {
    let previous = match previous_artifact(resolved) {
        Some(previous) if previous != resolved.target => previous,
        _ => return,
    };

    let fields = &resolved.located.request.fields;
    if previous.class() != &fields.class_id || previous.student() != fields.student_id {
        return;
    }

    match storage.remove_artifact(&previous).await {
        Ok(true) => tracing::debug!("Removed previous artifact {}", previous),
        Ok(false) => {}
        Err(e) => tracing::warn!("Failed to remove previous artifact {}: {}", previous, e),
    }
}

/// Returns the artifact the record currently points to, if any.
fn previous_artifact(resolved: &Resolved<'_>) -> Option<ArtifactPath> {
    let previous = resolved.located.record.artifact_ref.as_deref()?;

    match previous
        .parse::<DownloadRef>()
        .and_then(|r| r.to_artifact_path())
    {
        Ok(previous) => Some(previous),
        Err(e) => {
            tracing::warn!("Ignoring malformed artifact reference {:?}: {}", previous, e);
            None
        }
    }
}
