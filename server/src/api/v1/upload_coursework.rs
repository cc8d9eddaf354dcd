//! Coursework uploads.
//!
//! The file part is streamed into the staging directory of the storage
//! volume before the upload stager runs. A staged file that is not
//! placed is removed when the request ends, however it ends.

use anyhow::anyhow;
use axum::extract::{Extension, Json, Multipart};
use tokio::io::AsyncWriteExt;
use tracing::instrument;

use crate::coursework;
use crate::error::{ServerError, ServerResult};
use crate::storage::{remove_if_exists, StagedUpload};
use crate::State;
use satchel::api::v1::outcome::OperationResult;
use satchel::api::v1::upload_coursework::{
    UploadCourseworkFields, FIELD_CLASS_ID, FIELD_DISPLAY_NAME, FIELD_STUDENT_ID,
};
use satchel::class::ClassId;
use satchel::student::{DisplayName, StudentId};
use satchel::util::Finally;

/// Text fields collected from the form.
#[derive(Debug, Default)]
struct UploadForm {
    class_id: Option<ClassId>,
    student_id: Option<StudentId>,
    display_name: Option<DisplayName>,
}

impl UploadForm {
    fn set_text(&mut self, name: &str, value: String) -> ServerResult<()> {
        match name {
            FIELD_CLASS_ID => self.class_id = Some(ClassId::new(value)?),
            FIELD_STUDENT_ID => self.student_id = Some(value.parse()?),
            FIELD_DISPLAY_NAME => self.display_name = Some(DisplayName::new(value)?),
            _ => tracing::debug!("Ignoring unknown field {:?}", name),
        }

        Ok(())
    }

    fn into_fields(self) -> ServerResult<UploadCourseworkFields> {
        let missing = |field| ServerError::RequestError(anyhow!("Missing field {}", field));

        Ok(UploadCourseworkFields {
            class_id: self.class_id.ok_or_else(|| missing(FIELD_CLASS_ID))?,
            student_id: self.student_id.ok_or_else(|| missing(FIELD_STUDENT_ID))?,
            display_name: self
                .display_name
                .ok_or_else(|| missing(FIELD_DISPLAY_NAME))?,
        })
    }
}

/// Uploads the coursework of a student.
#[instrument(skip_all)]
pub(crate) async fn upload_coursework(
    Extension(state): Extension<State>,
    mut multipart: Multipart,
) -> ServerResult<Json<OperationResult>> {
    let storage = state.storage().await?;

    let mut form = UploadForm::default();
    let mut staged: Option<StagedUpload> = None;
    let mut cleanup = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(ServerError::request_error)?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);

        let file_name = match file_name {
            Some(file_name) => file_name,
            None => {
                let value = field.text().await.map_err(ServerError::request_error)?;
                form.set_text(&name, value)?;
                continue;
            }
        };

        if staged.is_some() {
            return Err(ServerError::RequestError(anyhow!(
                "Exactly one file must be uploaded"
            )));
        }

        let (upload, mut file) = storage.create_staged(file_name).await?;

        let path = upload.path.clone();
        cleanup = Some(Finally::new(async move {
            if let Err(e) = remove_if_exists(&path).await {
                tracing::warn!("Failed to remove staged upload: {}", e);
            }
        }));
        staged = Some(upload);

        while let Some(chunk) = field.chunk().await.map_err(ServerError::request_error)? {
            file.write_all(&chunk)
                .await
                .map_err(ServerError::storage_error)?;
        }

        file.flush().await.map_err(ServerError::storage_error)?;
    }

    let staged = staged
        .ok_or_else(|| ServerError::RequestError(anyhow!("Exactly one file must be uploaded")))?;
    let fields = form.into_fields()?;

    let result = coursework::upload_coursework(&state, fields, &staged).await?;

    if let Some(cleanup) = cleanup {
        cleanup.disarm();
    }

    Ok(Json(result))
}
