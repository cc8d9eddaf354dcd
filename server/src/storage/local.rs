//! Local file storage.

use std::path::{Path, PathBuf};

use tokio::fs::{self, File};
use uuid::Uuid;

use super::{ensure_directory, remove_if_exists, INCOMING_DIR};
use crate::config::StorageConfig;
use crate::error::{ServerError, ServerResult};
use satchel::artifact::ArtifactPath;
use satchel::class::ClassId;

#[derive(Debug)]
pub struct LocalStorage {
    /// The directory holding one subdirectory per class.
    root: PathBuf,
}

/// An upload streamed to the staging directory, not yet placed.
#[derive(Debug)]
pub struct StagedUpload {
    /// Path of the staged file.
    pub path: PathBuf,

    /// File name as sent by the client.
    pub original_file_name: String,
}

impl LocalStorage {
    pub async fn new(config: &StorageConfig) -> ServerResult<Self> {
        let storage = Self {
            root: config.path.clone(),
        };

        ensure_directory(&storage.root).await?;
        ensure_directory(&storage.incoming_dir()).await?;

        Ok(storage)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the directory of a class.
    pub fn class_dir(&self, class: &ClassId) -> PathBuf {
        self.root.join(class.as_str())
    }

    /// Returns the absolute location of an artifact.
    pub fn artifact_path(&self, artifact: &ArtifactPath) -> PathBuf {
        self.class_dir(artifact.class()).join(artifact.file_name())
    }

    pub fn incoming_dir(&self) -> PathBuf {
        self.root.join(INCOMING_DIR)
    }

    /// Creates the directory of a class if it's missing.
    pub async fn ensure_class_dir(&self, class: &ClassId) -> ServerResult<PathBuf> {
        let dir = self.class_dir(class);
        ensure_directory(&dir).await?;
        Ok(dir)
    }

    /// Creates an empty file in the staging directory for an upload.
    pub async fn create_staged(
        &self,
        original_file_name: String,
    ) -> ServerResult<(StagedUpload, File)> {
        let path = self.incoming_dir().join(Uuid::new_v4().to_string());
        let file = File::create(&path)
            .await
            .map_err(ServerError::storage_error)?;

        Ok((
            StagedUpload {
                path,
                original_file_name,
            },
            file,
        ))
    }

    /// Removes an artifact.
    ///
    /// Returns whether the file existed.
    pub async fn remove_artifact(&self, artifact: &ArtifactPath) -> ServerResult<bool> {
        remove_if_exists(&self.artifact_path(artifact)).await
    }

    /// Moves a staged file to its final location.
    ///
    /// Both paths are on the same volume, so this is a single rename.
    pub async fn place(&self, staged: &Path, artifact: &ArtifactPath) -> ServerResult<()> {
        fs::rename(staged, self.artifact_path(artifact))
            .await
            .map_err(ServerError::storage_error)
    }
}
