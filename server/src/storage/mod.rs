//! Coursework storage.
//!
//! Artifacts live in one directory per class under the storage root.
//! Uploads are streamed into a staging directory on the same volume
//! first so they can be placed with a rename.

mod local;

#[cfg(test)]
mod tests;

use std::io::ErrorKind as IoErrorKind;
use std::path::Path;

use tokio::fs;

use crate::error::{ServerError, ServerResult};

pub(crate) use self::local::{LocalStorage, StagedUpload};

/// Name of the staging directory under the storage root.
///
/// Never a valid class ID.
pub(crate) const INCOMING_DIR: &str = ".incoming";

/// Ensures that a directory exists, creating missing parents.
///
/// Safe to call concurrently for the same path.
pub(crate) async fn ensure_directory(path: &Path) -> ServerResult<()> {
    match fs::create_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == IoErrorKind::AlreadyExists => match fs::metadata(path).await {
            Ok(metadata) if metadata.is_dir() => Ok(()),
            _ => Err(ServerError::storage_error(e)),
        },
        Err(e) => Err(ServerError::storage_error(e)),
    }
}

/// Removes a file, treating a missing file as success.
///
/// Returns whether the file existed.
pub(crate) async fn remove_if_exists(path: &Path) -> ServerResult<bool> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == IoErrorKind::NotFound => Ok(false),
        Err(e) => Err(ServerError::storage_error(e)),
    }
}
