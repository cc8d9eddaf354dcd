//! Archive and report exports.
//!
//! Exports share one directory that holds the output of the most recent
//! export only. Every export runs under a global lock:
//!
//! 1. All files in the export directory are purged.
//! 2. The output is generated into a fresh staging directory inside the
//!    export directory, bounded by the configured timeout.
//! 3. The finished file is renamed into the export directory.
//!
//! The download reference is handed out only after the rename, so it
//! never points at a partially written file.

mod archive;
mod report;


use std::future::Future;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use tempfile::TempDir;
use tokio::fs;
use tokio::runtime::Handle;
use tokio::sync::{Mutex, MutexGuard};
use tokio::task;
use tokio::time;
use tracing::instrument;
use uuid::Uuid;

use crate::config::ExportConfig;
use crate::database::SatchelDatabase;
use crate::error::{ServerError, ServerResult};
use crate::storage::{ensure_directory, remove_if_exists};
use crate::StateInner;
use satchel::api::v1::outcome::{OperationResult, Outcome};
use satchel::class::ClassId;
use satchel::download::DownloadRef;

/// Name prefix of staging directories.
pub(crate) const STAGING_PREFIX: &str = ".export-";

/// The shared export directory.
#[derive(Debug)]
pub struct ExportDir {
    root: PathBuf,

    /// Held for the whole purge-generate-promote sequence.
    lock: Mutex<()>,
}

impl ExportDir {
    pub async fn new(config: &ExportConfig) -> ServerResult<Self> {
        ensure_directory(&config.path).await?;

        Ok(Self {
            root: config.path.clone(),
            lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().await
    }

    /// Removes all files from the export directory.
    ///
    /// Only regular files at the top level are touched.
    async fn purge(&self) -> ServerResult<usize> {
        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(ServerError::storage_error)?;

        let mut purged = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(ServerError::storage_error)?
        {
            let file_type = entry.file_type().await.map_err(ServerError::storage_error)?;
            if file_type.is_file() && remove_if_exists(&entry.path()).await? {
                purged += 1;
            }
        }

        Ok(purged)
    }

    /// Creates an empty staging directory.
    async fn create_staging(&self) -> ServerResult<Staging> {
        let root = self.root.clone();

        let dir = task::spawn_blocking(move || {
            tempfile::Builder::new()
                .prefix(STAGING_PREFIX)
                .tempdir_in(root)
        })
        .await
        .map_err(ServerError::storage_error)?
        .map_err(ServerError::storage_error)?;

        Ok(Staging { dir: Some(dir) })
    }

    /// Moves a finished file from a staging directory into the export
    /// directory.
    async fn promote(&self, staging: Staging, file_name: &str) -> ServerResult<DownloadRef> {
        let download_ref = DownloadRef::export(file_name)?;

        fs::rename(staging.path().join(file_name), self.root.join(file_name))
            .await
            .map_err(ServerError::storage_error)?;

        staging.discard().await;

        Ok(download_ref)
    }
}

/// A staging directory inside the export directory.
///
/// Removal happens on the blocking pool. Dropping the handle without
/// calling [`Staging::discard`] schedules the removal in the background.
#[derive(Debug)]
struct Staging {
    dir: Option<TempDir>,
}

impl Staging {
    fn path(&self) -> &Path {
        match &self.dir {
            Some(dir) => dir.path(),
            None => Path::new(""),
        }
    }

    /// Removes the staging directory and waits for it to finish.
    async fn discard(mut self) {
        if let Some(dir) = self.dir.take() {
            let path = dir.path().to_owned();
            match task::spawn_blocking(move || dir.close()).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::warn!("Failed to remove staging {:?}: {}", path, e),
                Err(e) => tracing::warn!("Failed to remove staging {:?}: {}", path, e),
            }
        }
    }
}

impl Drop for Staging {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            match Handle::try_current() {
                Ok(handle) => {
                    handle.spawn_blocking(move || drop(dir));
                }
                Err(_) => drop(dir),
            }
        }
    }
}

/// Generates a unique file name for an export.
fn export_file_name(prefix: &str, class: &ClassId, extension: &str) -> String {
    format!(
        "{}_{}_{}.{}",
        prefix,
        class,
        Uuid::new_v4().simple(),
        extension
    )
}

/// Runs export generation with the configured time bound.
async fn with_timeout<T, F>(
    operation: &'static str,
    timeout: Duration,
    generation: F,
) -> ServerResult<T>
where
    F: Future<Output = ServerResult<T>>,
{
    match time::timeout(timeout, generation).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("The {} did not finish within {:?}", operation, timeout);
            Err(ServerError::Timeout {
                operation,
                after: timeout,
            })
        }
    }
}

/// Exports the storage directory of a class as a zip archive.
#[instrument(skip_all, fields(class = %class))]
pub async fn export_archive(state: &StateInner, class: &ClassId) -> ServerResult<OperationResult> {
    let config = &state.config.export;
    let storage = state.storage().await?;
    let exports = state.exports().await?;

    let _lock = exports.lock().await;

    let purged = exports.purge().await?;
    tracing::debug!(purged, "Purged export directory");

    let source = storage.class_dir(class);
    match fs::metadata(&source).await {
        Ok(metadata) if metadata.is_dir() => {}
        Ok(_) => return Ok(empty_export(class)),
        Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(empty_export(class)),
        Err(e) => return Err(ServerError::storage_error(e)),
    }

    let file_name = export_file_name(&config.archive_prefix, class, "zip");
    let staging = exports.create_staging().await?;
    let target = staging.path().join(&file_name);

    let entries = with_timeout("archive export", config.timeout, async move {
        task::spawn_blocking(move || archive::write_archive(&source, &target))
            .await
            .map_err(ServerError::export_error)?
            .map_err(ServerError::ExportError)
    })
    .await?;

    // An existing but empty class directory is reported like a missing one
    // rather than published as an empty archive
    if entries == 0 {
        staging.discard().await;
        return Ok(empty_export(class));
    }

    let download_ref = exports.promote(staging, &file_name).await?;
    tracing::info!(entries, "Exported archive {}", file_name);

    Ok(OperationResult::new(
        Outcome::Success,
        format!("Exported {} files", entries),
    )
    .with_path(download_ref))
}

/// Exports the grade report of a class as a spreadsheet.
#[instrument(skip_all, fields(class = %class))]
pub async fn export_report(state: &StateInner, class: &ClassId) -> ServerResult<OperationResult> {
    let config = &state.config.export;
    let database = state.database().await?;
    let exports = state.exports().await?;

    let _lock = exports.lock().await;

    let purged = exports.purge().await?;
    tracing::debug!(purged, "Purged export directory");

    let file_name = export_file_name(&config.report_prefix, class, "xlsx");
    let staging = exports.create_staging().await?;
    let target = staging.path().join(&file_name);

    let students = with_timeout("report export", config.timeout, async {
        let rows = database.find_report_rows(class).await?;
        let count = rows.len();

        let report = report::Report {
            title: config.report_title.clone(),
            sheet_name: report::sheet_name(class),
            exported_at: Utc::now(),
            rows,
        };

        task::spawn_blocking(move || report.write_to(&target))
            .await
            .map_err(ServerError::export_error)?
            .map_err(ServerError::ExportError)?;

        Ok(count)
    })
    .await?;

    let download_ref = exports.promote(staging, &file_name).await?;
    tracing::info!(students, "Exported report {}", file_name);

    Ok(OperationResult::new(
        Outcome::Success,
        format!("Exported grades of {} students", students),
    )
    .with_path(download_ref))
}

fn empty_export(class: &ClassId) -> OperationResult {
    tracing::info!("Nothing to export");

    OperationResult::new(
        Outcome::EmptyExport,
        format!("No coursework has been submitted to {}", class),
    )
}
