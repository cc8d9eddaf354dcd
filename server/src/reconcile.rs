//! Reconciliation of storage against the record store.
//!
//! The pipelines write files before updating pointers, so a failure
//! halfway leaves an artifact no record points to. Reconciliation finds
//! these orphans, optionally reaps them, and reports pointers whose
//! file has gone missing. Pointers are never changed.
//!
//! It also removes leftovers of interrupted requests: staged uploads
//! and export staging directories.

use std::collections::HashSet;
use std::io::ErrorKind as IoErrorKind;
use std::path::Path;
use std::time::{Duration, SystemTime};

use anyhow::Result;
use tokio::fs;
use tokio::time;
use tracing::instrument;

use super::{State, StateInner};
use crate::config::Config;
use crate::database::SatchelDatabase;
use crate::export::STAGING_PREFIX;
use crate::storage::remove_if_exists;
use satchel::class::ClassId;
use satchel::download::{ContainerKind, DownloadRef};

/// Minimum age of a file before it's considered abandoned.
///
/// Reconciliation may run in another process than the API server, so
/// recent files could still belong to an ongoing request.
const STALE_AFTER: Duration = Duration::from_secs(3600);

/// Findings of a reconciliation run.
#[derive(Debug, Default)]
pub struct ReconciliationReport {
    /// Artifacts no record points to, as `{class}/{file}`.
    pub orphans: Vec<String>,

    /// Artifact references whose file is missing.
    pub dangling: Vec<String>,

    /// Number of orphans deleted.
    pub reaped: usize,

    /// Number of staged uploads and export staging directories removed.
    pub leftovers: usize,
}

/// Runs reconciliation periodically.
pub async fn run_reconciliation(config: Config) {
    let interval = config.reconciliation.interval;

    if interval == Duration::ZERO {
        // disabled
        return;
    }

    loop {
        // We don't stop even if it errors
        if let Err(e) = run_reconciliation_once(config.clone()).await {
            tracing::warn!("Reconciliation failed: {}", e);
        }

        time::sleep(interval).await;
    }
}

/// Runs reconciliation once.
#[instrument(skip_all)]
pub async fn run_reconciliation_once(config: Config) -> Result<ReconciliationReport> {
    tracing::info!("Running reconciliation...");

    // Exports can legitimately take as long as their timeout
    let stale_after = STALE_AFTER.max(config.export.timeout * 2);

    let state = StateInner::new(config).await;
    reconcile(&state, stale_after).await
}

pub(crate) async fn reconcile(
    state: &State,
    stale_after: Duration,
) -> Result<ReconciliationReport> {
    let mut report = ReconciliationReport::default();

    audit_artifacts(state, stale_after, &mut report).await?;
    remove_leftovers(state, stale_after, &mut report).await?;

    tracing::info!(
        orphans = report.orphans.len(),
        dangling = report.dangling.len(),
        reaped = report.reaped,
        leftovers = report.leftovers,
        "Reconciliation finished"
    );

    Ok(report)
}

#[instrument(skip_all)]
async fn audit_artifacts(
    state: &State,
    stale_after: Duration,
    report: &mut ReconciliationReport,
) -> Result<()> {
    let db = state.database().await?;
    let storage = state.storage().await?;

    let mut referenced = HashSet::new();
    for raw in db.find_artifact_refs().await? {
        match raw.parse::<DownloadRef>() {
            Ok(r) if r.kind() == ContainerKind::Coursework => {
                referenced.insert(r.path().to_string());
            }
            _ => tracing::warn!("Ignoring malformed artifact reference {:?}", raw),
        }
    }

    let mut on_disk = HashSet::new();
    let mut classes = fs::read_dir(storage.root()).await?;
    while let Some(class_entry) = classes.next_entry().await? {
        if !class_entry.file_type().await?.is_dir() {
            continue;
        }

        let class = match class_entry
            .file_name()
            .to_str()
            .and_then(|name| ClassId::new(name.to_string()).ok())
        {
            Some(class) => class,
            // Includes the staging directory
            None => continue,
        };

        let mut files = fs::read_dir(class_entry.path()).await?;
        while let Some(entry) = files.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                tracing::warn!("Unexpected entry {:?}", entry.path());
                continue;
            }

            let file_name = entry.file_name().to_string_lossy().into_owned();
            let relative = format!("{}/{}", class, file_name);

            if !referenced.contains(&relative) {
                tracing::warn!("Orphan artifact {}", relative);

                if state.config.reconciliation.reap_orphans
                    && is_stale(&entry.path(), stale_after).await
                    && remove_if_exists(&entry.path()).await?
                {
                    tracing::info!("Reaped orphan artifact {}", relative);
                    report.reaped += 1;
                }

                report.orphans.push(relative.clone());
            }

            on_disk.insert(relative);
        }
    }

    for relative in referenced.difference(&on_disk) {
        tracing::warn!("Dangling artifact reference {}", relative);
        report.dangling.push(relative.clone());
    }

    report.orphans.sort();
    report.dangling.sort();

    Ok(())
}

#[instrument(skip_all)]
async fn remove_leftovers(
    state: &State,
    stale_after: Duration,
    report: &mut ReconciliationReport,
) -> Result<()> {
    let storage = state.storage().await?;
    let exports = state.exports().await?;

    let mut staged = fs::read_dir(storage.incoming_dir()).await?;
    while let Some(entry) = staged.next_entry().await? {
        if is_stale(&entry.path(), stale_after).await && remove_if_exists(&entry.path()).await? {
            tracing::info!("Removed abandoned upload {:?}", entry.file_name());
            report.leftovers += 1;
        }
    }

    let mut entries = fs::read_dir(exports.root()).await?;
    while let Some(entry) = entries.next_entry().await? {
        let is_staging = entry.file_type().await?.is_dir()
            && entry.file_name().to_string_lossy().starts_with(STAGING_PREFIX);

        if is_staging && is_stale(&entry.path(), stale_after).await {
            match fs::remove_dir_all(entry.path()).await {
                Ok(()) => {}
                Err(e) if e.kind() == IoErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }

            tracing::info!("Removed abandoned export staging {:?}", entry.file_name());
            report.leftovers += 1;
        }
    }

    Ok(())
}

/// Returns whether a file was last modified at least `stale_after` ago.
async fn is_stale(path: &Path, stale_after: Duration) -> bool {
    if stale_after == Duration::ZERO {
        return true;
    }

    let modified = match fs::metadata(path).await.and_then(|m| m.modified()) {
        Ok(modified) => modified,
        Err(_) => return false,
    };

    SystemTime::now()
        .duration_since(modified)
        .map(|age| age >= stale_after)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs as std_fs;

    use crate::testing::{at, insert_coursework, TestState};

    #[tokio::test]
    async fn test_reconcile() {
        let t = TestState::new().await;
        let db = t.db().await;

        let finals = t.dir.path().join("finals");
        std_fs::create_dir_all(finals.join("CS101")).unwrap();
        std_fs::write(finals.join("CS101/1001_Alice.zip"), b"referenced").unwrap();
        std_fs::write(finals.join("CS101/1002_Bob.zip"), b"orphan").unwrap();

        let alice = insert_coursework(db, 1001, "CS101", at(0)).await;
        let carol = insert_coursework(db, 1003, "CS101", at(0)).await;
        db.set_artifact_ref(alice.id, &"coursework=CS101/1001_Alice.zip".parse().unwrap())
            .await
            .unwrap();
        db.set_artifact_ref(carol.id, &"coursework=CS101/1003_Carol.zip".parse().unwrap())
            .await
            .unwrap();

        let report = reconcile(&t.state, Duration::ZERO).await.unwrap();

        assert_eq!(vec!["CS101/1002_Bob.zip".to_string()], report.orphans);
        assert_eq!(vec!["CS101/1003_Carol.zip".to_string()], report.dangling);

        // Not reaped by default
        assert_eq!(0, report.reaped);
        assert!(finals.join("CS101/1002_Bob.zip").exists());

        // Pointers are left alone
        assert_eq!(2, db.find_artifact_refs().await.unwrap().len());
    }

    #[tokio::test]
    async fn test_reap_orphans() {
        let t = TestState::with_config(|config| config.reconciliation.reap_orphans = true).await;

        let finals = t.dir.path().join("finals");
        std_fs::create_dir_all(finals.join("CS101")).unwrap();
        std_fs::write(finals.join("CS101/1002_Bob.zip"), b"orphan").unwrap();

        // Too recent
        let report = reconcile(&t.state, Duration::from_secs(3600)).await.unwrap();
        assert_eq!(1, report.orphans.len());
        assert_eq!(0, report.reaped);

        let report = reconcile(&t.state, Duration::ZERO).await.unwrap();
        assert_eq!(1, report.reaped);
        assert!(!finals.join("CS101/1002_Bob.zip").exists());
    }

    #[tokio::test]
    async fn test_remove_leftovers() {
        let t = TestState::new().await;
        let storage = t.state.storage().await.unwrap();
        let exports = t.state.exports().await.unwrap();

        std_fs::write(storage.incoming_dir().join("abandoned"), b"half").unwrap();
        let staging = exports.root().join(format!("{}abandoned", STAGING_PREFIX));
        std_fs::create_dir_all(&staging).unwrap();
        std_fs::write(staging.join("report.xlsx"), b"half").unwrap();

        // Too recent
        let report = reconcile(&t.state, Duration::from_secs(3600)).await.unwrap();
        assert_eq!(0, report.leftovers);

        let report = reconcile(&t.state, Duration::ZERO).await.unwrap();
        assert_eq!(2, report.leftovers);
        assert!(!staging.exists());
        assert_eq!(0, std_fs::read_dir(storage.incoming_dir()).unwrap().count());
    }
}
