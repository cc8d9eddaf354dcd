//! Test fixtures.

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DatabaseConnection};
use tempfile::TempDir;

use crate::config::{
    Config, DatabaseConfig, ExportConfig, ReconciliationConfig, StorageConfig,
};
use crate::database::entity::coursework::{self, CourseworkModel};
use crate::database::entity::profile::{self, ProfileModel};
use crate::database::migration::{Migrator, MigratorTrait};
use crate::{State, StateInner};

/// A server state backed by a temporary directory.
///
/// The directory holds the SQLite database, the storage root and the
/// export directory.
pub struct TestState {
    pub state: State,
    pub dir: TempDir,
}

impl TestState {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Creates a state with the default test configuration adjusted by `f`.
    pub async fn with_config(f: impl FnOnce(&mut Config)) -> Self {
        let dir = TempDir::new().unwrap();

        let mut config = Config {
            listen: "127.0.0.1:0".parse().unwrap(),
            allowed_hosts: Vec::new(),
            database: DatabaseConfig {
                url: format!("sqlite://{}?mode=rwc", dir.path().join("satchel.db").display()),
                heartbeat: false,
            },
            storage: StorageConfig {
                path: dir.path().join("finals"),
                max_upload_size: 1024 * 1024,
            },
            export: ExportConfig {
                path: dir.path().join("export"),
                timeout: Duration::from_secs(30),
                archive_prefix: "coursework_export".to_string(),
                report_prefix: "grade_export".to_string(),
                report_title: "Final Coursework Grades".to_string(),
            },
            reconciliation: ReconciliationConfig::default(),
        };

        f(&mut config);

        let state = StateInner::new(config).await;
        Migrator::up(state.database().await.unwrap(), None)
            .await
            .unwrap();

        Self { state, dir }
    }

    pub async fn db(&self) -> &DatabaseConnection {
        self.state.database().await.unwrap()
    }
}

/// Returns a fixed timestamp `offset` seconds into the term.
pub fn at(offset: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + offset, 0).unwrap()
}

pub async fn insert_profile(
    db: &DatabaseConnection,
    school_id: i64,
    name: &str,
    current_class: Option<&str>,
) -> ProfileModel {
    profile::ActiveModel {
        school_id: Set(school_id),
        name: Set(name.to_string()),
        academy: Set(Some("Engineering".to_string())),
        class_number: Set(Some("EE-2".to_string())),
        grade: Set(Some("2023".to_string())),
        supervisor: Set(Some("Dr. Chen".to_string())),
        current_class: Set(current_class.map(str::to_string)),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn insert_coursework(
    db: &DatabaseConnection,
    student_id: i64,
    class_id: &str,
    created_at: DateTime<Utc>,
) -> CourseworkModel {
    coursework::ActiveModel {
        student_id: Set(student_id),
        class_id: Set(class_id.to_string()),
        artifact_ref: Set(None),
        rating: Set(None),
        remark: Set(None),
        created_at: Set(created_at),
        updated_at: Set(created_at),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}
