use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::download::DownloadRef;

/// The outcome of an operation.
///
/// Every operation reports exactly one of these, whether it succeeded
/// or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// The operation completed.
    Success,

    /// The coursework record does not exist.
    NotFound,

    /// A filesystem operation failed.
    #[serde(rename = "IOError")]
    IoError,

    /// The record store failed.
    StoreError,

    /// There was nothing to export.
    ///
    /// This is not a failure.
    EmptyExport,

    /// Archive or report generation failed.
    ExportFailed,

    /// The operation exceeded its time bound.
    Timeout,

    /// The request was rejected before any work was done.
    BadRequest,
}

/// Result of an operation as seen by clients.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult {
    pub outcome: Outcome,

    /// A human-readable message.
    pub message: String,

    /// Download reference of the produced file, if any.
    pub path: Option<DownloadRef>,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::NotFound => "NotFound",
            Self::IoError => "IOError",
            Self::StoreError => "StoreError",
            Self::EmptyExport => "EmptyExport",
            Self::ExportFailed => "ExportFailed",
            Self::Timeout => "Timeout",
            Self::BadRequest => "BadRequest",
        }
    }

    /// Returns whether the outcome is a failure.
    pub fn is_failure(&self) -> bool {
        !matches!(self, Self::Success | Self::EmptyExport)
    }
}

impl OperationResult {
    pub fn new(outcome: Outcome, message: impl Into<String>) -> Self {
        Self {
            outcome,
            message: message.into(),
            path: None,
        }
    }

    pub fn with_path(mut self, path: DownloadRef) -> Self {
        self.path = Some(path);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize() {
        let result = OperationResult::new(Outcome::IoError, "Failed to move the upload");
        assert_eq!(
            r#"{"outcome":"IOError","message":"Failed to move the upload"}"#,
            serde_json::to_string(&result).unwrap()
        );

        let result = OperationResult::new(Outcome::Success, "Exported")
            .with_path(DownloadRef::export("archive_CS101_abc123.zip").unwrap());
        assert_eq!(
            r#"{"outcome":"Success","message":"Exported","path":"exports=archive_CS101_abc123.zip"}"#,
            serde_json::to_string(&result).unwrap()
        );
    }

    #[test]
    fn test_failure() {
        assert!(!Outcome::Success.is_failure());
        assert!(!Outcome::EmptyExport.is_failure());
        assert!(Outcome::Timeout.is_failure());
        assert!(Outcome::ExportFailed.is_failure());
    }
}
