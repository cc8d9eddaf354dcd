//! Error handling.

use std::error::Error as StdError;

use displaydoc::Display;

pub type SatchelResult<T> = Result<T, SatchelError>;

/// An error.
#[derive(Debug, Display)]
pub enum SatchelError {
    /// Invalid class ID "{id}"
    InvalidClassId { id: String },

    /// Invalid student ID "{id}"
    InvalidStudentId { id: String },

    /// Invalid display name "{name}": {reason}
    InvalidDisplayName { name: String, reason: &'static str },

    /// Invalid file name "{name}": {reason}
    InvalidFileName { name: String, reason: &'static str },

    /// Invalid download reference "{reference}": {reason}
    InvalidDownloadRef {
        reference: String,
        reason: &'static str,
    },

    /// Invalid rating code "{code}"
    InvalidRatingCode { code: String },

    /// Invalid rank {rank}: must be between 1 and 5
    InvalidRank { rank: i64 },
}

impl SatchelError {
    pub fn name(&self) -> &'static str {
        match self {
            Self::InvalidClassId { .. } => "InvalidClassId",
            Self::InvalidStudentId { .. } => "InvalidStudentId",
            Self::InvalidDisplayName { .. } => "InvalidDisplayName",
            Self::InvalidFileName { .. } => "InvalidFileName",
            Self::InvalidDownloadRef { .. } => "InvalidDownloadRef",
            Self::InvalidRatingCode { .. } => "InvalidRatingCode",
            Self::InvalidRank { .. } => "InvalidRank",
        }
    }
}

impl StdError for SatchelError {}
