//! Error handling.

use std::error::Error as StdError;
use std::time::Duration;

use anyhow::Error as AnyError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use displaydoc::Display;
use serde::Serialize;

use satchel::api::v1::outcome::Outcome;
use satchel::error::SatchelError;

pub type ServerResult<T> = Result<T, ServerError>;

/// An error.
#[derive(Debug, Display)]
pub enum ServerError {
    // Generic responses
    /// The URL you requested was not found.
    NotFound,

    // Specialized responses
    /// The requested coursework record does not exist.
    NoSuchCoursework,

    /// Database error: {0}
    DatabaseError(AnyError),

    /// Storage error: {0}
    StorageError(AnyError),

    /// Export error: {0}
    ExportError(AnyError),

    /// The {operation} did not finish within {after:?}.
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// General request error: {0}
    RequestError(AnyError),

    /// Error from the common components.
    SatchelError(SatchelError),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    code: u16,
    outcome: Outcome,
    error: String,
    message: String,
}

impl ServerError {
    pub fn database_error(error: impl StdError + Send + Sync + 'static) -> Self {
        Self::DatabaseError(AnyError::new(error))
    }

    pub fn storage_error(error: impl StdError + Send + Sync + 'static) -> Self {
        Self::StorageError(AnyError::new(error))
    }

    pub fn export_error(error: impl StdError + Send + Sync + 'static) -> Self {
        Self::ExportError(AnyError::new(error))
    }

    pub fn request_error(error: impl StdError + Send + Sync + 'static) -> Self {
        Self::RequestError(AnyError::new(error))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::NotFound => "NotFound",
            Self::NoSuchCoursework => "NoSuchCoursework",
            Self::DatabaseError(_) => "DatabaseError",
            Self::StorageError(_) => "StorageError",
            Self::ExportError(_) => "ExportError",
            Self::Timeout { .. } => "Timeout",
            Self::RequestError(_) => "RequestError",
            Self::SatchelError(e) => e.name(),
        }
    }

    /// Returns the outcome this error is reported as.
    pub fn outcome(&self) -> Outcome {
        match self {
            Self::NotFound | Self::NoSuchCoursework => Outcome::NotFound,
            Self::DatabaseError(_) => Outcome::StoreError,
            Self::StorageError(_) => Outcome::IoError,
            Self::ExportError(_) => Outcome::ExportFailed,
            Self::Timeout { .. } => Outcome::Timeout,
            Self::RequestError(_) | Self::SatchelError(_) => Outcome::BadRequest,
        }
    }

    /// Returns a message that is safe to show to clients.
    ///
    /// Store and filesystem errors can leak paths and connection
    /// details, so only their category is shown.
    fn client_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "The record store failed to process the request.".to_string(),
            Self::StorageError(_) => "A filesystem operation failed.".to_string(),
            Self::ExportError(_) => "Failed to generate the export.".to_string(),
            _ => self.to_string(),
        }
    }

    fn http_status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::NoSuchCoursework => StatusCode::NOT_FOUND,
            Self::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            Self::RequestError(_) => StatusCode::BAD_REQUEST,
            Self::SatchelError(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl StdError for ServerError {}

impl From<SatchelError> for ServerError {
    fn from(error: SatchelError) -> Self {
        Self::SatchelError(error)
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        if matches!(
            self,
            Self::DatabaseError(_) | Self::StorageError(_) | Self::ExportError(_) | Self::Timeout { .. }
        ) {
            tracing::error!("{:?}", self);
        }

        let status_code = self.http_status_code();
        let error_response = ErrorResponse {
            code: status_code.as_u16(),
            outcome: self.outcome(),
            error: self.name().to_string(),
            message: self.client_message(),
        };

        (status_code, Json(error_response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io;

    #[test]
    fn test_outcomes() {
        let io_error = || io::Error::new(io::ErrorKind::Other, "disk on fire");

        assert_eq!(Outcome::NotFound, ServerError::NoSuchCoursework.outcome());
        assert_eq!(
            Outcome::IoError,
            ServerError::storage_error(io_error()).outcome()
        );
        assert_eq!(
            Outcome::StoreError,
            ServerError::database_error(io_error()).outcome()
        );
        assert_eq!(
            Outcome::ExportFailed,
            ServerError::export_error(io_error()).outcome()
        );
        assert_eq!(
            Outcome::Timeout,
            ServerError::Timeout {
                operation: "archive export",
                after: Duration::from_secs(3),
            }
            .outcome()
        );
        assert_eq!(
            Outcome::BadRequest,
            ServerError::from(SatchelError::InvalidRank { rank: 9 }).outcome()
        );
    }

    #[test]
    fn test_client_message_is_sanitized() {
        let error = ServerError::storage_error(io::Error::new(
            io::ErrorKind::Other,
            "/srv/satchel/storage/CS101 is on fire",
        ));

        assert!(!error.client_message().contains("/srv/satchel"));
        assert!(error.to_string().contains("/srv/satchel"));
    }
}
