use serde::{Deserialize, Serialize};

use crate::download::DownloadRef;

/// Deletes a submitted artifact.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteCourseworkRequest {
    /// The reference stored in the coursework record.
    pub artifact_ref: DownloadRef,
}
