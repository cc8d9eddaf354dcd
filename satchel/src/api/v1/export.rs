use serde::{Deserialize, Serialize};

use crate::class::ClassId;

/// Exports the archive or the grade report of a class.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportRequest {
    pub class_id: ClassId,
}
