use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::class::ClassId;
use crate::rating::Rating;
use crate::student::StudentId;

/// Lists the coursework records of a student in a class.
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryCourseworkRequest {
    pub class_id: ClassId,
    pub student_id: StudentId,
}

/// A coursework record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseworkInfo {
    pub record_id: i64,
    pub student_id: i64,
    pub class_id: String,

    /// Download reference of the submitted artifact.
    pub artifact_ref: Option<String>,

    pub rating: Option<Rating>,
    pub remark: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
