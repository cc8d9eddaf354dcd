//! Multipart form of a coursework upload.
//!
//! The body is `multipart/form-data` with the text fields below and
//! exactly one file part. The file part may use any field name.

use crate::class::ClassId;
use crate::student::{DisplayName, StudentId};

/// Name of the class ID field.
pub const FIELD_CLASS_ID: &str = "class_id";

/// Name of the student ID field.
pub const FIELD_STUDENT_ID: &str = "student_id";

/// Name of the display name field.
pub const FIELD_DISPLAY_NAME: &str = "display_name";

/// Validated text fields of an upload.
#[derive(Debug, Clone)]
pub struct UploadCourseworkFields {
    /// The class the coursework belongs to.
    pub class_id: ClassId,

    /// The student uploading.
    pub student_id: StudentId,

    /// The name used in the stored file name.
    pub display_name: DisplayName,
}
