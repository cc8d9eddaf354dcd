use serde::{Deserialize, Serialize};

/// Rates a coursework record.
#[derive(Debug, Serialize, Deserialize)]
pub struct RateCourseworkRequest {
    /// ID of the coursework record.
    pub record_id: i64,

    /// Numeric rank, from 1 (fail) to 5 (excellent).
    pub rank: i64,

    /// Remark overriding the default one of the rank.
    #[serde(default)]
    pub remark: Option<String>,
}
