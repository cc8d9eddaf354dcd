pub mod delete_coursework;
pub mod export;
pub mod outcome;
pub mod query_coursework;
pub mod rate_coursework;
pub mod upload_coursework;
