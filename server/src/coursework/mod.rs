//! Coursework pipelines.
//!
//! Upload and deletion replace or remove the artifact of a slot and keep
//! the record's pointer in step with the file. Both hold the slot lock
//! for their whole duration. Files are always written before the
//! pointer is updated, so a crash in between leaves an orphan file and
//! never a dangling pointer.

mod delete;
mod rate;
mod upload;


pub use delete::delete_coursework;
pub use rate::{query_coursework, rate_coursework};
pub use upload::upload_coursework;
