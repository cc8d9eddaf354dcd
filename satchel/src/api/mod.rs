//! API request and response types.

pub mod v1;
