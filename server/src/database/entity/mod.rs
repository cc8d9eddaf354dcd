//! Database entities.
//!
//! We use SeaORM and target PostgreSQL (production) and SQLite (development).
//!
//! Student profiles are owned by the surrounding system. Satchel only
//! reads them to render grade reports.

pub mod coursework;
pub mod profile;
