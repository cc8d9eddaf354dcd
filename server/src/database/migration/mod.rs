//! Database migrations.

pub use sea_orm_migration::*;

mod m20240301_000001_create_profile_table;
mod m20240301_000002_create_coursework_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_profile_table::Migration),
            Box::new(m20240301_000002_create_coursework_table::Migration),
        ]
    }
}
