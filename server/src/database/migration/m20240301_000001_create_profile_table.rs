use sea_orm_migration::prelude::*;

use crate::database::entity::profile::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20240301_000001_create_profile_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Column::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Column::SchoolId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Column::Name).string().not_null())
                    .col(ColumnDef::new(Column::Academy).string())
                    .col(ColumnDef::new(Column::ClassNumber).string())
                    .col(ColumnDef::new(Column::Grade).string())
                    .col(ColumnDef::new(Column::Supervisor).string())
                    .col(ColumnDef::new(Column::CurrentClass).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-profile-current-class")
                    .table(Entity)
                    .col(Column::CurrentClass)
                    .to_owned(),
            )
            .await
    }
}
