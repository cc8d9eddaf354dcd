use sea_orm_migration::prelude::*;

use crate::database::entity::coursework::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20240301_000002_create_coursework_table"
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
                    .col(ColumnDef::new(Column::StudentId).big_integer().not_null())
                    .col(ColumnDef::new(Column::ClassId).string_len(100).not_null())
                    .col(ColumnDef::new(Column::ArtifactRef).string())
                    .col(ColumnDef::new(Column::Rating).string_len(1))
                    .col(ColumnDef::new(Column::Remark).text())
                    .col(
                        ColumnDef::new(Column::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Column::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-coursework-class-student")
                    .table(Entity)
                    .col(Column::ClassId)
                    .col(Column::StudentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-coursework-artifact-ref")
                    .table(Entity)
                    .col(Column::ArtifactRef)
                    .to_owned(),
            )
            .await
    }
}
