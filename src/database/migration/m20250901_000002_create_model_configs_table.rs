use super::ModelConfigs;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ModelConfigs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ModelConfigs::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ModelConfigs::Name).string().not_null())
                    .col(ColumnDef::new(ModelConfigs::Provider).string().not_null())
                    .col(ColumnDef::new(ModelConfigs::ModelId).string().not_null())
                    .col(ColumnDef::new(ModelConfigs::Endpoint).string().not_null())
                    .col(ColumnDef::new(ModelConfigs::ApiKey).string().null())
                    .col(
                        ColumnDef::new(ModelConfigs::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(ModelConfigs::IsDefault)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ModelConfigs::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ModelConfigs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ModelConfigs::Table).to_owned())
            .await
    }
}
