use super::McpProviders;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(McpProviders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(McpProviders::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(McpProviders::Name).string().not_null())
                    .col(ColumnDef::new(McpProviders::Description).string().null())
                    .col(ColumnDef::new(McpProviders::ServerUrl).string().not_null())
                    .col(
                        ColumnDef::new(McpProviders::TransportType)
                            .string()
                            .not_null()
                            .default("streamable_http"),
                    )
                    .col(
                        ColumnDef::new(McpProviders::RequiresApiKey)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(McpProviders::ApiKeyObtainUrl)
                            .string()
                            .null(),
                    )
                    .col(ColumnDef::new(McpProviders::SystemApiKey).string().null())
                    .col(ColumnDef::new(McpProviders::ModelConfigId).string().null())
                    .col(
                        ColumnDef::new(McpProviders::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(McpProviders::SortOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(McpProviders::IconUrl).string().null())
                    .col(
                        ColumnDef::new(McpProviders::MaxRequestsPerDay)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(McpProviders::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(McpProviders::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(McpProviders::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(McpProviders::Table).to_owned())
            .await
    }
}
