use super::McpUsageLogs;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(McpUsageLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(McpUsageLogs::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(McpUsageLogs::UserId).string().null())
                    .col(ColumnDef::new(McpUsageLogs::McpProviderId).string().null())
                    .col(ColumnDef::new(McpUsageLogs::ToolName).string().not_null())
                    .col(
                        ColumnDef::new(McpUsageLogs::RequestSummary)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(McpUsageLogs::ResponseStatus)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(McpUsageLogs::DurationMs)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(McpUsageLogs::InputTokens)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(McpUsageLogs::OutputTokens)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(McpUsageLogs::IpAddress).string().null())
                    .col(ColumnDef::new(McpUsageLogs::UserAgent).string().null())
                    .col(ColumnDef::new(McpUsageLogs::ErrorMessage).string().null())
                    .col(
                        ColumnDef::new(McpUsageLogs::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(McpUsageLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Aggregation scans a single day's logs; index the timestamp.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_mcp_usage_logs_created_at")
                    .table(McpUsageLogs::Table)
                    .col(McpUsageLogs::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_mcp_usage_logs_provider_id")
                    .table(McpUsageLogs::Table)
                    .col(McpUsageLogs::McpProviderId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(McpUsageLogs::Table).to_owned())
            .await
    }
}
