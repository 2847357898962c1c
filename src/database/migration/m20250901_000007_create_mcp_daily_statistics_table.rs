use super::McpDailyStatistics;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(McpDailyStatistics::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(McpDailyStatistics::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(McpDailyStatistics::McpProviderId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(McpDailyStatistics::Date)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(McpDailyStatistics::RequestCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(McpDailyStatistics::SuccessCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(McpDailyStatistics::ErrorCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(McpDailyStatistics::TotalDurationMs)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(McpDailyStatistics::InputTokens)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(McpDailyStatistics::OutputTokens)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(McpDailyStatistics::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(McpDailyStatistics::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(McpDailyStatistics::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // One rollup row per provider per day.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_mcp_daily_statistics_provider_date")
                    .table(McpDailyStatistics::Table)
                    .col(McpDailyStatistics::McpProviderId)
                    .col(McpDailyStatistics::Date)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(McpDailyStatistics::Table).to_owned())
            .await
    }
}
