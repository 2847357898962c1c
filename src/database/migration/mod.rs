use sea_orm_migration::prelude::*;

pub use sea_orm_migration::MigratorTrait;

mod m20250901_000001_create_users_table;
mod m20250901_000002_create_model_configs_table;
mod m20250901_000003_create_repository_tables;
mod m20250901_000004_create_doc_tables;
mod m20250901_000005_create_mcp_providers_table;
mod m20250901_000006_create_mcp_usage_logs_table;
mod m20250901_000007_create_mcp_daily_statistics_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_000001_create_users_table::Migration),
            Box::new(m20250901_000002_create_model_configs_table::Migration),
            Box::new(m20250901_000003_create_repository_tables::Migration),
            Box::new(m20250901_000004_create_doc_tables::Migration),
            Box::new(m20250901_000005_create_mcp_providers_table::Migration),
            Box::new(m20250901_000006_create_mcp_usage_logs_table::Migration),
            Box::new(m20250901_000007_create_mcp_daily_statistics_table::Migration),
        ]
    }
}

/// Common table and column identifiers
#[derive(Iden)]
pub enum Users {
    Table,
    Id,
    Name,
    Email,
    Role,
    IsDeleted,
    CreatedAt,
}

#[derive(Iden)]
pub enum ModelConfigs {
    Table,
    Id,
    Name,
    Provider,
    ModelId,
    Endpoint,
    ApiKey,
    IsActive,
    IsDefault,
    IsDeleted,
    CreatedAt,
}

#[derive(Iden)]
pub enum Repositories {
    Table,
    Id,
    OrgName,
    RepoName,
    IsDeleted,
    CreatedAt,
}

#[derive(Iden)]
pub enum RepositoryBranches {
    Table,
    Id,
    RepositoryId,
    BranchName,
    IsDeleted,
}

#[derive(Iden)]
pub enum BranchLanguages {
    Table,
    Id,
    RepositoryBranchId,
    LanguageCode,
    IsDeleted,
}

#[derive(Iden)]
pub enum DocCatalogs {
    Table,
    Id,
    BranchLanguageId,
    DocFileId,
    Title,
    Path,
    IsDeleted,
}

#[derive(Iden)]
pub enum DocFiles {
    Table,
    Id,
    Content,
    IsDeleted,
}

#[derive(Iden)]
pub enum McpProviders {
    Table,
    Id,
    Name,
    Description,
    ServerUrl,
    TransportType,
    RequiresApiKey,
    ApiKeyObtainUrl,
    SystemApiKey,
    ModelConfigId,
    IsActive,
    SortOrder,
    IconUrl,
    MaxRequestsPerDay,
    IsDeleted,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum McpUsageLogs {
    Table,
    Id,
    UserId,
    McpProviderId,
    ToolName,
    RequestSummary,
    ResponseStatus,
    DurationMs,
    InputTokens,
    OutputTokens,
    IpAddress,
    UserAgent,
    ErrorMessage,
    IsDeleted,
    CreatedAt,
}

#[derive(Iden)]
pub enum McpDailyStatistics {
    Table,
    Id,
    McpProviderId,
    Date,
    RequestCount,
    SuccessCount,
    ErrorCount,
    TotalDurationMs,
    InputTokens,
    OutputTokens,
    IsDeleted,
    CreatedAt,
    UpdatedAt,
}
