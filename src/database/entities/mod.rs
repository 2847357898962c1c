pub mod branch_languages;
pub mod doc_catalogs;
pub mod doc_files;
pub mod mcp_daily_statistics;
pub mod mcp_providers;
pub mod mcp_usage_logs;
pub mod model_configs;
pub mod repositories;
pub mod repository_branches;
pub mod users;

pub use branch_languages::Entity as BranchLanguages;
pub use doc_catalogs::Entity as DocCatalogs;
pub use doc_files::Entity as DocFiles;
pub use mcp_daily_statistics::Entity as McpDailyStatistics;
pub use mcp_providers::Entity as McpProviders;
pub use mcp_usage_logs::Entity as McpUsageLogs;
pub use model_configs::Entity as ModelConfigs;
pub use repositories::Entity as Repositories;
pub use repository_branches::Entity as RepositoryBranches;
pub use users::Entity as Users;

// Type aliases
pub type BranchLanguage = branch_languages::Model;
pub type DocCatalog = doc_catalogs::Model;
pub type DocFile = doc_files::Model;
pub type DailyStatistic = mcp_daily_statistics::Model;
pub type Provider = mcp_providers::Model;
pub type UsageLog = mcp_usage_logs::Model;
pub type ModelConfig = model_configs::Model;
pub type Repository = repositories::Model;
pub type RepositoryBranch = repository_branches::Model;
pub type UserRecord = users::Model;
