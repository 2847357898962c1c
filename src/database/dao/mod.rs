pub mod docs;
pub mod model_configs;
pub mod providers;
pub mod usage_logs;
pub mod users;

pub use docs::{DocHit, DocsDao};
pub use model_configs::ModelConfigsDao;
pub use providers::ProvidersDao;
pub use usage_logs::{DayAggregate, UsageLogDraft, UsageLogQuery, UsageLogsDao};
pub use users::UsersDao;
