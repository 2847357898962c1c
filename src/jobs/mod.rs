pub mod scheduler;
pub mod statistics;

use crate::error::AppError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use scheduler::JobScheduler;
pub use statistics::StatisticsJob;

/// Configuration for the job system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsConfig {
    /// Enable/disable internal job scheduler
    pub enabled: bool,

    /// Daily statistics aggregation job configuration
    pub statistics: StatisticsJobConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticsJobConfig {
    /// Cron schedule expression (6-field format: sec min hour day month dow)
    pub schedule: String,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            statistics: StatisticsJobConfig {
                schedule: "0 0 * * * *".to_string(), // Hourly
            },
        }
    }
}

/// Result of job execution
#[derive(Debug, Clone)]
pub struct JobResult {
    pub success: bool,
    pub message: String,
    pub items_processed: u64,
}

impl JobResult {
    pub fn success_with_count(count: u64) -> Self {
        Self {
            success: true,
            message: format!("Successfully processed {count} items"),
            items_processed: count,
        }
    }

    pub fn failure(message: String) -> Self {
        Self {
            success: false,
            message,
            items_processed: 0,
        }
    }
}

/// Trait for executable jobs
#[async_trait]
pub trait Job: Send + Sync {
    /// Unique name for this job
    fn name(&self) -> &str;

    /// Execute the job
    async fn execute(&self) -> Result<JobResult, AppError>;
}
