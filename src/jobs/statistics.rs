use super::{Job, JobResult};
use crate::database::DatabaseManager;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveTime, Utc};
use std::sync::Arc;
use tracing::info;

/// Rolls raw usage logs up into per-provider daily statistics rows.
///
/// Each run covers today and yesterday (UTC) so that logs written
/// around midnight still land in the right day's rollup. Re-running
/// overwrites the rows, so the job is idempotent.
pub struct StatisticsJob {
    database: Arc<dyn DatabaseManager>,
}

impl StatisticsJob {
    pub fn new(database: Arc<dyn DatabaseManager>) -> Self {
        Self { database }
    }

    async fn aggregate_day(&self, day_start: DateTime<Utc>) -> Result<u64, AppError> {
        let usage_logs = self.database.usage_logs();
        let aggregates = usage_logs
            .aggregate_day(day_start)
            .await
            .map_err(|e| AppError::Internal(format!("Aggregation query failed: {}", e)))?;

        let count = aggregates.len() as u64;
        for (provider_id, agg) in &aggregates {
            usage_logs
                .upsert_daily_statistic(provider_id, day_start, agg)
                .await
                .map_err(|e| {
                    AppError::Internal(format!(
                        "Failed to upsert daily statistic for provider {}: {}",
                        provider_id, e
                    ))
                })?;
        }

        info!(
            "Aggregated daily statistics for {}: {} provider rows",
            day_start.format("%Y-%m-%d"),
            count
        );
        Ok(count)
    }
}

#[async_trait]
impl Job for StatisticsJob {
    fn name(&self) -> &str {
        "daily_statistics"
    }

    async fn execute(&self) -> Result<JobResult, AppError> {
        let today = Utc::now()
            .date_naive()
            .and_time(NaiveTime::MIN)
            .and_utc();
        let yesterday = today - Duration::days(1);

        let mut processed = 0;
        processed += self.aggregate_day(yesterday).await?;
        processed += self.aggregate_day(today).await?;

        Ok(JobResult::success_with_count(processed))
    }
}
