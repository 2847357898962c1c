use crate::database::entities::{
    DailyStatistic, UsageLog, mcp_daily_statistics, mcp_usage_logs,
};
use crate::database::{DatabaseError, DatabaseResult};
use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use std::collections::HashMap;

/// A usage log as captured by the middleware, before user and provider
/// attribution has been resolved.
#[derive(Debug, Clone)]
pub struct UsageLogDraft {
    pub user_id: Option<String>,
    pub provider_id: Option<String>,
    pub tool_name: String,
    pub request_summary: Option<String>,
    pub response_status: i32,
    pub duration_ms: i64,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub error_message: Option<String>,
}

/// Filters for the admin usage log listing.
#[derive(Debug, Clone, Default)]
pub struct UsageLogQuery {
    pub user_id: Option<String>,
    pub provider_id: Option<String>,
    /// Substring match on the tool name.
    pub tool_name: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub page: u64,
    pub page_size: u64,
}

/// Per-provider rollup of one day's logs.
#[derive(Debug, Clone, Default)]
pub struct DayAggregate {
    pub request_count: i64,
    pub success_count: i64,
    pub error_count: i64,
    pub total_duration_ms: i64,
    pub input_tokens: i64,
    pub output_tokens: i64,
}

/// Usage log DAO for database operations
pub struct UsageLogsDao {
    db: DatabaseConnection,
}

impl UsageLogsDao {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn insert(&self, log: UsageLog) -> DatabaseResult<UsageLog> {
        let active = log.into_active_model().reset_all();
        active
            .insert(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }

    /// Filtered, newest-first page of usage logs plus the total count
    /// matching the filters.
    pub async fn query(&self, q: &UsageLogQuery) -> DatabaseResult<(Vec<UsageLog>, u64)> {
        let mut select = mcp_usage_logs::Entity::find()
            .filter(mcp_usage_logs::Column::IsDeleted.eq(false));

        if let Some(user_id) = &q.user_id {
            select = select.filter(mcp_usage_logs::Column::UserId.eq(user_id));
        }
        if let Some(provider_id) = &q.provider_id {
            select = select.filter(mcp_usage_logs::Column::McpProviderId.eq(provider_id));
        }
        if let Some(tool_name) = &q.tool_name {
            select = select.filter(mcp_usage_logs::Column::ToolName.contains(tool_name));
        }
        if let Some(start) = q.start {
            select = select.filter(mcp_usage_logs::Column::CreatedAt.gte(start));
        }
        if let Some(end) = q.end {
            select = select.filter(mcp_usage_logs::Column::CreatedAt.lte(end));
        }

        let paginator = select
            .order_by_desc(mcp_usage_logs::Column::CreatedAt)
            .paginate(&self.db, q.page_size);

        let total = paginator
            .num_items()
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        // page is 1-based at the API surface.
        let items = paginator
            .fetch_page(q.page.saturating_sub(1))
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        Ok((items, total))
    }

    /// Fold one UTC day's logs into per-provider aggregates. Logs with
    /// no provider attribution are skipped.
    pub async fn aggregate_day(
        &self,
        day_start: DateTime<Utc>,
    ) -> DatabaseResult<HashMap<String, DayAggregate>> {
        let day_end = day_start + Duration::days(1);

        let logs = mcp_usage_logs::Entity::find()
            .filter(mcp_usage_logs::Column::IsDeleted.eq(false))
            .filter(mcp_usage_logs::Column::CreatedAt.gte(day_start))
            .filter(mcp_usage_logs::Column::CreatedAt.lt(day_end))
            .all(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        let mut aggregates: HashMap<String, DayAggregate> = HashMap::new();
        for log in logs {
            let Some(provider_id) = log.mcp_provider_id else {
                continue;
            };
            let agg = aggregates.entry(provider_id).or_default();
            agg.request_count += 1;
            if (200..300).contains(&log.response_status) {
                agg.success_count += 1;
            } else if log.response_status >= 400 {
                agg.error_count += 1;
            }
            agg.total_duration_ms += log.duration_ms;
            agg.input_tokens += i64::from(log.input_tokens);
            agg.output_tokens += i64::from(log.output_tokens);
        }

        Ok(aggregates)
    }

    /// Find-or-create the (provider, day) rollup row and overwrite its
    /// counters. Re-running for the same day is idempotent.
    pub async fn upsert_daily_statistic(
        &self,
        provider_id: &str,
        day_start: DateTime<Utc>,
        agg: &DayAggregate,
    ) -> DatabaseResult<()> {
        let existing = mcp_daily_statistics::Entity::find()
            .filter(mcp_daily_statistics::Column::McpProviderId.eq(provider_id))
            .filter(mcp_daily_statistics::Column::Date.eq(day_start))
            .one(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        match existing {
            Some(row) => {
                let mut active = row.into_active_model();
                active.request_count = Set(agg.request_count);
                active.success_count = Set(agg.success_count);
                active.error_count = Set(agg.error_count);
                active.total_duration_ms = Set(agg.total_duration_ms);
                active.input_tokens = Set(agg.input_tokens);
                active.output_tokens = Set(agg.output_tokens);
                active.is_deleted = Set(false);
                active.updated_at = Set(Some(Utc::now()));
                active
                    .update(&self.db)
                    .await
                    .map_err(|e| DatabaseError::Database(e.to_string()))?;
            }
            None => {
                let row = DailyStatistic {
                    id: uuid::Uuid::new_v4().to_string(),
                    mcp_provider_id: provider_id.to_string(),
                    date: day_start,
                    request_count: agg.request_count,
                    success_count: agg.success_count,
                    error_count: agg.error_count,
                    total_duration_ms: agg.total_duration_ms,
                    input_tokens: agg.input_tokens,
                    output_tokens: agg.output_tokens,
                    is_deleted: false,
                    created_at: Utc::now(),
                    updated_at: None,
                };
                row.into_active_model()
                    .reset_all()
                    .insert(&self.db)
                    .await
                    .map_err(|e| DatabaseError::Database(e.to_string()))?;
            }
        }

        Ok(())
    }

    /// Daily rollups on or after `since`, oldest first.
    pub async fn daily_statistics_since(
        &self,
        since: DateTime<Utc>,
    ) -> DatabaseResult<Vec<DailyStatistic>> {
        mcp_daily_statistics::Entity::find()
            .filter(mcp_daily_statistics::Column::IsDeleted.eq(false))
            .filter(mcp_daily_statistics::Column::Date.gte(since))
            .order_by_asc(mcp_daily_statistics::Column::Date)
            .all(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }
}
