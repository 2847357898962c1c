//! Admin management API: provider CRUD, usage log listing, and usage
//! statistics. Routes are guarded by the admin middleware.

use crate::database::dao::UsageLogQuery;
use crate::database::entities::Provider;
use crate::error::AppError;
use crate::routes::{REPOSITORY_SCOPED_MCP_PATH_TEMPLATE, ok, ok_with};
use crate::server::Server;
use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::info;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpProviderRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_transport_type")]
    pub transport_type: String,
    #[serde(default)]
    pub requires_api_key: bool,
    #[serde(default)]
    pub api_key_obtain_url: Option<String>,
    /// `None` on update means "keep the stored key".
    #[serde(default)]
    pub system_api_key: Option<String>,
    #[serde(default)]
    pub model_config_id: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub max_requests_per_day: i32,
}

fn default_transport_type() -> String {
    "streamable_http".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct McpProviderDto {
    id: String,
    name: String,
    description: Option<String>,
    server_url: &'static str,
    transport_type: String,
    requires_api_key: bool,
    api_key_obtain_url: Option<String>,
    has_system_api_key: bool,
    model_config_id: Option<String>,
    model_config_name: Option<String>,
    is_active: bool,
    max_requests_per_day: i32,
    created_at: DateTime<Utc>,
}

impl McpProviderDto {
    fn from_provider(p: Provider, model_config_name: Option<String>) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            server_url: REPOSITORY_SCOPED_MCP_PATH_TEMPLATE,
            transport_type: p.transport_type,
            requires_api_key: p.requires_api_key,
            api_key_obtain_url: p.api_key_obtain_url,
            has_system_api_key: p
                .system_api_key
                .as_deref()
                .is_some_and(|k| !k.is_empty()),
            model_config_id: p.model_config_id,
            model_config_name,
            is_active: p.is_active,
            max_requests_per_day: p.max_requests_per_day,
            created_at: p.created_at,
        }
    }
}

fn db_err(e: impl std::fmt::Display) -> AppError {
    AppError::Internal(format!("Database error: {}", e))
}

/// `GET /api/admin/mcp-providers`
pub async fn list_providers(State(server): State<Server>) -> Result<Json<Value>, AppError> {
    let providers = server.database.providers().list().await.map_err(db_err)?;

    let model_ids: Vec<String> = providers
        .iter()
        .filter_map(|p| p.model_config_id.clone())
        .collect();
    let model_names = server
        .database
        .model_configs()
        .names_by_ids(&model_ids)
        .await
        .map_err(db_err)?;

    let data: Vec<McpProviderDto> = providers
        .into_iter()
        .map(|p| {
            let name = p
                .model_config_id
                .as_ref()
                .and_then(|id| model_names.get(id).cloned());
            McpProviderDto::from_provider(p, name)
        })
        .collect();

    Ok(ok_with(data))
}

/// `POST /api/admin/mcp-providers`
pub async fn create_provider(
    State(server): State<Server>,
    Json(request): Json<McpProviderRequest>,
) -> Result<Json<Value>, AppError> {
    let provider = Provider {
        id: uuid::Uuid::new_v4().to_string(),
        name: request.name,
        description: request.description,
        server_url: REPOSITORY_SCOPED_MCP_PATH_TEMPLATE.to_string(),
        transport_type: request.transport_type,
        requires_api_key: request.requires_api_key,
        api_key_obtain_url: request.api_key_obtain_url,
        system_api_key: request.system_api_key,
        model_config_id: request.model_config_id,
        is_active: request.is_active,
        sort_order: 0,
        icon_url: None,
        max_requests_per_day: request.max_requests_per_day,
        is_deleted: false,
        created_at: Utc::now(),
        updated_at: None,
    };

    let provider = server
        .database
        .providers()
        .insert(provider)
        .await
        .map_err(db_err)?;

    info!("MCP provider created: {} ({})", provider.name, provider.id);

    let model_name = match &provider.model_config_id {
        Some(id) => server
            .database
            .model_configs()
            .find_by_id(id)
            .await
            .map_err(db_err)?
            .map(|m| m.name),
        None => None,
    };

    Ok(ok_with(McpProviderDto::from_provider(provider, model_name)))
}

/// `PUT /api/admin/mcp-providers/{id}`. Full overwrite, except the
/// system API key which is only replaced when the request carries one.
pub async fn update_provider(
    State(server): State<Server>,
    Path(id): Path<String>,
    Json(request): Json<McpProviderRequest>,
) -> Result<Json<Value>, AppError> {
    let providers = server.database.providers();
    let mut provider = providers
        .find_by_id(&id)
        .await
        .map_err(db_err)?
        .ok_or_else(|| AppError::NotFound("MCP provider not found".to_string()))?;

    provider.name = request.name;
    provider.description = request.description;
    provider.server_url = REPOSITORY_SCOPED_MCP_PATH_TEMPLATE.to_string();
    provider.transport_type = request.transport_type;
    provider.requires_api_key = request.requires_api_key;
    provider.api_key_obtain_url = request.api_key_obtain_url;
    if let Some(system_api_key) = request.system_api_key {
        provider.system_api_key = Some(system_api_key);
    }
    provider.model_config_id = request.model_config_id;
    provider.is_active = request.is_active;
    provider.max_requests_per_day = request.max_requests_per_day;
    provider.updated_at = Some(Utc::now());

    let provider = providers.update(provider).await.map_err(db_err)?;
    info!("MCP provider updated: {} ({})", provider.name, provider.id);

    Ok(ok())
}

/// `DELETE /api/admin/mcp-providers/{id}`. Soft delete.
pub async fn delete_provider(
    State(server): State<Server>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let providers = server.database.providers();
    let mut provider = providers
        .find_by_id(&id)
        .await
        .map_err(db_err)?
        .ok_or_else(|| AppError::NotFound("MCP provider not found".to_string()))?;

    provider.is_deleted = true;
    provider.updated_at = Some(Utc::now());
    let provider = providers.update(provider).await.map_err(db_err)?;
    info!("MCP provider deleted: {} ({})", provider.name, provider.id);

    Ok(ok())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageLogParams {
    #[serde(default)]
    pub mcp_provider_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub page_size: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct McpUsageLogDto {
    id: String,
    user_id: Option<String>,
    user_name: Option<String>,
    mcp_provider_id: Option<String>,
    mcp_provider_name: Option<String>,
    tool_name: String,
    request_summary: Option<String>,
    response_status: i32,
    duration_ms: i64,
    input_tokens: i32,
    output_tokens: i32,
    ip_address: Option<String>,
    error_message: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PagedResult<T> {
    items: Vec<T>,
    total: u64,
    page: u64,
    page_size: u64,
}

/// `GET /api/admin/mcp-providers/usage-logs`
pub async fn list_usage_logs(
    State(server): State<Server>,
    Query(params): Query<UsageLogParams>,
) -> Result<Json<Value>, AppError> {
    let page = match params.page {
        Some(p) if p > 0 => p as u64,
        _ => 1,
    };
    let page_size = match params.page_size {
        Some(s) if s > 100 => 100,
        Some(s) if s > 0 => s as u64,
        _ => 20,
    };

    let query = UsageLogQuery {
        user_id: params.user_id.filter(|s| !s.is_empty()),
        provider_id: params.mcp_provider_id.filter(|s| !s.is_empty()),
        tool_name: params.tool_name.filter(|s| !s.is_empty()),
        start: None,
        end: None,
        page,
        page_size,
    };

    let (logs, total) = server
        .database
        .usage_logs()
        .query(&query)
        .await
        .map_err(db_err)?;

    let user_ids: Vec<String> = logs.iter().filter_map(|l| l.user_id.clone()).collect();
    let provider_ids: Vec<String> = logs
        .iter()
        .filter_map(|l| l.mcp_provider_id.clone())
        .collect();

    let user_names = server
        .database
        .users()
        .names_by_ids(&user_ids)
        .await
        .map_err(db_err)?;
    let provider_names = server
        .database
        .providers()
        .names_by_ids(&provider_ids)
        .await
        .map_err(db_err)?;

    let items: Vec<McpUsageLogDto> = logs
        .into_iter()
        .map(|l| McpUsageLogDto {
            user_name: l
                .user_id
                .as_ref()
                .and_then(|id| user_names.get(id).cloned()),
            mcp_provider_name: l
                .mcp_provider_id
                .as_ref()
                .and_then(|id| provider_names.get(id).cloned()),
            id: l.id,
            user_id: l.user_id,
            mcp_provider_id: l.mcp_provider_id,
            tool_name: l.tool_name,
            request_summary: l.request_summary,
            response_status: l.response_status,
            duration_ms: l.duration_ms,
            input_tokens: l.input_tokens,
            output_tokens: l.output_tokens,
            ip_address: l.ip_address,
            error_message: l.error_message,
            created_at: l.created_at,
        })
        .collect();

    Ok(ok_with(PagedResult {
        items,
        total,
        page,
        page_size,
    }))
}

#[derive(Debug, Deserialize)]
pub struct StatisticsParams {
    #[serde(default)]
    pub days: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DailyUsageDto {
    date: String,
    request_count: i64,
    success_count: i64,
    error_count: i64,
    input_tokens: i64,
    output_tokens: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UsageStatisticsDto {
    daily_usages: Vec<DailyUsageDto>,
    total_requests: i64,
    total_successful: i64,
    total_errors: i64,
    total_input_tokens: i64,
    total_output_tokens: i64,
}

/// `GET /api/admin/mcp-providers/statistics?days=N`. Zero-filled daily
/// series across all providers plus totals.
pub async fn usage_statistics(
    State(server): State<Server>,
    Query(params): Query<StatisticsParams>,
) -> Result<Json<Value>, AppError> {
    let days = params.days.unwrap_or(30).clamp(1, 365);

    let today = Utc::now().date_naive();
    let start_date = today - Duration::days(days - 1);
    let start = start_date.and_time(NaiveTime::MIN).and_utc();

    let rows = server
        .database
        .usage_logs()
        .daily_statistics_since(start)
        .await
        .map_err(db_err)?;

    // Sum across providers per day.
    let mut per_day: HashMap<chrono::NaiveDate, DailyUsageDto> = HashMap::new();
    for row in rows {
        let day = row.date.date_naive();
        let entry = per_day.entry(day).or_insert_with(|| DailyUsageDto {
            date: day.format("%Y-%m-%d").to_string(),
            request_count: 0,
            success_count: 0,
            error_count: 0,
            input_tokens: 0,
            output_tokens: 0,
        });
        entry.request_count += row.request_count;
        entry.success_count += row.success_count;
        entry.error_count += row.error_count;
        entry.input_tokens += row.input_tokens;
        entry.output_tokens += row.output_tokens;
    }

    let mut response = UsageStatisticsDto {
        daily_usages: Vec::new(),
        total_requests: 0,
        total_successful: 0,
        total_errors: 0,
        total_input_tokens: 0,
        total_output_tokens: 0,
    };

    let mut date = start_date;
    while date <= today {
        let usage = per_day.remove(&date).unwrap_or_else(|| DailyUsageDto {
            date: date.format("%Y-%m-%d").to_string(),
            request_count: 0,
            success_count: 0,
            error_count: 0,
            input_tokens: 0,
            output_tokens: 0,
        });
        response.total_requests += usage.request_count;
        response.total_successful += usage.success_count;
        response.total_errors += usage.error_count;
        response.total_input_tokens += usage.input_tokens;
        response.total_output_tokens += usage.output_tokens;
        response.daily_usages.push(usage);
        date += Duration::days(1);
    }

    Ok(ok_with(response))
}
