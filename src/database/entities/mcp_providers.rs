use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Configured MCP-compatible endpoint definition, managed by administrators.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "mcp_providers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub server_url: String,
    /// Transport hint for clients: "sse" or "streamable_http".
    pub transport_type: String,
    pub requires_api_key: bool,
    pub api_key_obtain_url: Option<String>,
    /// System-level key used when requires_api_key is false. Never exposed in DTOs.
    pub system_api_key: Option<String>,
    pub model_config_id: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub icon_url: Option<String>,
    /// Daily request quota, 0 means unlimited.
    pub max_requests_per_day: i32,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
