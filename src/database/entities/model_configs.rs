use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// AI model configuration owned by the admin console; read-only here.
/// The summarizer resolves one of these to call the chat-completions backend.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "model_configs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    /// Backend flavor: "openai", "anthropic", ...
    pub provider: String,
    pub model_id: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub is_active: bool,
    pub is_default: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
