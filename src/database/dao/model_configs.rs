use crate::database::entities::{ModelConfig, mcp_providers, model_configs};
use crate::database::{DatabaseError, DatabaseResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use std::collections::HashMap;

/// Model config DAO for database operations
pub struct ModelConfigsDao {
    db: DatabaseConnection,
}

impl ModelConfigsDao {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: &str) -> DatabaseResult<Option<ModelConfig>> {
        model_configs::Entity::find()
            .filter(model_configs::Column::Id.eq(id))
            .filter(model_configs::Column::IsDeleted.eq(false))
            .one(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }

    /// Model config used for search summaries: the one bound to the
    /// lowest-sort-order active provider if any, otherwise the default
    /// (or newest) active config.
    pub async fn resolve_summarizer_config(&self) -> DatabaseResult<Option<ModelConfig>> {
        let bound = mcp_providers::Entity::find()
            .filter(mcp_providers::Column::IsActive.eq(true))
            .filter(mcp_providers::Column::IsDeleted.eq(false))
            .filter(mcp_providers::Column::ModelConfigId.is_not_null())
            .order_by_asc(mcp_providers::Column::SortOrder)
            .limit(1)
            .one(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        if let Some(provider) = bound {
            if let Some(config_id) = provider.model_config_id {
                if let Some(config) = self.find_by_id(&config_id).await? {
                    if config.is_active {
                        return Ok(Some(config));
                    }
                }
            }
        }

        let fallback = model_configs::Entity::find()
            .filter(model_configs::Column::IsActive.eq(true))
            .filter(model_configs::Column::IsDeleted.eq(false))
            .order_by_desc(model_configs::Column::IsDefault)
            .order_by_desc(model_configs::Column::CreatedAt)
            .limit(1)
            .one(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        Ok(fallback)
    }

    /// Resolve config display names for a batch of ids.
    pub async fn names_by_ids(
        &self,
        ids: &[String],
    ) -> DatabaseResult<HashMap<String, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let configs = model_configs::Entity::find()
            .filter(model_configs::Column::Id.is_in(ids.iter().cloned()))
            .all(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        Ok(configs.into_iter().map(|c| (c.id, c.name)).collect())
    }
}
