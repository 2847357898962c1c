use crate::database::entities::{Provider, mcp_providers};
use crate::database::{DatabaseError, DatabaseResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, QuerySelect,
};

/// Provider DAO for database operations
pub struct ProvidersDao {
    db: DatabaseConnection,
}

impl ProvidersDao {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// All non-deleted providers ordered by sort order, then name.
    pub async fn list(&self) -> DatabaseResult<Vec<Provider>> {
        mcp_providers::Entity::find()
            .filter(mcp_providers::Column::IsDeleted.eq(false))
            .order_by_asc(mcp_providers::Column::SortOrder)
            .order_by_asc(mcp_providers::Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }

    /// Active, non-deleted providers for the public listing.
    pub async fn list_active(&self) -> DatabaseResult<Vec<Provider>> {
        mcp_providers::Entity::find()
            .filter(mcp_providers::Column::IsActive.eq(true))
            .filter(mcp_providers::Column::IsDeleted.eq(false))
            .order_by_asc(mcp_providers::Column::SortOrder)
            .order_by_asc(mcp_providers::Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }

    pub async fn find_by_id(&self, id: &str) -> DatabaseResult<Option<Provider>> {
        mcp_providers::Entity::find()
            .filter(mcp_providers::Column::Id.eq(id))
            .filter(mcp_providers::Column::IsDeleted.eq(false))
            .one(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }

    /// Id of the first active provider by sort order, used as the
    /// default attribution target for usage logs.
    pub async fn first_active_id(&self) -> DatabaseResult<Option<String>> {
        let provider = mcp_providers::Entity::find()
            .filter(mcp_providers::Column::IsActive.eq(true))
            .filter(mcp_providers::Column::IsDeleted.eq(false))
            .order_by_asc(mcp_providers::Column::SortOrder)
            .limit(1)
            .one(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        Ok(provider.map(|p| p.id))
    }

    pub async fn insert(&self, provider: Provider) -> DatabaseResult<Provider> {
        let active = provider.into_active_model().reset_all();
        active
            .insert(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }

    /// Persist a full overwrite of an existing provider row.
    pub async fn update(&self, provider: Provider) -> DatabaseResult<Provider> {
        let active = provider.into_active_model().reset_all();
        active
            .update(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }

    /// Resolve provider display names for a batch of ids.
    pub async fn names_by_ids(
        &self,
        ids: &[String],
    ) -> DatabaseResult<std::collections::HashMap<String, String>> {
        if ids.is_empty() {
            return Ok(std::collections::HashMap::new());
        }

        let providers = mcp_providers::Entity::find()
            .filter(mcp_providers::Column::Id.is_in(ids.iter().cloned()))
            .all(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        Ok(providers.into_iter().map(|p| (p.id, p.name)).collect())
    }
}
