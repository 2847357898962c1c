use crate::database::entities::{UserRecord, users};
use crate::database::{DatabaseError, DatabaseResult};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use std::collections::HashMap;

/// User DAO for database operations
pub struct UsersDao {
    db: DatabaseConnection,
}

impl UsersDao {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: &str) -> DatabaseResult<Option<UserRecord>> {
        users::Entity::find()
            .filter(users::Column::Id.eq(id))
            .filter(users::Column::IsDeleted.eq(false))
            .one(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }

    /// Resolve display names for a batch of user ids.
    pub async fn names_by_ids(
        &self,
        ids: &[String],
    ) -> DatabaseResult<HashMap<String, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let records = users::Entity::find()
            .filter(users::Column::Id.is_in(ids.iter().cloned()))
            .all(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        Ok(records.into_iter().map(|u| (u.id, u.name)).collect())
    }
}
