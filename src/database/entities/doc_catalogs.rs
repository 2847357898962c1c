use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Catalog entry of a generated documentation page; read-only here.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "doc_catalogs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub branch_language_id: String,
    pub doc_file_id: Option<String>,
    pub title: String,
    pub path: String,
    pub is_deleted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
