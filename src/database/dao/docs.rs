use crate::database::entities::{
    BranchLanguage, Repository, RepositoryBranch, branch_languages, doc_catalogs, doc_files,
    repositories, repository_branches,
};
use crate::database::{DatabaseError, DatabaseResult};
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use std::collections::{HashMap, HashSet};

/// A documentation page matching a search query.
#[derive(Debug, Clone)]
pub struct DocHit {
    pub title: String,
    pub path: String,
    pub content: String,
}

/// Documentation DAO for database operations
pub struct DocsDao {
    db: DatabaseConnection,
}

impl DocsDao {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_repository(
        &self,
        org_name: &str,
        repo_name: &str,
    ) -> DatabaseResult<Option<Repository>> {
        repositories::Entity::find()
            .filter(repositories::Column::OrgName.eq(org_name))
            .filter(repositories::Column::RepoName.eq(repo_name))
            .filter(repositories::Column::IsDeleted.eq(false))
            .one(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }

    /// First branch recorded for a repository.
    pub async fn find_branch(
        &self,
        repository_id: &str,
    ) -> DatabaseResult<Option<RepositoryBranch>> {
        repository_branches::Entity::find()
            .filter(repository_branches::Column::RepositoryId.eq(repository_id))
            .filter(repository_branches::Column::IsDeleted.eq(false))
            .order_by_asc(repository_branches::Column::Id)
            .one(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }

    pub async fn find_branch_language(
        &self,
        branch_id: &str,
        language_code: &str,
    ) -> DatabaseResult<Option<BranchLanguage>> {
        branch_languages::Entity::find()
            .filter(branch_languages::Column::RepositoryBranchId.eq(branch_id))
            .filter(branch_languages::Column::LanguageCode.eq(language_code))
            .filter(branch_languages::Column::IsDeleted.eq(false))
            .one(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }

    /// Case-insensitive substring search over catalog titles and page
    /// contents for one branch language, capped at `max_results`.
    pub async fn search_docs(
        &self,
        branch_language_id: &str,
        query: &str,
        max_results: usize,
    ) -> DatabaseResult<Vec<DocHit>> {
        let lowered = query.to_lowercase();

        let catalogs = doc_catalogs::Entity::find()
            .filter(doc_catalogs::Column::BranchLanguageId.eq(branch_language_id))
            .filter(doc_catalogs::Column::IsDeleted.eq(false))
            .filter(doc_catalogs::Column::DocFileId.is_not_null())
            .order_by_asc(doc_catalogs::Column::Path)
            .all(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        if catalogs.is_empty() {
            return Ok(Vec::new());
        }

        let file_ids: Vec<String> = catalogs
            .iter()
            .filter_map(|c| c.doc_file_id.clone())
            .collect();

        // Content matching happens in the database so page bodies only
        // cross the wire when they match.
        let content_matches = doc_files::Entity::find()
            .filter(doc_files::Column::Id.is_in(file_ids))
            .filter(doc_files::Column::IsDeleted.eq(false))
            .filter(
                Condition::all().add(
                    Expr::expr(Func::lower(Expr::col(doc_files::Column::Content)))
                        .like(LikeExpr::new(like_pattern(&lowered)).escape('\\')),
                ),
            )
            .all(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        let mut contents: HashMap<String, String> = content_matches
            .into_iter()
            .map(|f| (f.id, f.content))
            .collect();
        let content_matched: HashSet<String> = contents.keys().cloned().collect();

        let mut selected = Vec::new();
        for catalog in &catalogs {
            let Some(file_id) = &catalog.doc_file_id else {
                continue;
            };
            let title_matched = catalog.title.to_lowercase().contains(&lowered);
            if title_matched || content_matched.contains(file_id) {
                selected.push(catalog.clone());
                if selected.len() >= max_results {
                    break;
                }
            }
        }

        // Title-only matches still need their page bodies loaded.
        let missing: Vec<String> = selected
            .iter()
            .filter_map(|c| c.doc_file_id.clone())
            .filter(|id| !contents.contains_key(id))
            .collect();
        if !missing.is_empty() {
            let extra = doc_files::Entity::find()
                .filter(doc_files::Column::Id.is_in(missing))
                .filter(doc_files::Column::IsDeleted.eq(false))
                .all(&self.db)
                .await
                .map_err(|e| DatabaseError::Database(e.to_string()))?;
            for file in extra {
                contents.insert(file.id, file.content);
            }
        }

        let hits = selected
            .into_iter()
            .filter_map(|catalog| {
                let file_id = catalog.doc_file_id?;
                let content = contents.get(&file_id)?.clone();
                Some(DocHit {
                    title: catalog.title,
                    path: catalog.path,
                    content,
                })
            })
            .collect();

        Ok(hits)
    }
}

/// LIKE pattern matching `needle` as a literal substring. Backslash is
/// the escape character, so wildcard characters in the needle match
/// only themselves.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
