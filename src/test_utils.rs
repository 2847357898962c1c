//! Shared helpers for integration tests: in-memory server construction
//! and database seeding.

use crate::{
    auth::{AccessClaims, JwtService},
    config::Config,
    database::DatabaseManager,
    database::entities::{
        BranchLanguage, DocCatalog, DocFile, Provider, Repository, RepositoryBranch, UserRecord,
    },
    server::Server,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, IntoActiveModel};
use std::sync::Arc;

/// Test server builder backed by in-memory SQLite
pub struct TestServerBuilder {
    config: Config,
}

impl TestServerBuilder {
    pub fn new() -> Self {
        let mut config = Config::default();
        config.database.url = "sqlite::memory:".to_string();
        config.jwt.secret = "test-secret".to_string();
        config.jobs.enabled = false;
        Self { config }
    }

    /// Set a custom configuration (database URL and JWT secret are
    /// still forced to test values)
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self.config.database.url = "sqlite::memory:".to_string();
        self.config.jwt.secret = "test-secret".to_string();
        self
    }

    /// Point the repositories directory at a temp workspace
    pub fn with_repositories_dir(mut self, dir: &str) -> Self {
        self.config.mcp.repositories_dir = dir.to_string();
        self
    }

    pub async fn build(self) -> Server {
        let server = Server::new(self.config).await.unwrap();
        server.database.migrate().await.unwrap();
        server
    }
}

impl Default for TestServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn create_test_jwt(jwt_service: &Arc<dyn JwtService>, user_id: &str, role: &str) -> String {
    jwt_service
        .create_token(&AccessClaims::new(user_id, role, 3600))
        .unwrap()
}

pub async fn create_test_user(
    database: &Arc<dyn DatabaseManager>,
    id: &str,
    name: &str,
    role: &str,
) {
    let user = UserRecord {
        id: id.to_string(),
        name: name.to_string(),
        email: Some(format!("{}@example.com", id)),
        role: role.to_string(),
        is_deleted: false,
        created_at: Utc::now(),
    };
    user.into_active_model()
        .reset_all()
        .insert(database.connection())
        .await
        .unwrap();
}

pub async fn create_test_provider(database: &Arc<dyn DatabaseManager>, id: &str, name: &str) {
    let provider = Provider {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        server_url: "/api/mcp/{owner}/{repo}".to_string(),
        transport_type: "streamable_http".to_string(),
        requires_api_key: false,
        api_key_obtain_url: None,
        system_api_key: None,
        model_config_id: None,
        is_active: true,
        sort_order: 0,
        icon_url: None,
        max_requests_per_day: 0,
        is_deleted: false,
        created_at: Utc::now(),
        updated_at: None,
    };
    provider
        .into_active_model()
        .reset_all()
        .insert(database.connection())
        .await
        .unwrap();
}

/// Seed a repository with one branch, one language, and one doc page.
/// Returns the branch language id.
pub async fn seed_documented_repository(
    database: &Arc<dyn DatabaseManager>,
    owner: &str,
    repo: &str,
    language: &str,
    doc_title: &str,
    doc_content: &str,
) -> String {
    let now = Utc::now();
    let repo_id = format!("repo-{}-{}", owner, repo);
    let branch_id = format!("branch-{}", repo_id);
    let lang_id = format!("lang-{}-{}", branch_id, language);
    let file_id = format!("file-{}", lang_id);
    let catalog_id = format!("catalog-{}", lang_id);

    Repository {
        id: repo_id.clone(),
        org_name: owner.to_string(),
        repo_name: repo.to_string(),
        is_deleted: false,
        created_at: now,
    }
    .into_active_model()
    .reset_all()
    .insert(database.connection())
    .await
    .unwrap();

    RepositoryBranch {
        id: branch_id.clone(),
        repository_id: repo_id,
        branch_name: "main".to_string(),
        is_deleted: false,
    }
    .into_active_model()
    .reset_all()
    .insert(database.connection())
    .await
    .unwrap();

    BranchLanguage {
        id: lang_id.clone(),
        repository_branch_id: branch_id,
        language_code: language.to_string(),
        is_deleted: false,
    }
    .into_active_model()
    .reset_all()
    .insert(database.connection())
    .await
    .unwrap();

    DocFile {
        id: file_id.clone(),
        content: doc_content.to_string(),
        is_deleted: false,
    }
    .into_active_model()
    .reset_all()
    .insert(database.connection())
    .await
    .unwrap();

    DocCatalog {
        id: catalog_id,
        branch_language_id: lang_id.clone(),
        doc_file_id: Some(file_id),
        title: doc_title.to_string(),
        path: format!("docs/{}.md", doc_title.to_lowercase().replace(' ', "-")),
        is_deleted: false,
    }
    .into_active_model()
    .reset_all()
    .insert(database.connection())
    .await
    .unwrap();

    lang_id
}
