//! Repository-scoped MCP tools: documentation search, directory
//! structure, and file reads.

use crate::mcp::scope::RepositoryScope;
use crate::mcp::workspace;
use crate::server::Server;
use crate::summarizer::SearchMatch;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::schemars;
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::warn;

const SCOPE_REQUIRED: &str = "Repository scope is required. Call MCP via /api/mcp/{owner}/{repo}.";

#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchDocRequest {
    #[schemars(description = "Search query or question to answer.")]
    pub query: String,
    #[schemars(description = "Maximum number of documents to return (default: 5, max: 20)")]
    pub max_results: Option<i32>,
    #[schemars(description = "Language code (default: en)")]
    pub language: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepoStructureRequest {
    #[schemars(description = "Optional subdirectory relative to repo root, default is repository root.")]
    pub path: Option<String>,
    #[schemars(description = "Maximum depth to traverse (default: 3)")]
    pub max_depth: Option<i32>,
    #[schemars(description = "Maximum entries to return (default: 200)")]
    pub max_entries: Option<i32>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadFileRequest {
    #[schemars(description = "Relative file path from repository root")]
    pub path: String,
    #[schemars(description = "Line number to start reading from (1-based). Default: 1")]
    pub offset: Option<i32>,
    #[schemars(description = "Maximum number of lines to read. Default: 2000")]
    pub limit: Option<i32>,
}

#[derive(Debug, Clone)]
struct DocSearchMatch {
    title: String,
    path: String,
    match_line: i64,
    snippet: String,
}

/// MCP tool handler bound to one repository scope. One instance is
/// created per session from the request path.
#[derive(Clone)]
pub struct RepositoryTools {
    server: Server,
    scope: RepositoryScope,
    tool_router: ToolRouter<Self>,
}

impl RepositoryTools {
    pub fn new(server: Server, scope: RepositoryScope) -> Self {
        Self {
            server,
            scope,
            tool_router: Self::tool_router(),
        }
    }

    fn error_value(message: &str) -> Value {
        json!({ "error": true, "message": message })
    }

    fn db_error(e: impl std::fmt::Display) -> Value {
        warn!("Tool database query failed: {}", e);
        Self::error_value(&format!("Database error: {}", e))
    }

    /// Find-or-error lookup shared by all three tools.
    async fn resolve_repository(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<crate::database::entities::Repository, Value> {
        match self.server.database.docs().find_repository(owner, repo).await {
            Ok(Some(repository)) => Ok(repository),
            Ok(None) => Err(Self::error_value(&format!(
                "Repository {}/{} not found",
                owner, repo
            ))),
            Err(e) => Err(Self::db_error(e)),
        }
    }

    pub async fn search_doc_value(&self, req: SearchDocRequest) -> Value {
        let Some((owner, repo)) = self.scope.get() else {
            return Self::error_value(SCOPE_REQUIRED);
        };

        let query = req.query.trim().to_string();
        if query.is_empty() {
            return Self::error_value("Search query is required");
        }
        let max_results = clamp_max_results(req.max_results);
        let language = req.language.unwrap_or_else(|| "en".to_string());

        let repository = match self.resolve_repository(owner, repo).await {
            Ok(r) => r,
            Err(v) => return v,
        };

        let docs = self.server.database.docs();
        let branch = match docs.find_branch(&repository.id).await {
            Ok(Some(branch)) => branch,
            Ok(None) => return Self::error_value("No branch found for this repository"),
            Err(e) => return Self::db_error(e),
        };

        let branch_language = match docs.find_branch_language(&branch.id, &language).await {
            Ok(Some(bl)) => bl,
            Ok(None) => {
                return Self::error_value(&format!("No documentation in language '{}'", language));
            }
            Err(e) => return Self::db_error(e),
        };

        let hits = match docs.search_docs(&branch_language.id, &query, max_results).await {
            Ok(hits) => hits,
            Err(e) => return Self::db_error(e),
        };

        let matches: Vec<DocSearchMatch> = hits
            .into_iter()
            .map(|hit| {
                let (match_line, snippet) = first_match_snippet(&hit.content, &query);
                DocSearchMatch {
                    title: hit.title,
                    path: hit.path,
                    match_line,
                    snippet,
                }
            })
            .collect();

        let summary = if matches.is_empty() {
            Some("No matching documentation content found.".to_string())
        } else {
            let summarizer_matches: Vec<SearchMatch> = matches
                .iter()
                .map(|m| SearchMatch {
                    title: m.title.clone(),
                    path: m.path.clone(),
                    snippet: m.snippet.clone(),
                })
                .collect();
            self.server
                .summarizer
                .summarize(&*self.server.database, owner, repo, &query, &summarizer_matches)
                .await
        };

        let results: Vec<Value> = matches
            .iter()
            .map(|m| {
                json!({
                    "title": m.title,
                    "path": m.path,
                    "matchLine": m.match_line,
                    "snippet": m.snippet,
                })
            })
            .collect();

        json!({
            "repository": format!("{}/{}", owner, repo),
            "branch": branch.branch_name,
            "language": language,
            "query": query,
            "matchCount": matches.len(),
            "results": results,
            "summary": summary,
        })
    }

    pub async fn get_repo_structure_value(&self, req: RepoStructureRequest) -> Value {
        let Some((owner, repo)) = self.scope.get() else {
            return Self::error_value(SCOPE_REQUIRED);
        };

        let max_depth = clamp_max_depth(req.max_depth);
        let max_entries = clamp_max_entries(req.max_entries);

        if let Err(v) = self.resolve_repository(owner, repo).await {
            return v;
        }

        let repo_path = workspace::repository_path(
            &self.server.config.mcp.repositories_dir,
            owner,
            repo,
        );
        if !repo_path.is_dir() {
            return Self::error_value("Repository workspace not found on server");
        }

        let normalized = workspace::normalize_relative_path(req.path.as_deref());
        let target = if normalized.is_empty() {
            repo_path.clone()
        } else {
            repo_path.join(&normalized)
        };

        if !target.starts_with(&repo_path) {
            return Self::error_value("Invalid path");
        }
        if !target.is_dir() {
            return Self::error_value(&format!("Path '{}' does not exist", normalized));
        }

        let entries = match workspace::build_directory_tree(&target, max_depth, max_entries) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Directory traversal failed: {}", e);
                return Self::error_value("Failed to read repository structure");
            }
        };
        let truncated = entries.len() >= max_entries;

        json!({
            "repository": format!("{}/{}", owner, repo),
            "root": if normalized.is_empty() { "/".to_string() } else { normalized },
            "depth": max_depth,
            "entryCount": entries.len(),
            "truncated": truncated,
            "entries": entries,
        })
    }

    pub async fn read_file_value(&self, req: ReadFileRequest) -> Value {
        let Some((owner, repo)) = self.scope.get() else {
            return Self::error_value(SCOPE_REQUIRED);
        };

        if req.path.trim().is_empty() {
            return Self::error_value("File path is required");
        }

        if let Err(v) = self.resolve_repository(owner, repo).await {
            return v;
        }

        let repo_path = workspace::repository_path(
            &self.server.config.mcp.repositories_dir,
            owner,
            repo,
        );
        if !repo_path.is_dir() {
            return Self::error_value("Repository workspace not found on server");
        }

        let normalized = workspace::normalize_relative_path(Some(&req.path));
        if normalized.is_empty() {
            return Self::error_value("Invalid path");
        }
        let full = repo_path.join(&normalized);
        if !full.is_file() {
            return Self::error_value(&format!("Path '{}' does not exist", normalized));
        }

        let offset = positive_or(req.offset, 1);
        let limit = positive_or(req.limit, 2000);

        let content = match workspace::read_file_lines(&full, offset, limit) {
            Ok(content) => content,
            Err(e) => {
                warn!("File read failed: {}", e);
                return Self::error_value(&format!("Path '{}' does not exist", normalized));
            }
        };

        json!({
            "repository": format!("{}/{}", owner, repo),
            "path": req.path,
            "content": content,
        })
    }
}

#[tool_router]
impl RepositoryTools {
    #[tool(
        description = "Search documentation within the current GitHub repository and return summarized insights."
    )]
    async fn search_doc(
        &self,
        Parameters(req): Parameters<SearchDocRequest>,
    ) -> Result<CallToolResult, McpError> {
        let value = self.search_doc_value(req).await;
        Ok(CallToolResult::success(vec![Content::text(value.to_string())]))
    }

    #[tool(
        description = "Get the repository directory structure. Useful for understanding module layout."
    )]
    async fn get_repo_structure(
        &self,
        Parameters(req): Parameters<RepoStructureRequest>,
    ) -> Result<CallToolResult, McpError> {
        let value = self.get_repo_structure_value(req).await;
        Ok(CallToolResult::success(vec![Content::text(value.to_string())]))
    }

    #[tool(
        description = "Read a file from the current repository. Returns file content with line numbers."
    )]
    async fn read_file(
        &self,
        Parameters(req): Parameters<ReadFileRequest>,
    ) -> Result<CallToolResult, McpError> {
        let value = self.read_file_value(req).await;
        Ok(CallToolResult::success(vec![Content::text(value.to_string())]))
    }
}

#[tool_handler]
impl ServerHandler for RepositoryTools {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "deepwiki-mcp".to_string(),
                title: Some("Repository Documentation Tools".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Repository documentation tools. Connect via /api/mcp/{owner}/{repo} to bind \
                 a repository, then use search_doc for documentation search, get_repo_structure \
                 for the directory layout, and read_file to view source files."
                    .to_string(),
            ),
        }
    }
}

fn clamp_max_results(value: Option<i32>) -> usize {
    match value {
        Some(v) if v > 20 => 20,
        Some(v) if v > 0 => v as usize,
        _ => 5,
    }
}

fn clamp_max_depth(value: Option<i32>) -> usize {
    match value {
        None => 3,
        Some(v) if v > 0 => v as usize,
        Some(_) => 1,
    }
}

fn clamp_max_entries(value: Option<i32>) -> usize {
    match value {
        Some(v) if v > 0 => v as usize,
        _ => 200,
    }
}

fn positive_or(value: Option<i32>, default: usize) -> usize {
    match value {
        Some(v) if v > 0 => v as usize,
        _ => default,
    }
}

/// Locate the first line containing the query (case-insensitive) and
/// cut a five-line snippet starting two lines above it. Snippets are
/// capped at 500 characters.
fn first_match_snippet(content: &str, query: &str) -> (i64, String) {
    let lowered = query.to_lowercase();
    let lines: Vec<&str> = content.split('\n').collect();

    let mut match_line: i64 = -1;
    for (i, line) in lines.iter().enumerate() {
        if line.to_lowercase().contains(&lowered) {
            match_line = (i + 1) as i64;
            break;
        }
    }

    let anchor = if match_line > 0 { match_line - 1 } else { 0 };
    let snippet_start = (anchor - 2).max(0) as usize;
    let snippet = lines
        .iter()
        .skip(snippet_start)
        .take(5)
        .copied()
        .collect::<Vec<_>>()
        .join("\n");

    let snippet = if snippet.chars().count() > 500 {
        let truncated: String = snippet.chars().take(500).collect();
        format!("{}...", truncated)
    } else {
        snippet
    };

    (match_line, snippet)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_search_limits() {
        assert_eq!(clamp_max_results(None), 5);
        assert_eq!(clamp_max_results(Some(0)), 5);
        assert_eq!(clamp_max_results(Some(-3)), 5);
        assert_eq!(clamp_max_results(Some(7)), 7);
        assert_eq!(clamp_max_results(Some(50)), 20);
    }

    #[test]
    fn clamps_structure_limits() {
        assert_eq!(clamp_max_depth(None), 3);
        assert_eq!(clamp_max_depth(Some(0)), 1);
        assert_eq!(clamp_max_depth(Some(-1)), 1);
        assert_eq!(clamp_max_depth(Some(6)), 6);

        assert_eq!(clamp_max_entries(None), 200);
        assert_eq!(clamp_max_entries(Some(0)), 200);
        assert_eq!(clamp_max_entries(Some(50)), 50);
    }

    #[test]
    fn clamps_read_window() {
        assert_eq!(positive_or(None, 1), 1);
        assert_eq!(positive_or(Some(0), 1), 1);
        assert_eq!(positive_or(Some(4), 1), 4);
        assert_eq!(positive_or(None, 2000), 2000);
        assert_eq!(positive_or(Some(-5), 2000), 2000);
    }

    #[test]
    fn snippet_centers_on_first_match() {
        let content = "one\ntwo\nthree\nNEEDLE here\nfive\nsix\nseven";
        let (line, snippet) = first_match_snippet(content, "needle");
        assert_eq!(line, 4);
        assert_eq!(snippet, "two\nthree\nNEEDLE here\nfive\nsix");
    }

    #[test]
    fn snippet_defaults_to_file_head_without_match() {
        let content = "one\ntwo\nthree\nfour\nfive\nsix";
        let (line, snippet) = first_match_snippet(content, "absent");
        assert_eq!(line, -1);
        assert_eq!(snippet, "one\ntwo\nthree\nfour\nfive");
    }

    #[test]
    fn snippet_is_capped_at_500_chars() {
        let long_line = "x".repeat(600);
        let (line, snippet) = first_match_snippet(&long_line, "x");
        assert_eq!(line, 1);
        assert!(snippet.ends_with("..."));
        assert_eq!(snippet.chars().count(), 503);
    }
}
