use deepwiki_mcp::mcp::scope::RepositoryScope;
use deepwiki_mcp::mcp::tools::{
    ReadFileRequest, RepoStructureRequest, RepositoryTools, SearchDocRequest,
};
use deepwiki_mcp::test_utils::{TestServerBuilder, seed_documented_repository};
use std::fs;

const SCOPE_MESSAGE: &str =
    "Repository scope is required. Call MCP via /api/mcp/{owner}/{repo}.";

fn search_request(query: &str) -> SearchDocRequest {
    SearchDocRequest {
        query: query.to_string(),
        max_results: None,
        language: None,
    }
}

#[tokio::test]
async fn all_tools_require_repository_scope() {
    let server = TestServerBuilder::new().build().await;
    let tools = RepositoryTools::new(server, RepositoryScope::unbound());

    let value = tools.search_doc_value(search_request("anything")).await;
    assert_eq!(value["error"], true);
    assert_eq!(value["message"], SCOPE_MESSAGE);

    let value = tools
        .get_repo_structure_value(RepoStructureRequest {
            path: None,
            max_depth: None,
            max_entries: None,
        })
        .await;
    assert_eq!(value["error"], true);
    assert_eq!(value["message"], SCOPE_MESSAGE);

    let value = tools
        .read_file_value(ReadFileRequest {
            path: "README.md".to_string(),
            offset: None,
            limit: None,
        })
        .await;
    assert_eq!(value["error"], true);
    assert_eq!(value["message"], SCOPE_MESSAGE);
}

#[tokio::test]
async fn search_doc_validates_query_and_repository() {
    let server = TestServerBuilder::new().build().await;
    let tools = RepositoryTools::new(
        server.clone(),
        RepositoryScope::bound("acme", "widgets"),
    );

    let value = tools.search_doc_value(search_request("   ")).await;
    assert_eq!(value["message"], "Search query is required");

    let value = tools.search_doc_value(search_request("install")).await;
    assert_eq!(value["message"], "Repository acme/widgets not found");
}

#[tokio::test]
async fn search_doc_reports_missing_branch_and_language() {
    let server = TestServerBuilder::new().build().await;
    seed_documented_repository(
        &server.database,
        "acme",
        "widgets",
        "en",
        "Install Guide",
        "Run cargo install to get started.\nSecond line.",
    )
    .await;

    let tools = RepositoryTools::new(
        server.clone(),
        RepositoryScope::bound("acme", "widgets"),
    );

    let value = tools
        .search_doc_value(SearchDocRequest {
            query: "install".to_string(),
            max_results: None,
            language: Some("fr".to_string()),
        })
        .await;
    assert_eq!(value["message"], "No documentation in language 'fr'");
}

#[tokio::test]
async fn search_doc_returns_matches_with_snippets() {
    let server = TestServerBuilder::new().build().await;
    let content = "Intro line\nMore context\nRun cargo install to get started.\nAfter line\nLast line";
    seed_documented_repository(
        &server.database,
        "acme",
        "widgets",
        "en",
        "Install Guide",
        content,
    )
    .await;

    let tools = RepositoryTools::new(
        server.clone(),
        RepositoryScope::bound("acme", "widgets"),
    );

    let value = tools.search_doc_value(search_request("CARGO INSTALL")).await;
    assert!(value.get("error").is_none(), "unexpected error: {}", value);
    assert_eq!(value["repository"], "acme/widgets");
    assert_eq!(value["branch"], "main");
    assert_eq!(value["language"], "en");
    assert_eq!(value["matchCount"], 1);

    let result = &value["results"][0];
    assert_eq!(result["title"], "Install Guide");
    assert_eq!(result["matchLine"], 3);
    let snippet = result["snippet"].as_str().unwrap();
    assert!(snippet.contains("Run cargo install"));
    assert!(snippet.starts_with("Intro line"));

    // No model config seeded, but matches exist so there is no
    // "no content" placeholder either.
    assert!(value["summary"].is_null());
}

#[tokio::test]
async fn search_doc_treats_wildcard_characters_literally() {
    let server = TestServerBuilder::new().build().await;
    seed_documented_repository(
        &server.database,
        "acme",
        "widgets",
        "en",
        "Scaling Guide",
        "Load tests cover 100_users at a 95% cache hit rate.",
    )
    .await;

    let tools = RepositoryTools::new(
        server.clone(),
        RepositoryScope::bound("acme", "widgets"),
    );

    let value = tools.search_doc_value(search_request("100_users")).await;
    assert_eq!(value["matchCount"], 1);
    assert_eq!(value["results"][0]["title"], "Scaling Guide");

    let value = tools.search_doc_value(search_request("95%")).await;
    assert_eq!(value["matchCount"], 1);

    // An underscore in the query is not a single-character wildcard.
    seed_documented_repository(
        &server.database,
        "acme",
        "gadgets",
        "en",
        "Other Guide",
        "Load tests cover 100-users here.",
    )
    .await;
    let tools = RepositoryTools::new(
        server.clone(),
        RepositoryScope::bound("acme", "gadgets"),
    );
    let value = tools.search_doc_value(search_request("100_users")).await;
    assert_eq!(value["matchCount"], 0);
}

#[tokio::test]
async fn search_doc_reports_no_matches() {
    let server = TestServerBuilder::new().build().await;
    seed_documented_repository(
        &server.database,
        "acme",
        "widgets",
        "en",
        "Install Guide",
        "Nothing relevant here.",
    )
    .await;

    let tools = RepositoryTools::new(
        server.clone(),
        RepositoryScope::bound("acme", "widgets"),
    );

    let value = tools.search_doc_value(search_request("kubernetes")).await;
    assert_eq!(value["matchCount"], 0);
    assert_eq!(value["summary"], "No matching documentation content found.");
}

#[tokio::test]
async fn repo_structure_walks_the_workspace() {
    let workspace = tempfile::tempdir().unwrap();
    let tree = workspace.path().join("acme").join("widgets").join("tree");
    fs::create_dir_all(tree.join("src")).unwrap();
    fs::write(tree.join("src").join("main.rs"), "fn main() {}\n").unwrap();
    fs::write(tree.join("README.md"), "# Widgets\n").unwrap();

    let server = TestServerBuilder::new()
        .with_repositories_dir(workspace.path().to_str().unwrap())
        .build()
        .await;
    seed_documented_repository(&server.database, "acme", "widgets", "en", "Doc", "text").await;

    let tools = RepositoryTools::new(
        server.clone(),
        RepositoryScope::bound("acme", "widgets"),
    );

    let value = tools
        .get_repo_structure_value(RepoStructureRequest {
            path: None,
            max_depth: None,
            max_entries: None,
        })
        .await;
    assert!(value.get("error").is_none(), "unexpected error: {}", value);
    assert_eq!(value["root"], "/");
    assert_eq!(value["truncated"], false);
    let entries: Vec<String> = value["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    assert_eq!(entries, vec!["src/", "  main.rs", "README.md"]);

    // Subdirectory listing
    let value = tools
        .get_repo_structure_value(RepoStructureRequest {
            path: Some("src".to_string()),
            max_depth: Some(1),
            max_entries: None,
        })
        .await;
    assert_eq!(value["root"], "src");
    assert_eq!(value["entries"][0], "main.rs");

    // Missing directory
    let value = tools
        .get_repo_structure_value(RepoStructureRequest {
            path: Some("nope".to_string()),
            max_depth: None,
            max_entries: None,
        })
        .await;
    assert_eq!(value["message"], "Path 'nope' does not exist");
}

#[tokio::test]
async fn repo_structure_requires_workspace_on_disk() {
    let workspace = tempfile::tempdir().unwrap();
    let server = TestServerBuilder::new()
        .with_repositories_dir(workspace.path().to_str().unwrap())
        .build()
        .await;
    seed_documented_repository(&server.database, "acme", "widgets", "en", "Doc", "text").await;

    let tools = RepositoryTools::new(
        server.clone(),
        RepositoryScope::bound("acme", "widgets"),
    );

    let value = tools
        .get_repo_structure_value(RepoStructureRequest {
            path: None,
            max_depth: None,
            max_entries: None,
        })
        .await;
    assert_eq!(value["message"], "Repository workspace not found on server");
}

#[tokio::test]
async fn read_file_returns_numbered_window() {
    let workspace = tempfile::tempdir().unwrap();
    let tree = workspace.path().join("acme").join("widgets").join("tree");
    fs::create_dir_all(&tree).unwrap();
    fs::write(tree.join("notes.txt"), "alpha\nbeta\ngamma\ndelta\n").unwrap();

    let server = TestServerBuilder::new()
        .with_repositories_dir(workspace.path().to_str().unwrap())
        .build()
        .await;
    seed_documented_repository(&server.database, "acme", "widgets", "en", "Doc", "text").await;

    let tools = RepositoryTools::new(
        server.clone(),
        RepositoryScope::bound("acme", "widgets"),
    );

    let value = tools
        .read_file_value(ReadFileRequest {
            path: "notes.txt".to_string(),
            offset: Some(2),
            limit: Some(2),
        })
        .await;
    assert!(value.get("error").is_none(), "unexpected error: {}", value);
    assert_eq!(value["path"], "notes.txt");
    let content = value["content"].as_str().unwrap();
    assert!(content.contains("beta"));
    assert!(content.contains("gamma"));
    assert!(!content.contains("alpha"));
    assert!(!content.contains("delta"));

    let value = tools
        .read_file_value(ReadFileRequest {
            path: "  ".to_string(),
            offset: None,
            limit: None,
        })
        .await;
    assert_eq!(value["message"], "File path is required");
}

#[tokio::test]
async fn read_file_rejects_traversal_outside_workspace() {
    let workspace = tempfile::tempdir().unwrap();
    let tree = workspace.path().join("acme").join("widgets").join("tree");
    fs::create_dir_all(&tree).unwrap();
    // A file outside the tree that traversal must not reach.
    fs::write(workspace.path().join("secret.txt"), "secret\n").unwrap();

    let server = TestServerBuilder::new()
        .with_repositories_dir(workspace.path().to_str().unwrap())
        .build()
        .await;
    seed_documented_repository(&server.database, "acme", "widgets", "en", "Doc", "text").await;

    let tools = RepositoryTools::new(
        server.clone(),
        RepositoryScope::bound("acme", "widgets"),
    );

    // Traversal segments are stripped, so the path resolves inside the
    // tree where no such file exists.
    let value = tools
        .read_file_value(ReadFileRequest {
            path: "../../secret.txt".to_string(),
            offset: None,
            limit: None,
        })
        .await;
    assert_eq!(value["error"], true);
    assert_eq!(value["message"], "Path 'secret.txt' does not exist");
}
