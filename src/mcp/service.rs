//! Streamable HTTP endpoints for the MCP tools.
//!
//! Sessions are shared across both routes through one session manager;
//! the repository scope is rebound from the request path on every call,
//! so the bare endpoint always produces an unbound scope.

use crate::mcp::scope::RepositoryScope;
use crate::mcp::tools::RepositoryTools;
use crate::server::Server;
use axum::body::Body;
use axum::extract::{Path, Request, State};
use axum::response::Response;
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService,
};

/// `/api/mcp/{owner}/{repo}` with tools bound to one repository.
pub async fn scoped_mcp_handler(
    State(server): State<Server>,
    Path((owner, repo)): Path<(String, String)>,
    request: Request,
) -> Response {
    dispatch(server, RepositoryScope::bound(&owner, &repo), request).await
}

/// Bare `/api/mcp` endpoint. The session works, but every tool call
/// reports that a repository scope is required.
pub async fn unscoped_mcp_handler(State(server): State<Server>, request: Request) -> Response {
    dispatch(server, RepositoryScope::unbound(), request).await
}

async fn dispatch(server: Server, scope: RepositoryScope, request: Request) -> Response {
    let session_manager = server.session_manager.clone();
    let factory_server = server.clone();
    let service = StreamableHttpService::new(
        move || Ok(RepositoryTools::new(factory_server.clone(), scope.clone())),
        session_manager,
        StreamableHttpServerConfig::default(),
    );

    match tower::ServiceExt::oneshot(service, request).await {
        Ok(response) => response.map(Body::new),
        Err(never) => match never {},
    }
}
