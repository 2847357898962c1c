//! HTTP API routes: public provider listing, health, and the admin
//! management API. All payloads use the `{success, data?, message?}`
//! envelope.

pub mod admin;
pub mod health;
pub mod providers;

use axum::Json;
use serde::Serialize;
use serde_json::{Value, json};

/// Path template clients use to reach the repository-scoped MCP
/// endpoint. Stored and advertised verbatim; the client substitutes
/// the placeholders.
pub const REPOSITORY_SCOPED_MCP_PATH_TEMPLATE: &str = "/api/mcp/{owner}/{repo}";

pub fn ok() -> Json<Value> {
    Json(json!({ "success": true }))
}

pub fn ok_with<T: Serialize>(data: T) -> Json<Value> {
    Json(json!({ "success": true, "data": data }))
}
