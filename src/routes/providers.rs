//! Public MCP provider listing. No authentication; system API keys are
//! never exposed here.

use crate::error::AppError;
use crate::routes::{REPOSITORY_SCOPED_MCP_PATH_TEMPLATE, ok_with};
use crate::server::Server;
use axum::Json;
use axum::extract::State;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PublicProvider {
    id: String,
    name: String,
    description: Option<String>,
    server_url: &'static str,
    transport_type: String,
    requires_api_key: bool,
    api_key_obtain_url: Option<String>,
    icon_url: Option<String>,
    max_requests_per_day: i32,
}

/// `GET /api/mcp-providers`. Active providers for client configuration.
pub async fn list_public_providers(
    State(server): State<Server>,
) -> Result<Json<Value>, AppError> {
    let providers = server
        .database
        .providers()
        .list_active()
        .await
        .map_err(|e| AppError::Internal(format!("Database error: {}", e)))?;

    let data: Vec<PublicProvider> = providers
        .into_iter()
        .map(|p| PublicProvider {
            id: p.id,
            name: p.name,
            description: p.description,
            server_url: REPOSITORY_SCOPED_MCP_PATH_TEMPLATE,
            transport_type: p.transport_type,
            requires_api_key: p.requires_api_key,
            api_key_obtain_url: p.api_key_obtain_url,
            icon_url: p.icon_url,
            max_requests_per_day: p.max_requests_per_day,
        })
        .collect();

    Ok(ok_with(data))
}
