//! Usage accounting for the MCP endpoints.
//!
//! The middleware captures one record per HTTP request and hands it to
//! a bounded queue; a dedicated writer task resolves attribution and
//! persists it. Recording never blocks or fails a request: a full
//! queue drops the record with a warning.

use crate::auth::bearer_identity;
use crate::database::dao::UsageLogDraft;
use crate::database::entities::UsageLog;
use crate::database::DatabaseManager;
use crate::server::Server;
use axum::body::{Body, HttpBody};
use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::http::StatusCode;
use chrono::Utc;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

const MAX_USER_AGENT_LEN: usize = 500;

/// Largest request body buffered to read the tool name out of the
/// JSON-RPC envelope. Bigger bodies stream through untouched.
const TOOL_NAME_SNIFF_LIMIT: u64 = 64 * 1024;

/// Handle used by the middleware to enqueue usage records.
#[derive(Clone)]
pub struct UsageRecorder {
    tx: mpsc::Sender<UsageLogDraft>,
}

impl UsageRecorder {
    pub fn channel(queue_size: usize) -> (Self, mpsc::Receiver<UsageLogDraft>) {
        let (tx, rx) = mpsc::channel(queue_size);
        (Self { tx }, rx)
    }

    /// Enqueue a record. Drops it when the writer is behind.
    pub fn record(&self, draft: UsageLogDraft) {
        if let Err(e) = self.tx.try_send(draft) {
            warn!("Usage log queue full, dropping record: {}", e);
        }
    }
}

/// Writer task: resolves attribution defaults and persists each record.
/// On shutdown the queue is drained before the task exits.
pub fn spawn_usage_writer(
    database: Arc<dyn DatabaseManager>,
    mut rx: mpsc::Receiver<UsageLogDraft>,
    mut shutdown_rx: tokio::sync::watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                maybe = rx.recv() => match maybe {
                    Some(draft) => {
                        if let Err(e) = write_log(&*database, draft).await {
                            error!("Failed to write usage log: {}", e);
                        }
                    }
                    None => break,
                },
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        while let Ok(draft) = rx.try_recv() {
                            if let Err(e) = write_log(&*database, draft).await {
                                error!("Failed to write usage log: {}", e);
                            }
                        }
                        break;
                    }
                }
            }
        }
        debug!("Usage log writer stopped");
    })
}

async fn write_log(
    database: &dyn DatabaseManager,
    draft: UsageLogDraft,
) -> crate::database::DatabaseResult<()> {
    let user_id = match draft.user_id {
        Some(id) if !id.trim().is_empty() => id,
        _ => "anonymous".to_string(),
    };

    let provider_id = match draft.provider_id {
        Some(id) if !id.trim().is_empty() => id,
        _ => database
            .providers()
            .first_active_id()
            .await?
            .unwrap_or_else(|| "unknown".to_string()),
    };

    let log = UsageLog {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: Some(user_id),
        mcp_provider_id: Some(provider_id),
        tool_name: draft.tool_name,
        request_summary: draft.request_summary,
        response_status: draft.response_status,
        duration_ms: draft.duration_ms,
        input_tokens: 0,
        output_tokens: 0,
        ip_address: draft.ip_address,
        user_agent: draft.user_agent,
        error_message: draft.error_message,
        is_deleted: false,
        created_at: Utc::now(),
    };

    database.usage_logs().insert(log).await?;
    Ok(())
}

/// Axum middleware layered on the MCP routes. Buffers the request body
/// to pick the tool name out of the JSON-RPC envelope, times the
/// request, and enqueues one usage record.
pub async fn mcp_usage_middleware(
    State(server): State<Server>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let user_id = bearer_identity(request.headers(), &*server.jwt_service);
    let connect_info = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    let ip_address = client_ip(&request, connect_info);
    let user_agent = request
        .headers()
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(truncate_user_agent);

    // The body is consumed to sniff the tool name, then restored. Only
    // bodies small enough to hold a tools/call envelope are buffered;
    // larger ones stream through under the method/path fallback.
    let (parts, body) = request.into_parts();
    let sniffable = HttpBody::size_hint(&body)
        .upper()
        .is_some_and(|n| n <= TOOL_NAME_SNIFF_LIMIT);
    let (tool_name, request) = if sniffable {
        let bytes = match axum::body::to_bytes(body, TOOL_NAME_SNIFF_LIMIT as usize).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Failed to buffer MCP request body: {}", e);
                return StatusCode::BAD_REQUEST.into_response();
            }
        };
        let tool_name = extract_tool_name(&bytes, method.as_str(), &path);
        (tool_name, Request::from_parts(parts, Body::from(bytes)))
    } else {
        (
            format!("{} {}", method, path),
            Request::from_parts(parts, body),
        )
    };

    let started = Instant::now();
    let response = next.run(request).await;
    let duration_ms = started.elapsed().as_millis() as i64;
    let status = response.status().as_u16() as i32;

    server.usage_recorder.record(UsageLogDraft {
        user_id,
        provider_id: None,
        tool_name,
        request_summary: None,
        response_status: status,
        duration_ms,
        ip_address,
        user_agent,
        error_message: None,
    });

    response
}

fn client_ip(request: &Request, connect_info: Option<SocketAddr>) -> Option<String> {
    if let Some(forwarded) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return Some(first.to_string());
            }
        }
    }
    connect_info.map(|addr| addr.ip().to_string())
}

fn truncate_user_agent(ua: &str) -> String {
    if ua.chars().count() > MAX_USER_AGENT_LEN {
        ua.chars().take(MAX_USER_AGENT_LEN).collect()
    } else {
        ua.to_string()
    }
}

/// Tool name for a JSON-RPC `tools/call` request, otherwise
/// `"{METHOD} {path}"`.
fn extract_tool_name(body: &[u8], method: &str, path: &str) -> String {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) {
        if value.get("method").and_then(|m| m.as_str()) == Some("tools/call") {
            if let Some(name) = value
                .get("params")
                .and_then(|p| p.get("name"))
                .and_then(|n| n.as_str())
            {
                return name.to_string();
            }
        }
    }
    format!("{} {}", method, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_tool_name_from_tools_call() {
        let body = br#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"search_doc","arguments":{"query":"x"}}}"#;
        assert_eq!(
            extract_tool_name(body, "POST", "/api/mcp/acme/widgets"),
            "search_doc"
        );
    }

    #[test]
    fn falls_back_to_method_and_path() {
        let body = br#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#;
        assert_eq!(
            extract_tool_name(body, "POST", "/api/mcp/acme/widgets"),
            "POST /api/mcp/acme/widgets"
        );

        assert_eq!(
            extract_tool_name(b"not json", "GET", "/api/mcp"),
            "GET /api/mcp"
        );
    }

    #[test]
    fn truncates_long_user_agents() {
        let ua = "a".repeat(600);
        assert_eq!(truncate_user_agent(&ua).len(), MAX_USER_AGENT_LEN);
        assert_eq!(truncate_user_agent("curl/8.0"), "curl/8.0");
    }

    #[tokio::test]
    async fn recorder_drops_when_queue_is_full() {
        let (recorder, mut rx) = UsageRecorder::channel(1);
        let draft = UsageLogDraft {
            user_id: None,
            provider_id: None,
            tool_name: "search_doc".to_string(),
            request_summary: None,
            response_status: 200,
            duration_ms: 5,
            ip_address: None,
            user_agent: None,
            error_message: None,
        };
        recorder.record(draft.clone());
        recorder.record(draft.clone());
        assert!(rx.recv().await.is_some());
        assert!(rx.try_recv().is_err());
    }
}
