use crate::error::AppError;
use crate::server::Server;
use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

/// Liveness plus a database ping.
pub async fn health_check(State(server): State<Server>) -> Result<Json<Value>, AppError> {
    server
        .database
        .health_check()
        .await
        .map_err(|e| AppError::Internal(format!("Database health check failed: {}", e)))?;

    Ok(Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}
