// rest/routes/agent.rs — Opaque task-executor passthrough.

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::agent::AgentPayload;
use crate::AppContext;

/// POST /api/v1/agent/run — execute one agent task and return its result.
///
/// Recording the run is the caller's job (CLI posts the outcome to
/// POST /api/v1/runs afterwards); this route only brokers the execution.
pub async fn run_task(
    State(ctx): State<Arc<AppContext>>,
    Json(payload): Json<AgentPayload>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if payload.target.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "target must be non-empty" })),
        ));
    }

    match ctx.executor.execute(&payload).await {
        Ok(result) => Ok(Json(serde_json::to_value(result).unwrap_or_default())),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("agent task failed: {e:#}") })),
        )),
    }
}
