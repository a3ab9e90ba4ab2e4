// rest/routes/runs.rs — Run record routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::enrich::record_and_enrich;
use crate::runs::{RunRecord, SummaryEntry};
use crate::store::StoreError;
use crate::AppContext;

/// GET /api/v1/runs — the whole collection, most-recent-first.
pub async fn list_runs(State(ctx): State<Arc<AppContext>>) -> Json<Value> {
    let runs = ctx.store.load_all().await;
    Json(json!({ "runs": runs }))
}

/// POST /api/v1/runs — record a finished task execution and enrich it.
///
/// Malformed payloads are rejected by deserialization before we get here.
/// Enrichment failure is non-fatal by design, so success of the insert alone
/// is enough for `ok`.
pub async fn create_run(
    State(ctx): State<Arc<AppContext>>,
    Json(record): Json<RunRecord>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if record.id.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "id must be non-empty" })),
        ));
    }
    record_and_enrich(&ctx.store, &ctx.chain, record).await;
    Ok(Json(json!({ "ok": true })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendSummaryRequest {
    pub status: String,
    pub summary: String,
    pub decision: Option<String>,
    pub created_at: Option<String>,
}

/// POST /api/v1/runs/{id}/summaries — attach an externally generated summary
/// (workflow-engine webhook). 404 when the run does not exist.
pub async fn append_summary(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
    Json(body): Json<AppendSummaryRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if body.status.is_empty() || body.summary.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "status and summary are required" })),
        ));
    }

    let entry = SummaryEntry {
        status: body.status,
        summary: body.summary,
        decision: body.decision,
        created_at: body.created_at.unwrap_or_else(|| Utc::now().to_rfc3339()),
    };

    match ctx.store.append_summary(&id, entry).await {
        Ok(()) => Ok(Json(json!({ "ok": true }))),
        Err(e @ StoreError::RunNotFound { .. }) => Err((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": e.to_string() })),
        )),
    }
}
