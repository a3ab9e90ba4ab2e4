// rest/mod.rs — HTTP surface.
//
// Thin wrappers over the store, chain, and executor; no business logic lives
// here.
//
// Endpoints:
//   GET  /api/v1/health
//   GET  /api/v1/runs
//   POST /api/v1/runs
//   POST /api/v1/runs/{id}/summaries   (webhook-style external summary)
//   POST /api/v1/agent/run

pub mod routes;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::AppContext;

pub async fn serve(ctx: Arc<AppContext>) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", ctx.config.bind_address, ctx.config.port).parse()?;
    let router = build_router(ctx);

    info!("REST API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/api/v1/health", get(routes::health::health))
        .route(
            "/api/v1/runs",
            get(routes::runs::list_runs).post(routes::runs::create_run),
        )
        .route(
            "/api/v1/runs/{id}/summaries",
            post(routes::runs::append_summary),
        )
        .route("/api/v1/agent/run", post(routes::agent::run_task))
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}
