// HTTP request handlers
use crate::presentation::app_state::AppState;
use crate::presentation::snapshot::DashboardSnapshot;
use axum::{extract::State, routing::get, Json, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/snapshot", get(snapshot))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Latest committed dashboard state
pub async fn snapshot(State(state): State<Arc<AppState>>) -> Json<DashboardSnapshot> {
    let current = state.snapshots.borrow().clone();
    Json(current)
}
