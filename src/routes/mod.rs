//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The realtime core exposes exactly two endpoints: the websocket upgrade
//! and a healthcheck. Auth, syllabus, and room CRUD live in a separate
//! request/response service that is out of scope here; the browser client
//! talks to this router only for presence and chat.

pub mod ws;

use axum::Json;
use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/healthcheck", get(healthcheck))
        .route("/api/ws", get(ws::handle_ws))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "message": "Server is running" }))
}
