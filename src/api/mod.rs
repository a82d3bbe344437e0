pub mod handlers;

use std::sync::Arc;

use axum::http::{header::CONTENT_TYPE, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::workflow::Orchestrator;

/// Shared application state passed to handlers.
pub struct AppState {
    pub engine: Orchestrator,
    pub config: Config,
}

/// Dev frontend origins (the Vite dev server).
const ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost",
    "http://localhost:5173",
    "http://127.0.0.1:5173",
];

pub fn router(state: Arc<AppState>) -> Router {
    let origins: Vec<HeaderValue> = ALLOWED_ORIGINS
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/process-approval", post(handlers::process_approval))
        .route(
            "/process-clarification",
            post(handlers::process_clarification),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
