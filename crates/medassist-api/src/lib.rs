//! medassist-api
//!
//! HTTP surface of the medical assistant: the chatbot endpoint, the
//! conversation history views, and medication tracking.

pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware as axum_mw;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};

use state::AppState;

/// Body limit for `/chatbot/query`, which carries image and audio uploads.
/// Lambda caps synchronous request payloads at 6 MB.
pub const MAX_UPLOAD_BYTES: usize = 6 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route(
            "/chatbot/query",
            post(routes::chatbot::query).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/conversations",
            get(routes::conversations::list_conversations),
        )
        .route(
            "/conversations/{id}",
            get(routes::conversations::get_conversation)
                .delete(routes::conversations::delete_conversation),
        )
        .route(
            "/conversations/{id}/messages",
            get(routes::conversations::get_messages),
        )
        .route(
            "/medications",
            get(routes::medications::list_medications).post(routes::medications::create_medication),
        )
        .route("/medications/today", get(routes::medications::today))
        .route("/medications/stats", get(routes::medications::stats))
        .route(
            "/medications/{id}",
            get(routes::medications::get_medication)
                .put(routes::medications::update_medication)
                .delete(routes::medications::delete_medication),
        )
        .route(
            "/medications/{id}/taken",
            post(routes::medications::mark_taken),
        )
        .route("/medication-logs", get(routes::medications::list_logs))
        .layer(axum_mw::from_fn(middleware::audit::audit_log))
        .layer(cors)
        .with_state(state)
}
