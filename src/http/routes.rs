use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Session control
        .route("/api/session/start", post(handlers::start_session))
        .route("/api/session/stop", post(handlers::stop_session))
        .route("/api/session/clear", post(handlers::clear_transcript))
        .route("/api/session/status", get(handlers::get_session_status))
        // Transcript
        .route("/api/transcript", get(handlers::get_transcript))
        .route("/api/transcript/export", get(handlers::export_transcript))
        .route("/api/transcript/copy", post(handlers::copy_transcript))
        .route("/api/transcript/save", post(handlers::save_transcript))
        // Auth
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/logout", post(handlers::logout))
        // Library
        .route("/api/library", get(handlers::list_library))
        .route("/api/library/:id", get(handlers::get_library_record))
        // Request logging, plus CORS for browser clients
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
