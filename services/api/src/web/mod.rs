pub mod attachments;
pub mod auth;
pub mod chat_task;
pub mod protocol;
pub mod rest;
pub mod state;
pub mod ws_handler;

// Re-export the main WebSocket handler to make it easily accessible
// to the binary that will build the web server router.
pub use ws_handler::ws_handler;

use crate::error::ApiError;
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{delete, get, patch, post, put},
    Router,
};
use fact_tutor_core::attachments::MAX_PDF_BYTES;
use state::AppState;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Room for multipart framing around the largest accepted PDF.
const BODY_LIMIT: usize = MAX_PDF_BYTES + 1024 * 1024;

/// Builds the API router: every REST endpoint plus the event socket.
pub fn build_router(app_state: Arc<AppState>) -> Result<Router, ApiError> {
    let origin = app_state
        .config
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|e| ApiError::Internal(format!("Invalid CORS origin: {}", e)))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    let chat_routes = Router::new()
        .route("/chats", post(rest::create_chat_handler).get(rest::list_chats_handler))
        .route("/chats/active", put(rest::set_active_chat_handler))
        .route("/chats/{chat_id}", delete(rest::delete_chat_handler))
        .route("/chats/{chat_id}/messages", post(rest::submit_message_handler))
        .route("/chats/{chat_id}/analyze", post(rest::analyze_handler))
        .route(
            "/chats/{chat_id}/messages/{message_id}/quizzes/{quiz_id}/answer",
            post(rest::answer_quiz_handler),
        );

    let ui_routes = Router::new()
        .route("/settings", patch(rest::update_settings_handler))
        .route("/settings/mode", put(rest::set_user_mode_handler))
        .route("/ui/sidebar/toggle", post(rest::toggle_sidebar_handler))
        .route("/ui/dual-view/toggle", post(rest::toggle_dual_view_handler))
        .route("/ui/analysis", put(rest::set_current_analysis_handler));

    let session_routes = Router::new()
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler));

    let router = Router::new()
        .route("/state", get(rest::get_state_handler))
        .route("/stats", get(rest::statistics_handler))
        .route("/progress", get(rest::progress_handler))
        .route("/attachments/link", post(attachments::attach_link_handler))
        .route("/attachments/pdf", post(attachments::attach_pdf_handler))
        .route("/ws", get(ws_handler))
        .merge(chat_routes)
        .merge(ui_routes)
        .merge(session_routes)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(cors)
        .with_state(app_state);

    Ok(router)
}
