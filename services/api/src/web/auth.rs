//! services/api/src/web/auth.rs
//!
//! Session endpoints. Authentication is mocked: any credentials are accepted
//! and the chosen role becomes the session's mode.

use crate::web::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use fact_tutor_core::{User, UserMode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    #[schema(value_type = String, example = "student")]
    pub role: UserMode,
}

#[derive(Serialize, ToSchema)]
pub struct SessionResponse {
    pub user_id: String,
    pub email: String,
    pub name: String,
    #[schema(value_type = String)]
    pub role: UserMode,
    pub is_authenticated: bool,
}

impl SessionResponse {
    fn new(user: &User, is_authenticated: bool) -> Self {
        Self {
            user_id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            is_authenticated,
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/login - Start a session with the given role
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = SessionResponse),
        (status = 400, description = "Missing email")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if req.email.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "An email is required".to_string()));
    }

    let mut store = state.store.lock().await;
    store.login(req.email.trim(), &req.password, req.role);
    let session = store.state();
    info!(user_id = %session.user.id, role = ?session.user.role, "User logged in");

    Ok(Json(SessionResponse::new(&session.user, session.is_authenticated)))
}

/// POST /auth/logout - Reset to the anonymous student and drop every chat
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful", body = SessionResponse)
    )
)]
pub async fn logout_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut store = state.store.lock().await;
    // Pending replies belong to chats that are about to disappear.
    state.tasks.cancel_all();
    store.logout();
    info!("User logged out");

    let session = store.state();
    Json(SessionResponse::new(&session.user, session.is_authenticated))
}
