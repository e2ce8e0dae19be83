//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification. Every handler maps onto one store
//! action or one derived view.

use crate::web::{
    attachments::{AttachmentResponse, LinkRequest},
    auth::{LoginRequest, SessionResponse},
    chat_task::{spawn_analysis, spawn_reply},
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use fact_tutor_core::{
    domain::{AccessibilitySettings, DisplaySettings},
    tutor::analysis_request_content,
    Attachment, CategoryFilter, ChatCategory, ChatStore, NewMessage, SettingsPatch, UserMode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        get_state_handler,
        create_chat_handler,
        list_chats_handler,
        delete_chat_handler,
        set_active_chat_handler,
        submit_message_handler,
        analyze_handler,
        answer_quiz_handler,
        update_settings_handler,
        set_user_mode_handler,
        toggle_sidebar_handler,
        toggle_dual_view_handler,
        set_current_analysis_handler,
        statistics_handler,
        progress_handler,
        crate::web::auth::login_handler,
        crate::web::auth::logout_handler,
        crate::web::attachments::attach_link_handler,
        crate::web::attachments::attach_pdf_handler,
    ),
    components(
        schemas(
            CreateChatRequest, CreateChatResponse, ActiveChatRequest, SubmitRequest,
            QuizAnswerRequest, UpdateSettingsRequest, UserModeRequest, ToggleResponse,
            AnalysisSelection, LoginRequest, SessionResponse, LinkRequest, AttachmentResponse
        )
    ),
    tags(
        (name = "Fact-Checking Tutor API", description = "Chats, analyses, quizzes and statistics for the fact-checking tutor.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CreateChatRequest {
    #[serde(default)]
    #[schema(value_type = String, example = "general")]
    pub category: ChatCategory,
}

#[derive(Serialize, ToSchema)]
pub struct CreateChatResponse {
    pub chat_id: Uuid,
}

#[derive(Deserialize)]
pub struct ChatQuery {
    pub q: Option<String>,
    pub category: Option<ChatCategory>,
}

#[derive(Deserialize, ToSchema)]
pub struct ActiveChatRequest {
    pub chat_id: Option<Uuid>,
}

#[derive(Deserialize, ToSchema)]
pub struct SubmitRequest {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub attachments: Vec<Attachment>,
}

#[derive(Deserialize, ToSchema)]
pub struct QuizAnswerRequest {
    pub selected: usize,
}

/// Top-level settings patch; nested groups replace the stored group wholesale.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub mode: Option<UserMode>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub accessibility: Option<AccessibilitySettings>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub display: Option<DisplaySettings>,
}

impl From<UpdateSettingsRequest> for SettingsPatch {
    fn from(req: UpdateSettingsRequest) -> Self {
        SettingsPatch {
            mode: req.mode,
            accessibility: req.accessibility,
            display: req.display,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct UserModeRequest {
    #[schema(value_type = String, example = "teacher")]
    pub mode: UserMode,
}

#[derive(Serialize, ToSchema)]
pub struct ToggleResponse {
    pub open: bool,
}

/// Points at the analysis carried by a stored assistant message.
#[derive(Deserialize, ToSchema)]
pub struct AnalysisSelection {
    pub chat_id: Uuid,
    pub message_id: Uuid,
}

//=========================================================================================
// Helpers
//=========================================================================================

type HandlerError = (StatusCode, String);

fn ensure_chat(store: &ChatStore, chat_id: Uuid) -> Result<(), HandlerError> {
    if store.state().find_chat(chat_id).is_none() {
        return Err((StatusCode::NOT_FOUND, format!("Chat {} not found", chat_id)));
    }
    Ok(())
}

fn validate_submission(req: &SubmitRequest) -> Result<(), HandlerError> {
    if req.content.trim().is_empty() && req.attachments.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "A submission needs content or at least one attachment".to_string(),
        ));
    }
    Ok(())
}

//=========================================================================================
// State and Chats
//=========================================================================================

/// Returns a snapshot of the whole store.
#[utoipa::path(
    get,
    path = "/state",
    responses((status = 200, description = "Current store snapshot"))
)]
pub async fn get_state_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(app_state.store.lock().await.snapshot())
}

/// Creates a chat, or reuses the existing chat that has no user message yet.
#[utoipa::path(
    post,
    path = "/chats",
    request_body = CreateChatRequest,
    responses((status = 201, description = "Active chat id", body = CreateChatResponse))
)]
pub async fn create_chat_handler(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<CreateChatRequest>,
) -> impl IntoResponse {
    let chat_id = app_state.store.lock().await.create_chat(req.category);
    info!(%chat_id, category = ?req.category, "Chat ready");
    (StatusCode::CREATED, Json(CreateChatResponse { chat_id }))
}

/// Lists chats matching a title query and an optional category.
#[utoipa::path(
    get,
    path = "/chats",
    params(
        ("q" = Option<String>, Query, description = "Case-insensitive title filter"),
        ("category" = Option<String>, Query, description = "Only chats in this category")
    ),
    responses((status = 200, description = "Matching chats, newest first"))
)]
pub async fn list_chats_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<ChatQuery>,
) -> impl IntoResponse {
    let store = app_state.store.lock().await;
    let chats: Vec<_> = store
        .search_chats(
            query.q.as_deref().unwrap_or_default(),
            CategoryFilter::from(query.category),
        )
        .into_iter()
        .cloned()
        .collect();
    Json(chats)
}

/// Deletes a chat and cancels any reply or analysis still pending for it.
#[utoipa::path(
    delete,
    path = "/chats/{chat_id}",
    params(("chat_id" = Uuid, Path, description = "Chat to delete")),
    responses(
        (status = 204, description = "Chat deleted"),
        (status = 404, description = "Unknown chat")
    )
)]
pub async fn delete_chat_handler(
    State(app_state): State<Arc<AppState>>,
    Path(chat_id): Path<Uuid>,
) -> Result<impl IntoResponse, HandlerError> {
    let mut store = app_state.store.lock().await;
    ensure_chat(&store, chat_id)?;
    app_state.tasks.cancel_chat(chat_id);
    store.delete_chat(chat_id);
    info!(%chat_id, "Chat deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Moves the active-chat pointer. `null` clears it.
#[utoipa::path(
    put,
    path = "/chats/active",
    request_body = ActiveChatRequest,
    responses(
        (status = 200, description = "Active chat updated"),
        (status = 404, description = "Unknown chat")
    )
)]
pub async fn set_active_chat_handler(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<ActiveChatRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let mut store = app_state.store.lock().await;
    if let Some(chat_id) = req.chat_id {
        ensure_chat(&store, chat_id)?;
    }
    store.set_active_chat(req.chat_id);
    Ok(Json(ActiveChatResponse {
        chat_id: store.state().active_chat,
    }))
}

#[derive(Serialize)]
struct ActiveChatResponse {
    chat_id: Option<Uuid>,
}

//=========================================================================================
// Submissions
//=========================================================================================

/// Posts a question; the tutor's reply is appended after the reply delay.
#[utoipa::path(
    post,
    path = "/chats/{chat_id}/messages",
    request_body = SubmitRequest,
    params(("chat_id" = Uuid, Path, description = "Target chat")),
    responses(
        (status = 202, description = "Question stored, reply scheduled"),
        (status = 400, description = "Empty submission"),
        (status = 404, description = "Unknown chat")
    )
)]
pub async fn submit_message_handler(
    State(app_state): State<Arc<AppState>>,
    Path(chat_id): Path<Uuid>,
    Json(req): Json<SubmitRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    validate_submission(&req)?;

    let mut store = app_state.store.lock().await;
    ensure_chat(&store, chat_id)?;
    store.add_message(
        chat_id,
        NewMessage::user(req.content.clone()).with_attachments(req.attachments),
    );
    let mode = store.state().user_settings.mode;
    let chat = store.state().find_chat(chat_id).cloned();

    // Registered while the store is locked: a concurrent delete always sees the token.
    spawn_reply(app_state.clone(), chat_id, mode, req.content);
    Ok((StatusCode::ACCEPTED, Json(chat)))
}

/// Requests a credibility analysis; the result is appended after the analysis delay.
#[utoipa::path(
    post,
    path = "/chats/{chat_id}/analyze",
    request_body = SubmitRequest,
    params(("chat_id" = Uuid, Path, description = "Target chat")),
    responses(
        (status = 202, description = "Analysis scheduled"),
        (status = 400, description = "Empty submission"),
        (status = 404, description = "Unknown chat"),
        (status = 409, description = "An analysis is already running")
    )
)]
pub async fn analyze_handler(
    State(app_state): State<Arc<AppState>>,
    Path(chat_id): Path<Uuid>,
    Json(req): Json<SubmitRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    validate_submission(&req)?;

    let mut store = app_state.store.lock().await;
    ensure_chat(&store, chat_id)?;
    if store.state().is_analyzing {
        warn!(%chat_id, "Analysis requested while another one is running");
        return Err((
            StatusCode::CONFLICT,
            "An analysis is already in progress".to_string(),
        ));
    }
    store.add_message(
        chat_id,
        NewMessage::user(analysis_request_content(&req.content))
            .with_attachments(req.attachments.clone()),
    );
    store.set_is_analyzing(true);
    let chat = store.state().find_chat(chat_id).cloned();

    spawn_analysis(app_state.clone(), chat_id, req.content, req.attachments);
    Ok((StatusCode::ACCEPTED, Json(chat)))
}

/// Grades an answer to one of the quizzes attached to an analysis. Nothing is stored.
#[utoipa::path(
    post,
    path = "/chats/{chat_id}/messages/{message_id}/quizzes/{quiz_id}/answer",
    request_body = QuizAnswerRequest,
    params(
        ("chat_id" = Uuid, Path, description = "Chat holding the analysis"),
        ("message_id" = Uuid, Path, description = "Assistant message carrying the analysis"),
        ("quiz_id" = String, Path, description = "Quiz to answer")
    ),
    responses(
        (status = 200, description = "Grading outcome"),
        (status = 404, description = "Unknown chat, message or quiz")
    )
)]
pub async fn answer_quiz_handler(
    State(app_state): State<Arc<AppState>>,
    Path((chat_id, message_id, quiz_id)): Path<(Uuid, Uuid, String)>,
    Json(req): Json<QuizAnswerRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let store = app_state.store.lock().await;
    let quiz = store
        .state()
        .find_message(chat_id, message_id)
        .and_then(|message| message.analysis.as_ref())
        .and_then(|analysis| analysis.find_quiz(&quiz_id))
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Quiz {} not found", quiz_id)))?;
    Ok(Json(quiz.grade(req.selected)))
}

//=========================================================================================
// Settings and UI Toggles
//=========================================================================================

#[utoipa::path(
    patch,
    path = "/settings",
    request_body = UpdateSettingsRequest,
    responses((status = 200, description = "Updated settings"))
)]
pub async fn update_settings_handler(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<UpdateSettingsRequest>,
) -> impl IntoResponse {
    let mut store = app_state.store.lock().await;
    store.update_settings(req.into());
    Json(store.state().user_settings)
}

#[utoipa::path(
    put,
    path = "/settings/mode",
    request_body = UserModeRequest,
    responses((status = 200, description = "Updated settings"))
)]
pub async fn set_user_mode_handler(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<UserModeRequest>,
) -> impl IntoResponse {
    let mut store = app_state.store.lock().await;
    store.set_user_mode(req.mode);
    Json(store.state().user_settings)
}

#[utoipa::path(
    post,
    path = "/ui/sidebar/toggle",
    responses((status = 200, description = "New sidebar state", body = ToggleResponse))
)]
pub async fn toggle_sidebar_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut store = app_state.store.lock().await;
    store.toggle_sidebar();
    Json(ToggleResponse {
        open: store.state().sidebar_open,
    })
}

#[utoipa::path(
    post,
    path = "/ui/dual-view/toggle",
    responses((status = 200, description = "New dual view state", body = ToggleResponse))
)]
pub async fn toggle_dual_view_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut store = app_state.store.lock().await;
    store.toggle_dual_view();
    Json(ToggleResponse {
        open: store.state().dual_view_open,
    })
}

/// Shows the analysis of a stored message in the dual view, or closes it with `null`.
#[utoipa::path(
    put,
    path = "/ui/analysis",
    request_body(content = AnalysisSelection, description = "The message whose analysis to show, or `null` to close the view"),
    responses(
        (status = 200, description = "Dual view state", body = ToggleResponse),
        (status = 404, description = "No analysis on that message")
    )
)]
pub async fn set_current_analysis_handler(
    State(app_state): State<Arc<AppState>>,
    Json(selection): Json<Option<AnalysisSelection>>,
) -> Result<impl IntoResponse, HandlerError> {
    let mut store = app_state.store.lock().await;
    let analysis = match selection {
        Some(AnalysisSelection { chat_id, message_id }) => Some(
            store
                .state()
                .find_message(chat_id, message_id)
                .and_then(|message| message.analysis.clone())
                .ok_or_else(|| {
                    (
                        StatusCode::NOT_FOUND,
                        format!("Message {} carries no analysis", message_id),
                    )
                })?,
        ),
        None => None,
    };
    store.set_current_analysis(analysis);
    Ok(Json(ToggleResponse {
        open: store.state().dual_view_open,
    }))
}

//=========================================================================================
// Derived Views
//=========================================================================================

#[utoipa::path(
    get,
    path = "/stats",
    responses((status = 200, description = "Word cloud, monthly timeline and source comparison"))
)]
pub async fn statistics_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(app_state.store.lock().await.statistics())
}

#[utoipa::path(
    get,
    path = "/progress",
    responses((status = 200, description = "Learning level, activity counts and achievements"))
)]
pub async fn progress_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(app_state.store.lock().await.progress())
}
