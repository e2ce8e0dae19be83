//! services/api/src/web/attachments.rs
//!
//! Turns uploaded links and PDF files into attachments the client can then
//! include in a submission.

use axum::{
    extract::Multipart,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use fact_tutor_core::{Attachment, AttachmentError};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct LinkRequest {
    #[schema(example = "https://twitter.com/user/status/123")]
    pub url: String,
}

#[derive(Serialize, ToSchema)]
pub struct AttachmentResponse {
    #[schema(value_type = Object)]
    pub attachment: Attachment,
}

fn rejection(e: AttachmentError) -> (StatusCode, String) {
    warn!("Attachment rejected: {}", e);
    let status = match e {
        AttachmentError::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        _ => StatusCode::BAD_REQUEST,
    };
    (status, e.to_string())
}

/// Validates a link to a post or article.
#[utoipa::path(
    post,
    path = "/attachments/link",
    request_body = LinkRequest,
    responses(
        (status = 201, description = "Link attachment", body = AttachmentResponse),
        (status = 400, description = "Not an http(s) URL")
    )
)]
pub async fn attach_link_handler(
    Json(req): Json<LinkRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let attachment = Attachment::link(&req.url).map_err(rejection)?;
    Ok((StatusCode::CREATED, Json(AttachmentResponse { attachment })))
}

/// Accepts a multipart/form-data request with a single PDF file part.
#[utoipa::path(
    post,
    path = "/attachments/pdf",
    request_body(content_type = "multipart/form-data", description = "The PDF document to upload."),
    responses(
        (status = 201, description = "PDF attachment", body = AttachmentResponse),
        (status = 400, description = "Missing, empty or non-PDF file"),
        (status = 413, description = "File too large")
    )
)]
pub async fn attach_pdf_handler(
    mut multipart: Multipart,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                format!("Failed to read multipart data: {}", e),
            )
        })?
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                "Multipart form must include a file".to_string(),
            )
        })?;

    let name = field.file_name().unwrap_or("document.pdf").to_string();
    let data = field.bytes().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("Failed to read file bytes: {}", e),
        )
    })?;

    let attachment = Attachment::pdf(name, &data).map_err(rejection)?;
    info!(name = ?attachment.name, bytes = data.len(), "PDF attachment accepted");
    Ok((StatusCode::CREATED, Json(AttachmentResponse { attachment })))
}
