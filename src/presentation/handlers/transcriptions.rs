use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::responses::{ErrorResponse, TranscriptResponse};
use crate::application::services::{IngestError, UploadedAudio};
use crate::domain::TranscriptId;
use crate::presentation::auth_context::AuthenticatedContext;
use crate::presentation::state::AppState;

const MISSING_FILE_MESSAGE: &str = "No file uploaded (field name should be 'file').";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionCreatedResponse {
    pub id: String,
    pub text: String,
    /// Billable minutes.
    pub duration: u32,
    pub cost: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct PipelineFailureResponse {
    pub error: String,
    pub detail: String,
}

#[derive(Deserialize)]
pub struct SaveHistoryRequest {
    pub text: String,
}

#[derive(Serialize)]
pub struct DeletedResponse {
    pub ok: bool,
}

#[tracing::instrument(skip(state, ctx, multipart), fields(user_id = %ctx.user_id()))]
pub async fn create_transcription_handler(
    State(state): State<AppState>,
    ctx: AuthenticatedContext,
    mut multipart: Multipart,
) -> Response {
    let mut file: Option<(String, String, Bytes)> = None;
    let mut language: Option<String> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read multipart body");
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse::new(format!("Failed to read multipart: {}", e))),
                )
                    .into_response();
            }
        };

        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or("audio").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                match field.bytes().await {
                    Ok(data) => file = Some((filename, content_type, data)),
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to read uploaded file");
                        return (
                            StatusCode::BAD_REQUEST,
                            Json(ErrorResponse::new(format!("Failed to read file: {}", e))),
                        )
                            .into_response();
                    }
                }
            }
            Some("language") => language = field.text().await.ok(),
            _ => {}
        }
    }

    let Some((filename, content_type, data)) = file else {
        tracing::warn!("Transcription request with no file field");
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(MISSING_FILE_MESSAGE)),
        )
            .into_response();
    };

    tracing::debug!(filename = %filename, bytes = data.len(), "Processing audio upload");

    let upload = UploadedAudio {
        data,
        filename,
        content_type,
        language,
    };

    match state
        .transcription_service
        .ingest(ctx.user_id(), upload)
        .await
    {
        Ok(transcript) => (
            StatusCode::CREATED,
            Json(TranscriptionCreatedResponse {
                id: transcript.id.to_string(),
                text: transcript.text,
                duration: transcript.duration_minutes,
                cost: transcript.cost,
                created_at: transcript.created_at,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Transcription pipeline failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(PipelineFailureResponse {
                    error: "Transcription failed".to_string(),
                    detail: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

#[tracing::instrument(skip(state, ctx), fields(user_id = %ctx.user_id()))]
pub async fn list_transcriptions_handler(
    State(state): State<AppState>,
    ctx: AuthenticatedContext,
) -> Response {
    match state
        .transcription_service
        .list_for_owner(ctx.user_id())
        .await
    {
        Ok(transcripts) => (
            StatusCode::OK,
            Json(
                transcripts
                    .iter()
                    .map(TranscriptResponse::from)
                    .collect::<Vec<_>>(),
            ),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Transcript listing failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Internal server error")),
            )
                .into_response()
        }
    }
}

#[tracing::instrument(skip(state, ctx, request), fields(user_id = %ctx.user_id()))]
pub async fn save_history_handler(
    State(state): State<AppState>,
    ctx: AuthenticatedContext,
    Json(request): Json<SaveHistoryRequest>,
) -> Response {
    match state
        .transcription_service
        .save_direct(ctx.user_id(), &request.text)
        .await
    {
        Ok(transcript) => {
            (StatusCode::CREATED, Json(TranscriptResponse::from(&transcript))).into_response()
        }
        Err(IngestError::EmptyText) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("transcription text is required")),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "History save failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Internal server error")),
            )
                .into_response()
        }
    }
}

#[tracing::instrument(skip(state, ctx), fields(user_id = %ctx.user_id()))]
pub async fn delete_history_handler(
    State(state): State<AppState>,
    ctx: AuthenticatedContext,
    Path(id): Path<String>,
) -> Response {
    let Ok(uuid) = id.parse::<Uuid>() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Invalid id")),
        )
            .into_response();
    };

    match state
        .transcription_service
        .delete_for_owner(TranscriptId::from_uuid(uuid), ctx.user_id())
        .await
    {
        // Unknown id and foreign-owned record are indistinguishable here.
        Ok(false) => {
            (StatusCode::NOT_FOUND, Json(ErrorResponse::new("Not found"))).into_response()
        }
        Ok(true) => (StatusCode::OK, Json(DeletedResponse { ok: true })).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "History deletion failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Internal server error")),
            )
                .into_response()
        }
    }
}
