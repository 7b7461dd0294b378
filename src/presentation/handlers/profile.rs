use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use super::responses::{ErrorResponse, TranscriptResponse, UserResponse};
use crate::application::services::AuthError;
use crate::presentation::auth_context::AuthenticatedContext;
use crate::presentation::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStats {
    pub total_transcripts: u64,
    pub total_cost: f64,
    pub total_duration_minutes: u64,
    pub this_month_count: u64,
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub user: UserResponse,
    pub stats: ProfileStats,
    pub recent: Vec<TranscriptResponse>,
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[tracing::instrument(skip(state, ctx), fields(user_id = %ctx.user_id()))]
pub async fn get_profile_handler(
    State(state): State<AppState>,
    ctx: AuthenticatedContext,
) -> Response {
    match state
        .transcription_service
        .profile_stats(ctx.user_id())
        .await
    {
        Ok((stats, recent)) => (
            StatusCode::OK,
            Json(ProfileResponse {
                user: UserResponse::from(&ctx.user),
                stats: ProfileStats {
                    total_transcripts: stats.total_count,
                    total_cost: stats.total_cost,
                    total_duration_minutes: stats.total_minutes,
                    this_month_count: stats.month_count,
                },
                recent: recent.iter().map(TranscriptResponse::from).collect(),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Profile stats query failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Internal server error")),
            )
                .into_response()
        }
    }
}

#[tracing::instrument(skip(state, ctx, request), fields(user_id = %ctx.user_id()))]
pub async fn update_profile_handler(
    State(state): State<AppState>,
    ctx: AuthenticatedContext,
    Json(request): Json<UpdateProfileRequest>,
) -> Response {
    match state
        .auth_service
        .update_profile(ctx.user_id(), request.name, request.email)
        .await
    {
        Ok(user) => (
            StatusCode::OK,
            Json(serde_json::json!({ "user": UserResponse::from(&user) })),
        )
            .into_response(),
        Err(AuthError::EmailTaken) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Email already registered")),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Profile update failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Internal server error")),
            )
                .into_response()
        }
    }
}
