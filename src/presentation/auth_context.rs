use axum::Json;
use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};

use crate::domain::{SessionToken, User, UserId};
use crate::presentation::cookies::cookie_value;
use crate::presentation::handlers::ErrorResponse;
use crate::presentation::state::AppState;

/// The caller's resolved identity, constructed once per request from the
/// session cookie. Handlers receive this explicitly and never reach into
/// ambient request state.
pub struct AuthenticatedContext {
    pub user: User,
}

impl AuthenticatedContext {
    pub fn user_id(&self) -> UserId {
        self.user.id
    }
}

pub enum AuthRejection {
    Unauthorized,
    Internal,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new("Unauthorized")),
            )
                .into_response(),
            AuthRejection::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Internal server error")),
            )
                .into_response(),
        }
    }
}

impl FromRequestParts<AppState> for AuthenticatedContext {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // A missing or malformed cookie is an unauthenticated request, not
        // an error.
        let token = cookie_value(&parts.headers, &state.settings.session.cookie_name)
            .and_then(|raw| SessionToken::parse(&raw))
            .ok_or(AuthRejection::Unauthorized)?;

        match state.auth_service.resolve_session(&token).await {
            Ok(Some(user)) => Ok(Self { user }),
            Ok(None) => Err(AuthRejection::Unauthorized),
            Err(e) => {
                tracing::error!(error = %e, "Session resolution failed");
                Err(AuthRejection::Internal)
            }
        }
    }
}

/// Optional variant for endpoints that report the current identity without
/// requiring one. Never rejects; any failure resolves to `None`.
pub struct MaybeAuthenticated(pub Option<User>);

impl FromRequestParts<AppState> for MaybeAuthenticated {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = cookie_value(&parts.headers, &state.settings.session.cookie_name)
            .and_then(|raw| SessionToken::parse(&raw));

        let user = match token {
            Some(token) => state
                .auth_service
                .resolve_session(&token)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(user))
    }
}
