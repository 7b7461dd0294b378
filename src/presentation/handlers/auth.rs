use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{AppendHeaders, IntoResponse, Redirect, Response};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::responses::{ErrorResponse, UserResponse};
use crate::application::services::AuthError;
use crate::domain::SessionToken;
use crate::presentation::auth_context::MaybeAuthenticated;
use crate::presentation::cookies::{
    STATE_COOKIE, clear_session_cookie, clear_state_cookie, cookie_value, session_cookie,
    state_cookie,
};
use crate::presentation::state::AppState;

#[derive(Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct SignupResponse {
    pub user: UserResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

#[derive(Deserialize)]
pub struct ResendOtpRequest {
    pub email: String,
}

#[derive(Serialize)]
pub struct UserEnvelope {
    pub user: UserResponse,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub user: Option<UserResponse>,
}

#[derive(Serialize)]
pub struct OkResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRequiredResponse {
    pub error: String,
    pub verification_required: bool,
}

#[derive(Deserialize)]
pub struct OAuthCallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[tracing::instrument(skip(state, request))]
pub async fn signup_handler(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Response {
    match state
        .auth_service
        .signup(&request.name, &request.email, &request.password)
        .await
    {
        Ok(outcome) => (
            StatusCode::CREATED,
            Json(SignupResponse {
                user: UserResponse::from(&outcome.user),
                otp: outcome.otp_echo,
            }),
        )
            .into_response(),
        Err(AuthError::EmailTaken) => error_json(StatusCode::BAD_REQUEST, "Email already registered"),
        Err(AuthError::InvalidInput(msg)) => error_json(StatusCode::BAD_REQUEST, &msg),
        Err(e) => internal_error(e),
    }
}

#[tracing::instrument(skip(state, request))]
pub async fn login_handler(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Response {
    let user = match state
        .auth_service
        .login(&request.email, &request.password)
        .await
    {
        Ok(user) => user,
        Err(AuthError::VerificationRequired) => {
            return (
                StatusCode::FORBIDDEN,
                Json(VerificationRequiredResponse {
                    error: "Email not verified".to_string(),
                    verification_required: true,
                }),
            )
                .into_response();
        }
        Err(AuthError::InvalidCredentials | AuthError::InvalidInput(_)) => {
            return error_json(StatusCode::UNAUTHORIZED, "Invalid email or password");
        }
        Err(e) => return internal_error(e),
    };

    let session = match state.auth_service.establish_session(user.id).await {
        Ok(session) => session,
        Err(e) => return internal_error(e),
    };

    let cookie = session_cookie(
        &state.settings.session.cookie_name,
        session.token.as_str(),
        state.settings.session.ttl_hours * 3600,
        state.settings.environment.is_production(),
    );

    (
        StatusCode::OK,
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(UserEnvelope {
            user: UserResponse::from(&user),
        }),
    )
        .into_response()
}

#[tracing::instrument(skip(state, request))]
pub async fn verify_otp_handler(
    State(state): State<AppState>,
    Json(request): Json<VerifyOtpRequest>,
) -> Response {
    match state
        .auth_service
        .verify_otp(&request.email, &request.otp)
        .await
    {
        Ok(user) => (
            StatusCode::OK,
            Json(UserEnvelope {
                user: UserResponse::from(&user),
            }),
        )
            .into_response(),
        Err(e) => otp_error_response(e),
    }
}

#[tracing::instrument(skip(state, request))]
pub async fn resend_otp_handler(
    State(state): State<AppState>,
    Json(request): Json<ResendOtpRequest>,
) -> Response {
    match state.auth_service.resend_otp(&request.email).await {
        Ok(otp) => (StatusCode::OK, Json(OkResponse { ok: true, otp })).into_response(),
        Err(e) => otp_error_response(e),
    }
}

/// Current identity, or null. Never an error; a broken session simply
/// reads as logged-out.
pub async fn session_handler(MaybeAuthenticated(user): MaybeAuthenticated) -> Response {
    (
        StatusCode::OK,
        Json(SessionResponse {
            user: user.as_ref().map(UserResponse::from),
        }),
    )
        .into_response()
}

/// Idempotent: succeeds whether or not a session existed.
pub async fn logout_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = cookie_value(&headers, &state.settings.session.cookie_name)
        .and_then(|raw| SessionToken::parse(&raw))
    {
        if let Err(e) = state.auth_service.terminate_session(&token).await {
            tracing::warn!(error = %e, "Session termination failed");
        }
    }

    let cookie = clear_session_cookie(
        &state.settings.session.cookie_name,
        state.settings.environment.is_production(),
    );

    (
        StatusCode::OK,
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(OkResponse { ok: true, otp: None }),
    )
        .into_response()
}

/// Begin the federated handshake: remember the anti-forgery state in a
/// short-lived cookie and send the user agent to the provider.
pub async fn google_login_handler(State(state): State<AppState>) -> Response {
    let oauth_state = random_state();
    let url = state.identity_provider.authorize_url(&oauth_state);
    let cookie = state_cookie(&oauth_state, state.settings.environment.is_production());

    (AppendHeaders([(header::SET_COOKIE, cookie)]), Redirect::to(&url)).into_response()
}

#[tracing::instrument(skip(state, params, headers))]
pub async fn google_callback_handler(
    State(state): State<AppState>,
    Query(params): Query<OAuthCallbackParams>,
    headers: HeaderMap,
) -> Response {
    let failure = state.settings.client.failure_redirect();
    let production = state.settings.environment.is_production();

    if let Some(error) = params.error {
        tracing::warn!(error = %error, "Provider reported OAuth failure");
        return oauth_redirect(&failure, None, production);
    }

    let expected_state = cookie_value(&headers, STATE_COOKIE);
    if expected_state.is_none() || expected_state != params.state {
        tracing::warn!("OAuth state mismatch");
        return oauth_redirect(&failure, None, production);
    }

    let Some(code) = params.code else {
        tracing::warn!("OAuth callback without code");
        return oauth_redirect(&failure, None, production);
    };

    let profile = match state.identity_provider.exchange_code(&code).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::error!(error = %e, "OAuth code exchange failed");
            return oauth_redirect(&failure, None, production);
        }
    };

    let user = match state.auth_service.resolve_federated(profile).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!(error = %e, "Federated account resolution failed");
            return oauth_redirect(&failure, None, production);
        }
    };

    let session = match state.auth_service.establish_session(user.id).await {
        Ok(session) => session,
        Err(e) => {
            tracing::error!(error = %e, "Session creation failed");
            return oauth_redirect(&failure, None, production);
        }
    };

    let cookie = session_cookie(
        &state.settings.session.cookie_name,
        session.token.as_str(),
        state.settings.session.ttl_hours * 3600,
        production,
    );

    oauth_redirect(
        &state.settings.client.post_login_redirect(),
        Some(cookie),
        production,
    )
}

/// Redirect that always drops the state cookie and optionally sets the
/// session cookie.
fn oauth_redirect(
    destination: &str,
    session: Option<axum::http::HeaderValue>,
    production: bool,
) -> Response {
    let mut cookies = vec![(header::SET_COOKIE, clear_state_cookie(production))];
    if let Some(cookie) = session {
        cookies.push((header::SET_COOKIE, cookie));
    }
    (AppendHeaders(cookies), Redirect::to(destination)).into_response()
}

fn otp_error_response(e: AuthError) -> Response {
    match e {
        AuthError::UserNotFound => error_json(StatusCode::NOT_FOUND, "User not found"),
        AuthError::AlreadyVerified => {
            error_json(StatusCode::BAD_REQUEST, "Email already verified")
        }
        AuthError::InvalidOrExpiredOtp => {
            error_json(StatusCode::BAD_REQUEST, "Invalid or expired verification code")
        }
        other => internal_error(other),
    }
}

fn error_json(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}

fn internal_error(e: AuthError) -> Response {
    tracing::error!(error = %e, "Auth request failed");
    error_json(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

fn random_state() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
