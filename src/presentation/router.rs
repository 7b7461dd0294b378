use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::middleware;
use axum::routing::{delete, get, post};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{
    create_transcription_handler, delete_history_handler, get_profile_handler,
    google_callback_handler, google_login_handler, health_handler, list_transcriptions_handler,
    login_handler, logout_handler, resend_otp_handler, save_history_handler, session_handler,
    signup_handler, update_profile_handler, verify_otp_handler,
};
use crate::presentation::state::AppState;

pub fn create_router(state: AppState) -> Router {
    // Credentialed CORS: only the configured client origins, cookies
    // allowed.
    let allowed: Vec<HeaderValue> = state
        .settings
        .client
        .allowed_origins()
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/health", get(health_handler))
        .route("/auth/google", get(google_login_handler))
        .route("/auth/google/callback", get(google_callback_handler))
        .route("/auth/signup", post(signup_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/verify-otp", post(verify_otp_handler))
        .route("/auth/resend-otp", post(resend_otp_handler))
        .route("/auth/session", get(session_handler))
        .route("/auth/logout", post(logout_handler))
        .route(
            "/profile",
            get(get_profile_handler).put(update_profile_handler),
        )
        .route(
            "/api/transcriptions",
            post(create_transcription_handler).get(list_transcriptions_handler),
        )
        .route(
            "/api/history",
            get(list_transcriptions_handler).post(save_history_handler),
        )
        .route("/api/history/{id}", delete(delete_history_handler))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
