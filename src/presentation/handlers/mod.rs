mod auth;
mod health;
mod profile;
mod responses;
mod transcriptions;

pub use auth::{
    google_callback_handler, google_login_handler, login_handler, logout_handler,
    resend_otp_handler, session_handler, signup_handler, verify_otp_handler,
};
pub use health::health_handler;
pub use profile::{get_profile_handler, update_profile_handler};
pub use responses::{ErrorResponse, TranscriptResponse, UserResponse};
pub use transcriptions::{
    create_transcription_handler, delete_history_handler, list_transcriptions_handler,
    save_history_handler,
};
