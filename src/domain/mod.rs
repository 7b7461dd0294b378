mod auth_session;
mod otp;
mod staged_path;
mod transcript;
mod transcript_id;
mod user;
mod user_id;

pub use auth_session::{AuthSession, SessionToken};
pub use otp::{OTP_TTL_MINUTES, OtpChallenge};
pub use staged_path::StagedPath;
pub use transcript::{LANGUAGE_AUTO, Transcript};
pub use transcript_id::TranscriptId;
pub use user::{User, normalize_email};
pub use user_id::UserId;
