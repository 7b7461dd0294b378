use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Transcript, User};

/// Stable machine-checkable failure shape; every error body carries at
/// least this.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Public view of a user. Credential material and OTP state never leave
/// the server.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub picture: Option<String>,
    pub is_email_verified: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            picture: user.picture.clone(),
            is_email_verified: user.is_email_verified,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptResponse {
    pub id: String,
    pub text: String,
    pub filename: Option<String>,
    pub language: String,
    /// Billable minutes.
    pub duration: u32,
    pub cost: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_seconds: Option<u64>,
    pub created_at: DateTime<Utc>,
}

impl From<&Transcript> for TranscriptResponse {
    fn from(t: &Transcript) -> Self {
        Self {
            id: t.id.to_string(),
            text: t.text.clone(),
            filename: t.filename.clone(),
            language: t.language.clone(),
            duration: t.duration_minutes,
            cost: t.cost,
            file_size_bytes: t.file_size_bytes,
            processing_seconds: t.processing_seconds,
            created_at: t.created_at,
        }
    }
}
