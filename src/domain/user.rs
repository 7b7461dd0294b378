use chrono::{DateTime, Utc};

use super::{OtpChallenge, UserId};

/// Lowercase an email for storage and lookup. Email uniqueness is
/// case-insensitive across both local and federated accounts.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// An account, created either by local signup or by a federated login.
/// Addressable by `google_id`, by `email`, or by both.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub google_id: Option<String>,
    pub name: String,
    pub email: Option<String>,
    pub picture: Option<String>,
    pub password_hash: Option<String>,
    pub is_email_verified: bool,
    pub otp: Option<OtpChallenge>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// A local-credential account. Starts unverified with a pending
    /// challenge; local login is unreachable until verification.
    pub fn local(name: String, email: &str, password_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            id: UserId::new(),
            google_id: None,
            name,
            email: Some(normalize_email(email)),
            picture: None,
            password_hash: Some(password_hash),
            is_email_verified: false,
            otp: Some(OtpChallenge::issue(now)),
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// An account created from a federated profile. The provider vouches
    /// for the email, so the account is born verified.
    pub fn federated(
        subject: String,
        name: String,
        email: Option<&str>,
        picture: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UserId::new(),
            google_id: Some(subject),
            name,
            email: email.map(normalize_email),
            picture,
            password_hash: None,
            is_email_verified: true,
            otp: None,
            last_login_at: Some(now),
            created_at: now,
            updated_at: now,
        }
    }

    /// `Unverified -> Verified` is the only transition; `Verified` is terminal.
    pub fn mark_verified(&mut self, now: DateTime<Utc>) {
        self.is_email_verified = true;
        self.otp = None;
        self.updated_at = now;
    }

    /// Replace any pending challenge with a fresh one.
    pub fn reissue_otp(&mut self, now: DateTime<Utc>) -> OtpChallenge {
        let challenge = OtpChallenge::issue(now);
        self.otp = Some(challenge.clone());
        self.updated_at = now;
        challenge
    }

    pub fn record_login(&mut self, now: DateTime<Utc>) {
        self.last_login_at = Some(now);
        self.updated_at = now;
    }

    /// Attach a federated subject to an existing (email-matched) account.
    pub fn link_google(&mut self, subject: String, picture: Option<String>, now: DateTime<Utc>) {
        self.google_id = Some(subject);
        if self.picture.is_none() {
            self.picture = picture;
        }
        self.updated_at = now;
    }
}
