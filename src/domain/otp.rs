use chrono::{DateTime, Duration, Utc};
use rand::Rng;

/// Validity window for a freshly issued code.
pub const OTP_TTL_MINUTES: i64 = 10;

/// A pending email-verification challenge. At most one is active per user;
/// issuing a new one replaces the previous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpChallenge {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

impl OtpChallenge {
    /// Generate a 6-digit numeric code expiring `OTP_TTL_MINUTES` from `now`.
    pub fn issue(now: DateTime<Utc>) -> Self {
        let code = rand::thread_rng().gen_range(100_000..1_000_000);
        Self {
            code: code.to_string(),
            expires_at: now + Duration::minutes(OTP_TTL_MINUTES),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn matches(&self, code: &str) -> bool {
        self.code == code.trim()
    }
}
