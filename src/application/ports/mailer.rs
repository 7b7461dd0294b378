use async_trait::async_trait;

/// Best-effort email delivery. Callers swallow errors from the welcome
/// path; signup uses `Unavailable` to decide whether to echo the OTP in
/// non-production configurations.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_otp(&self, email: &str, name: &str, code: &str) -> Result<(), MailerError>;

    async fn send_welcome(&self, email: &str, name: &str) -> Result<(), MailerError>;
}

#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("no email delivery configured")]
    Unavailable,
    #[error("delivery failed: {0}")]
    DeliveryFailed(String),
}
