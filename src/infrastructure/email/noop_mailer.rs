use async_trait::async_trait;

use crate::application::ports::{Mailer, MailerError};

/// Used when no delivery is configured. Always reports `Unavailable`,
/// which lets non-production configurations echo the OTP instead.
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send_otp(&self, _email: &str, _name: &str, _code: &str) -> Result<(), MailerError> {
        Err(MailerError::Unavailable)
    }

    async fn send_welcome(&self, _email: &str, _name: &str) -> Result<(), MailerError> {
        Err(MailerError::Unavailable)
    }
}
