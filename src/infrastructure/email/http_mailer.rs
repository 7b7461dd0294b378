use async_trait::async_trait;
use serde_json::json;

use crate::application::ports::{Mailer, MailerError};

/// Delivery through a transactional-email HTTP API: one POST per message,
/// bearer-authenticated, JSON body with from/to/subject/html.
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    from: String,
}

impl HttpMailer {
    pub fn new(api_url: String, api_key: String, from: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
            from,
        }
    }

    async fn send(&self, to: &str, subject: &str, html: String) -> Result<(), MailerError> {
        let body = json!({
            "from": self.from,
            "to": [to],
            "subject": subject,
            "html": html,
        });

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| MailerError::DeliveryFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MailerError::DeliveryFailed(format!(
                "status {}",
                response.status()
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send_otp(&self, email: &str, name: &str, code: &str) -> Result<(), MailerError> {
        let html = format!(
            "<p>Hello {}!</p>\
             <p>Your verification code is <strong>{}</strong>. \
             It expires in 10 minutes. If you didn't request this, ignore this email.</p>",
            name, code
        );
        self.send(email, "Verify your email", html).await
    }

    async fn send_welcome(&self, email: &str, name: &str) -> Result<(), MailerError> {
        let html = format!(
            "<p>Hello {}!</p>\
             <p>Your email has been verified. You can now upload audio for \
             transcription and manage your history.</p>",
            name
        );
        self.send(email, "Welcome!", html).await
    }
}
