use std::sync::Mutex;

use async_trait::async_trait;

use crate::application::ports::{Mailer, MailerError};

/// Records deliveries for assertions; every send succeeds.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent_otps: Mutex<Vec<(String, String)>>,
    pub sent_welcomes: Mutex<Vec<String>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_otp_for(&self, email: &str) -> Option<String> {
        self.sent_otps
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, code)| code.clone())
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_otp(&self, email: &str, _name: &str, code: &str) -> Result<(), MailerError> {
        self.sent_otps
            .lock()
            .unwrap()
            .push((email.to_string(), code.to_string()));
        Ok(())
    }

    async fn send_welcome(&self, email: &str, _name: &str) -> Result<(), MailerError> {
        self.sent_welcomes.lock().unwrap().push(email.to_string());
        Ok(())
    }
}
