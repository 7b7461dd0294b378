use async_trait::async_trait;

use crate::application::ports::{AudioPayload, TranscriptionEngine, TranscriptionError};

/// Returns a fixed transcript without calling out.
pub struct MockTranscriptionEngine {
    pub text: String,
}

impl MockTranscriptionEngine {
    pub fn returning(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

#[async_trait]
impl TranscriptionEngine for MockTranscriptionEngine {
    async fn transcribe(
        &self,
        _audio: AudioPayload<'_>,
        _language: Option<&str>,
    ) -> Result<String, TranscriptionError> {
        Ok(self.text.clone())
    }
}

/// Always fails, for exercising the pipeline's provider-failure path.
pub struct FailingTranscriptionEngine;

#[async_trait]
impl TranscriptionEngine for FailingTranscriptionEngine {
    async fn transcribe(
        &self,
        _audio: AudioPayload<'_>,
        _language: Option<&str>,
    ) -> Result<String, TranscriptionError> {
        Err(TranscriptionError::ApiRequestFailed(
            "provider unavailable".to_string(),
        ))
    }
}
