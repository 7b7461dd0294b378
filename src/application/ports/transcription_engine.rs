use async_trait::async_trait;

/// Staged audio handed to the recognition provider. Original filename and
/// content type are preserved on the wire.
pub struct AudioPayload<'a> {
    pub data: &'a [u8],
    pub filename: &'a str,
    pub content_type: &'a str,
}

/// Single-attempt call to the external speech-to-text provider. A `None`
/// language means the hint is omitted entirely and the provider auto-detects.
#[async_trait]
pub trait TranscriptionEngine: Send + Sync {
    async fn transcribe(
        &self,
        audio: AudioPayload<'_>,
        language: Option<&str>,
    ) -> Result<String, TranscriptionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("provider rejected audio: {0}")]
    ProviderRejected(String),
}
