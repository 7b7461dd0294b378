use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use chrono::Utc;

use super::billing::{BillingRates, billable_minutes, cost_for_minutes};
use crate::application::ports::{
    AudioPayload, OwnerStats, RepositoryError, StagingStore, StagingStoreError,
    TranscriptRepository, TranscriptionEngine, TranscriptionError,
};
use crate::domain::{LANGUAGE_AUTO, StagedPath, Transcript, TranscriptId, UserId};

/// One uploaded audio file. `language` of `None` (or the `auto` sentinel at
/// the API layer) means the provider auto-detects.
pub struct UploadedAudio {
    pub data: Bytes,
    pub filename: String,
    pub content_type: String,
    pub language: Option<String>,
}

/// Duration probe over the staged bytes. Returns seconds, or `None` when
/// the container is unreadable or reports a non-finite value.
pub type DurationProbe = dyn Fn(&[u8]) -> Option<f64> + Send + Sync;

pub struct TranscriptionService {
    engine: Arc<dyn TranscriptionEngine>,
    staging: Arc<dyn StagingStore>,
    transcripts: Arc<dyn TranscriptRepository>,
    probe: Box<DurationProbe>,
    rates: BillingRates,
}

impl TranscriptionService {
    pub fn new(
        engine: Arc<dyn TranscriptionEngine>,
        staging: Arc<dyn StagingStore>,
        transcripts: Arc<dyn TranscriptRepository>,
        probe: Box<DurationProbe>,
        rates: BillingRates,
    ) -> Self {
        Self {
            engine,
            staging,
            transcripts,
            probe,
            rates,
        }
    }

    /// The ingestion pipeline: stage, measure, recognize, price, persist.
    /// The staged file is removed on every exit path; removal failure is
    /// logged and never propagated.
    #[tracing::instrument(skip(self, upload), fields(filename = %upload.filename))]
    pub async fn ingest(
        &self,
        owner_id: UserId,
        upload: UploadedAudio,
    ) -> Result<Transcript, IngestError> {
        let started = Instant::now();
        let staged = StagedPath::new(&upload.filename, Utc::now());
        let file_size = self.staging.store(&staged, upload.data.clone()).await?;

        let outcome = self
            .recognize_and_persist(owner_id, &upload, file_size, started)
            .await;

        self.discard_staged(&staged).await;
        outcome
    }

    async fn recognize_and_persist(
        &self,
        owner_id: UserId,
        upload: &UploadedAudio,
        file_size: u64,
        started: Instant,
    ) -> Result<Transcript, IngestError> {
        // Each request works from its own copy of the staged bytes, so
        // concurrent uploads can never contaminate one another.
        let data = &upload.data;

        let duration_seconds = (self.probe)(data).unwrap_or(0.0);
        tracing::debug!(duration_seconds, bytes = data.len(), "Audio staged and measured");

        let language = upload
            .language
            .as_deref()
            .filter(|l| !l.is_empty() && *l != LANGUAGE_AUTO);

        let text = self
            .engine
            .transcribe(
                AudioPayload {
                    data,
                    filename: &upload.filename,
                    content_type: &upload.content_type,
                },
                language,
            )
            .await?;

        let minutes = billable_minutes(duration_seconds);
        let cost = cost_for_minutes(minutes, &self.rates);

        let transcript = Transcript::from_audio(
            owner_id,
            text,
            upload.filename.clone(),
            language.unwrap_or(LANGUAGE_AUTO).to_string(),
            minutes,
            cost,
            file_size,
            started.elapsed().as_secs(),
            Utc::now(),
        );
        self.transcripts.create(&transcript).await?;

        tracing::info!(
            transcript_id = %transcript.id,
            minutes,
            cost,
            "Transcript persisted"
        );
        Ok(transcript)
    }

    /// Direct "save text" entry: zero duration, zero cost.
    pub async fn save_direct(&self, owner_id: UserId, text: &str) -> Result<Transcript, IngestError> {
        if text.trim().is_empty() {
            return Err(IngestError::EmptyText);
        }
        let transcript = Transcript::direct(owner_id, text.to_string(), Utc::now());
        self.transcripts.create(&transcript).await?;
        Ok(transcript)
    }

    pub async fn list_for_owner(&self, owner_id: UserId) -> Result<Vec<Transcript>, IngestError> {
        Ok(self.transcripts.list_by_owner(owner_id).await?)
    }

    /// `false` covers both an unknown id and a foreign owner; the caller
    /// cannot tell them apart.
    pub async fn delete_for_owner(
        &self,
        id: TranscriptId,
        owner_id: UserId,
    ) -> Result<bool, IngestError> {
        Ok(self.transcripts.delete_for_owner(id, owner_id).await?)
    }

    pub async fn profile_stats(
        &self,
        owner_id: UserId,
    ) -> Result<(OwnerStats, Vec<Transcript>), IngestError> {
        let stats = self.transcripts.stats_for_owner(owner_id).await?;
        let recent = self.transcripts.recent_for_owner(owner_id, 5).await?;
        Ok((stats, recent))
    }

    async fn discard_staged(&self, staged: &StagedPath) {
        if let Err(e) = self.staging.delete(staged).await {
            tracing::warn!(path = %staged, error = %e, "Staged file cleanup failed");
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("transcription text is required")]
    EmptyText,
    #[error("staging: {0}")]
    Staging(#[from] StagingStoreError),
    #[error("recognition: {0}")]
    Recognition(#[from] TranscriptionError),
    #[error("storage: {0}")]
    Storage(#[from] RepositoryError),
}
