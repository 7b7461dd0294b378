use chrono::{DateTime, Utc};

use super::{TranscriptId, UserId};

/// Sentinel language meaning the provider auto-detected (or no recognition
/// ran at all, for direct text saves).
pub const LANGUAGE_AUTO: &str = "auto";

/// A persisted transcript, owned by exactly one user. Created either by the
/// audio ingestion pipeline or by a direct text save; immutable afterwards.
#[derive(Debug, Clone)]
pub struct Transcript {
    pub id: TranscriptId,
    pub owner_id: UserId,
    pub text: String,
    pub filename: Option<String>,
    pub language: String,
    /// Whole billable minutes; >= 1 for audio-pipeline records, 0 for
    /// direct saves.
    pub duration_minutes: u32,
    /// Display-currency cost, rounded to 2 decimal places, never NaN.
    pub cost: f64,
    pub file_size_bytes: Option<u64>,
    pub processing_seconds: Option<u64>,
    pub created_at: DateTime<Utc>,
}

impl Transcript {
    /// A record produced by the ingestion pipeline. Cost and duration are
    /// normalized so that no NaN or negative value is ever persisted.
    #[allow(clippy::too_many_arguments)]
    pub fn from_audio(
        owner_id: UserId,
        text: String,
        filename: String,
        language: String,
        duration_minutes: u32,
        cost: f64,
        file_size_bytes: u64,
        processing_seconds: u64,
        now: DateTime<Utc>,
    ) -> Self {
        let cost = if cost.is_finite() && cost >= 0.0 { cost } else { 0.0 };
        Self {
            id: TranscriptId::new(),
            owner_id,
            text,
            filename: Some(filename),
            language,
            duration_minutes,
            cost,
            file_size_bytes: Some(file_size_bytes),
            processing_seconds: Some(processing_seconds),
            created_at: now,
        }
    }

    /// A zero-duration, zero-cost record for text that never went through
    /// the audio pipeline.
    pub fn direct(owner_id: UserId, text: String, now: DateTime<Utc>) -> Self {
        Self {
            id: TranscriptId::new(),
            owner_id,
            text,
            filename: None,
            language: LANGUAGE_AUTO.to_string(),
            duration_minutes: 0,
            cost: 0.0,
            file_size_bytes: None,
            processing_seconds: None,
            created_at: now,
        }
    }
}
