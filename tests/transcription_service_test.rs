use std::sync::Arc;

use bytes::Bytes;

use speechai::application::ports::{StagingStore, TranscriptRepository, TranscriptionEngine};
use speechai::application::services::{
    BillingRates, IngestError, TranscriptionService, UploadedAudio,
};
use speechai::domain::UserId;
use speechai::infrastructure::audio::{FailingTranscriptionEngine, MockTranscriptionEngine};
use speechai::infrastructure::persistence::MemoryTranscriptRepository;
use speechai::infrastructure::storage::MemoryStagingStore;

struct Harness {
    service: TranscriptionService,
    staging: Arc<MemoryStagingStore>,
    transcripts: Arc<MemoryTranscriptRepository>,
}

fn harness(engine: Arc<dyn TranscriptionEngine>, probed_seconds: Option<f64>) -> Harness {
    let staging = Arc::new(MemoryStagingStore::new());
    let transcripts = Arc::new(MemoryTranscriptRepository::new());
    let service = TranscriptionService::new(
        engine,
        Arc::clone(&staging) as Arc<dyn StagingStore>,
        Arc::clone(&transcripts) as Arc<dyn TranscriptRepository>,
        Box::new(move |_| probed_seconds),
        BillingRates::default(),
    );
    Harness {
        service,
        staging,
        transcripts,
    }
}

fn upload(language: Option<&str>) -> UploadedAudio {
    UploadedAudio {
        data: Bytes::from_static(b"fake audio bytes"),
        filename: "note.m4a".to_string(),
        content_type: "audio/mp4".to_string(),
        language: language.map(str::to_string),
    }
}

#[tokio::test]
async fn given_125_second_file_when_ingesting_then_three_minutes_and_2_27() {
    let h = harness(
        Arc::new(MockTranscriptionEngine::returning("hello world")),
        Some(125.0),
    );
    let owner = UserId::new();

    let transcript = h.service.ingest(owner, upload(None)).await.unwrap();

    assert_eq!(transcript.duration_minutes, 3);
    assert_eq!(transcript.cost, 2.27);
    assert_eq!(transcript.text, "hello world");
    assert_eq!(transcript.filename.as_deref(), Some("note.m4a"));
    assert_eq!(transcript.language, "auto");
    assert_eq!(transcript.file_size_bytes, Some(16));
    assert_eq!(h.staging.staged_count(), 0, "staged file must be cleaned up");
}

#[tokio::test]
async fn given_unreadable_file_when_ingesting_then_one_minute_still_billed() {
    let h = harness(Arc::new(MockTranscriptionEngine::returning("")), None);

    let transcript = h.service.ingest(UserId::new(), upload(None)).await.unwrap();

    // Duration extraction failed -> 0 seconds -> 1 billable minute.
    assert_eq!(transcript.duration_minutes, 1);
    assert_eq!(transcript.cost, 0.76);
    assert_eq!(transcript.text, "");
    assert!(transcript.cost.is_finite());
}

#[tokio::test]
async fn given_language_hint_when_ingesting_then_stored_and_auto_is_omitted() {
    let h = harness(Arc::new(MockTranscriptionEngine::returning("hei")), Some(10.0));

    let with_hint = h
        .service
        .ingest(UserId::new(), upload(Some("no")))
        .await
        .unwrap();
    assert_eq!(with_hint.language, "no");

    let auto = h
        .service
        .ingest(UserId::new(), upload(Some("auto")))
        .await
        .unwrap();
    assert_eq!(auto.language, "auto");
}

#[tokio::test]
async fn given_provider_failure_when_ingesting_then_error_and_staging_cleaned() {
    let h = harness(Arc::new(FailingTranscriptionEngine), Some(30.0));
    let owner = UserId::new();

    let err = h.service.ingest(owner, upload(None)).await.unwrap_err();

    assert!(matches!(err, IngestError::Recognition(_)));
    assert_eq!(h.staging.staged_count(), 0, "cleanup must run on failure too");
    assert!(h
        .transcripts
        .list_by_owner(owner)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn given_two_uploads_when_ingesting_then_records_are_independent() {
    let h = harness(
        Arc::new(MockTranscriptionEngine::returning("text")),
        Some(61.0),
    );
    let owner = UserId::new();

    let first = h.service.ingest(owner, upload(None)).await.unwrap();
    let second = h.service.ingest(owner, upload(None)).await.unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(first.duration_minutes, 2);
    assert_eq!(second.duration_minutes, 2);
    assert_eq!(first.cost, second.cost);

    let listed = h.transcripts.list_by_owner(owner).await.unwrap();
    assert_eq!(listed.len(), 2);
}

#[tokio::test]
async fn given_blank_text_when_saving_directly_then_rejected() {
    let h = harness(Arc::new(MockTranscriptionEngine::returning("")), None);

    let err = h
        .service
        .save_direct(UserId::new(), "   ")
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::EmptyText));
}

#[tokio::test]
async fn given_direct_save_when_listing_then_zero_cost_record_present() {
    let h = harness(Arc::new(MockTranscriptionEngine::returning("")), None);
    let owner = UserId::new();

    let saved = h.service.save_direct(owner, "typed up notes").await.unwrap();
    assert_eq!(saved.duration_minutes, 0);
    assert_eq!(saved.cost, 0.0);

    let listed = h.service.list_for_owner(owner).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].text, "typed up notes");
}

#[tokio::test]
async fn given_foreign_record_when_deleting_then_not_found_and_record_survives() {
    let h = harness(
        Arc::new(MockTranscriptionEngine::returning("text")),
        Some(5.0),
    );
    let owner = UserId::new();
    let intruder = UserId::new();

    let transcript = h.service.ingest(owner, upload(None)).await.unwrap();

    let deleted = h
        .service
        .delete_for_owner(transcript.id, intruder)
        .await
        .unwrap();
    assert!(!deleted);
    assert_eq!(h.service.list_for_owner(owner).await.unwrap().len(), 1);

    let deleted = h.service.delete_for_owner(transcript.id, owner).await.unwrap();
    assert!(deleted);
    assert!(h.service.list_for_owner(owner).await.unwrap().is_empty());
}

#[tokio::test]
async fn given_mixed_records_when_aggregating_then_stats_cover_owner_only() {
    let h = harness(
        Arc::new(MockTranscriptionEngine::returning("text")),
        Some(125.0),
    );
    let owner = UserId::new();
    let other = UserId::new();

    h.service.ingest(owner, upload(None)).await.unwrap();
    h.service.ingest(owner, upload(None)).await.unwrap();
    h.service.save_direct(owner, "typed").await.unwrap();
    h.service.ingest(other, upload(None)).await.unwrap();

    let (stats, recent) = h.service.profile_stats(owner).await.unwrap();

    assert_eq!(stats.total_count, 3);
    assert_eq!(stats.total_minutes, 6);
    assert!((stats.total_cost - 4.54).abs() < 1e-9);
    assert_eq!(stats.month_count, 3);
    assert_eq!(recent.len(), 3);
}
