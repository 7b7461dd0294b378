use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use crate::application::ports::{OwnerStats, RepositoryError, TranscriptRepository};
use crate::domain::{Transcript, TranscriptId, UserId};

pub struct PgTranscriptRepository {
    pool: PgPool,
}

impl PgTranscriptRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const TRANSCRIPT_COLUMNS: &str = "id, owner_id, text, filename, language, duration_minutes, \
     cost, file_size_bytes, processing_seconds, created_at";

fn query_failed(e: sqlx::Error) -> RepositoryError {
    RepositoryError::QueryFailed(e.to_string())
}

fn transcript_from_row(row: &PgRow) -> Result<Transcript, RepositoryError> {
    let duration_minutes: i64 = row.try_get("duration_minutes").map_err(query_failed)?;
    let file_size_bytes: Option<i64> = row.try_get("file_size_bytes").map_err(query_failed)?;
    let processing_seconds: Option<i64> =
        row.try_get("processing_seconds").map_err(query_failed)?;

    Ok(Transcript {
        id: TranscriptId::from_uuid(row.try_get("id").map_err(query_failed)?),
        owner_id: UserId::from_uuid(row.try_get("owner_id").map_err(query_failed)?),
        text: row.try_get("text").map_err(query_failed)?,
        filename: row.try_get("filename").map_err(query_failed)?,
        language: row.try_get("language").map_err(query_failed)?,
        duration_minutes: u32::try_from(duration_minutes).unwrap_or(0),
        cost: row.try_get("cost").map_err(query_failed)?,
        file_size_bytes: file_size_bytes.and_then(|v| u64::try_from(v).ok()),
        processing_seconds: processing_seconds.and_then(|v| u64::try_from(v).ok()),
        created_at: row.try_get("created_at").map_err(query_failed)?,
    })
}

#[async_trait]
impl TranscriptRepository for PgTranscriptRepository {
    #[instrument(skip(self, transcript), fields(transcript_id = %transcript.id))]
    async fn create(&self, transcript: &Transcript) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO transcripts (id, owner_id, text, filename, language, duration_minutes, \
             cost, file_size_bytes, processing_seconds, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(transcript.id.as_uuid())
        .bind(transcript.owner_id.as_uuid())
        .bind(&transcript.text)
        .bind(&transcript.filename)
        .bind(&transcript.language)
        .bind(i64::from(transcript.duration_minutes))
        .bind(transcript.cost)
        .bind(transcript.file_size_bytes.map(|v| v as i64))
        .bind(transcript.processing_seconds.map(|v| v as i64))
        .bind(transcript.created_at)
        .execute(&self.pool)
        .await
        .map_err(query_failed)?;

        Ok(())
    }

    #[instrument(skip(self), fields(owner_id = %owner_id))]
    async fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<Transcript>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM transcripts WHERE owner_id = $1 ORDER BY created_at DESC",
            TRANSCRIPT_COLUMNS
        ))
        .bind(owner_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(query_failed)?;

        rows.iter().map(transcript_from_row).collect()
    }

    #[instrument(skip(self), fields(transcript_id = %id, owner_id = %owner_id))]
    async fn delete_for_owner(
        &self,
        id: TranscriptId,
        owner_id: UserId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM transcripts WHERE id = $1 AND owner_id = $2")
            .bind(id.as_uuid())
            .bind(owner_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(query_failed)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(owner_id = %owner_id))]
    async fn stats_for_owner(&self, owner_id: UserId) -> Result<OwnerStats, RepositoryError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total_count, \
             COALESCE(SUM(cost), 0)::DOUBLE PRECISION AS total_cost, \
             COALESCE(SUM(duration_minutes), 0)::BIGINT AS total_minutes, \
             COUNT(*) FILTER (WHERE created_at >= date_trunc('month', now())) AS month_count \
             FROM transcripts WHERE owner_id = $1",
        )
        .bind(owner_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(query_failed)?;

        let total_count: i64 = row.try_get("total_count").map_err(query_failed)?;
        let total_cost: f64 = row.try_get("total_cost").map_err(query_failed)?;
        let total_minutes: i64 = row.try_get("total_minutes").map_err(query_failed)?;
        let month_count: i64 = row.try_get("month_count").map_err(query_failed)?;

        Ok(OwnerStats {
            total_count: total_count.max(0) as u64,
            total_cost,
            total_minutes: total_minutes.max(0) as u64,
            month_count: month_count.max(0) as u64,
        })
    }

    #[instrument(skip(self), fields(owner_id = %owner_id))]
    async fn recent_for_owner(
        &self,
        owner_id: UserId,
        limit: usize,
    ) -> Result<Vec<Transcript>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM transcripts WHERE owner_id = $1 ORDER BY created_at DESC LIMIT $2",
            TRANSCRIPT_COLUMNS
        ))
        .bind(owner_id.as_uuid())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(query_failed)?;

        rows.iter().map(transcript_from_row).collect()
    }
}
