use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::{Transcript, TranscriptId, UserId};

/// Owner-scoped aggregates for the profile view.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OwnerStats {
    pub total_count: u64,
    pub total_cost: f64,
    pub total_minutes: u64,
    /// Records created since the start of the current calendar month.
    pub month_count: u64,
}

#[async_trait]
pub trait TranscriptRepository: Send + Sync {
    async fn create(&self, transcript: &Transcript) -> Result<(), RepositoryError>;

    /// All records for the owner, newest first.
    async fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<Transcript>, RepositoryError>;

    /// Deletes only when the record belongs to `owner_id`. Returns `false`
    /// both for an unknown id and for a foreign-owned record, so the caller
    /// cannot distinguish the two.
    async fn delete_for_owner(
        &self,
        id: TranscriptId,
        owner_id: UserId,
    ) -> Result<bool, RepositoryError>;

    async fn stats_for_owner(&self, owner_id: UserId) -> Result<OwnerStats, RepositoryError>;

    async fn recent_for_owner(
        &self,
        owner_id: UserId,
        limit: usize,
    ) -> Result<Vec<Transcript>, RepositoryError>;
}
