use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::RepositoryError;
use crate::domain::{AuthSession, SessionToken};

/// Server-side session records keyed by the opaque cookie token.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, session: &AuthSession) -> Result<(), RepositoryError>;

    async fn get(&self, token: &SessionToken) -> Result<Option<AuthSession>, RepositoryError>;

    /// Sliding expiry: push the deadline forward on successful resolution.
    async fn extend(
        &self,
        token: &SessionToken,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;

    /// Idempotent; removing an unknown token succeeds.
    async fn remove(&self, token: &SessionToken) -> Result<(), RepositoryError>;

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError>;
}
