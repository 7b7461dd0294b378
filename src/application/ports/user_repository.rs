use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::{User, UserId};

/// Persisted user records. `find_by_email` expects an already-normalized
/// (lowercased) address; duplicate emails surface as `ConstraintViolation`.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;

    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>, RepositoryError>;

    /// Full-record save; the single-row write is atomic.
    async fn update(&self, user: &User) -> Result<(), RepositoryError>;
}
