/// Shared failure vocabulary for the persistence ports (users,
/// transcripts, sessions).
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("database connection failed: {0}")]
    ConnectionFailed(String),
    #[error("query failed: {0}")]
    QueryFailed(String),
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("uniqueness violated: {0}")]
    ConstraintViolation(String),
}
