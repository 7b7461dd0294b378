use std::io;

use bytes::Bytes;

use crate::domain::StagedPath;

/// Temporary storage for uploaded audio, scoped to one ingestion request.
/// Every staged file is removed (best-effort) on every exit path.
#[async_trait::async_trait]
pub trait StagingStore: Send + Sync {
    async fn store(&self, path: &StagedPath, data: Bytes) -> Result<u64, StagingStoreError>;

    async fn delete(&self, path: &StagedPath) -> Result<(), StagingStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StagingStoreError {
    #[error("upload failed: {0}")]
    UploadFailed(String),
    #[error("delete failed: {0}")]
    DeleteFailed(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
