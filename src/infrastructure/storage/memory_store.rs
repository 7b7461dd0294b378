use std::collections::HashMap;
use std::sync::Mutex;

use bytes::Bytes;

use crate::application::ports::{StagingStore, StagingStoreError};
use crate::domain::StagedPath;

/// In-memory staging for tests. Exposes the live object count so tests can
/// assert that the pipeline cleaned up after itself.
#[derive(Default)]
pub struct MemoryStagingStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStagingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn staged_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl StagingStore for MemoryStagingStore {
    async fn store(&self, path: &StagedPath, data: Bytes) -> Result<u64, StagingStoreError> {
        let size = data.len() as u64;
        self.objects
            .lock()
            .unwrap()
            .insert(path.as_str().to_string(), data.to_vec());
        Ok(size)
    }

    async fn delete(&self, path: &StagedPath) -> Result<(), StagingStoreError> {
        self.objects.lock().unwrap().remove(path.as_str());
        Ok(())
    }
}
