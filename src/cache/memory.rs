use super::CacheStore;
use crate::core::error::CacheResult;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// In-memory snapshot store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryCacheStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryCacheStore {
    fn put(&self, key: &str, blob: &[u8]) -> CacheResult<()> {
        self.blobs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), blob.to_vec());
        Ok(())
    }

    fn exists(&self, key: &str) -> bool {
        self.blobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        Ok(self
            .blobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }
}
