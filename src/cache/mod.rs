pub mod disk;
pub mod memory;

pub use disk::DiskCacheStore;
pub use memory::MemoryCacheStore;

use crate::core::error::{CacheError, CacheResult};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Key/value persistence of serialized set snapshots.
///
/// Stores treat blobs as opaque; the snapshot format belongs to
/// [`SetSnapshot`]. A missing key is `None`/`false`, never an error.
pub trait CacheStore: Send + Sync {
    /// Write `blob` under `key`, replacing any previous snapshot.
    fn put(&self, key: &str, blob: &[u8]) -> CacheResult<()>;

    /// Whether a snapshot exists under `key`. No deserialization.
    fn exists(&self, key: &str) -> bool;

    /// The blob stored under `key`, or `None`.
    fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;
}

pub const SNAPSHOT_VERSION: u32 = 1;

/// Durable form of a set's contents and pagination bookkeeping.
///
/// The query descriptor is deliberately not part of the snapshot: the cache
/// key and the descriptor shape are jointly managed by the caller, and a
/// snapshot loaded for a since-changed query is not detected here.
#[derive(Debug, Serialize, Deserialize)]
pub struct SetSnapshot<T> {
    pub version: u32,
    pub items: Vec<T>,
    pub last_fetched_page: u32,
    pub total_pages: u32,
    /// Unix millis at snapshot time.
    pub created_at: i64,
}

impl<T: Serialize + DeserializeOwned> SetSnapshot<T> {
    pub fn new(items: Vec<T>, last_fetched_page: u32, total_pages: u32) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            items,
            last_fetched_page,
            total_pages,
            created_at: Utc::now().timestamp_millis(),
        }
    }

    /// MessagePack-encode for storage.
    pub fn encode(&self) -> CacheResult<Vec<u8>> {
        rmp_serde::to_vec(self).map_err(|e| CacheError::Encode(e.to_string()))
    }

    /// Decode a stored blob, rejecting snapshots from an unknown format
    /// version.
    pub fn decode(blob: &[u8]) -> CacheResult<Self> {
        let snapshot: Self =
            rmp_serde::from_slice(blob).map_err(|e| CacheError::Decode(e.to_string()))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(CacheError::UnsupportedVersion(snapshot.version));
        }
        Ok(snapshot)
    }
}
