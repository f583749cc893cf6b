use super::CacheStore;
use crate::core::error::{CacheError, CacheResult};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;
use tracing::debug;

/// Snapshot store backed by a directory, one file per key.
///
/// Writes go through a temp file in the same directory and are renamed over
/// the target, so a crash mid-write never leaves a torn snapshot behind.
pub struct DiskCacheStore {
    dir: PathBuf,
}

impl DiskCacheStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> CacheResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| CacheError::Io(format!("failed to create cache directory: {e}")))?;
        Ok(Self { dir })
    }

    // Injective mapping from keys to filenames: every byte outside the
    // filename-safe set (including '_', the escape prefix) becomes _XX.
    fn path_for(&self, key: &str) -> PathBuf {
        let mut name = String::with_capacity(key.len());
        for byte in key.bytes() {
            match byte {
                b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'.' => {
                    name.push(byte as char);
                }
                _ => name.push_str(&format!("_{byte:02X}")),
            }
        }
        self.dir.join(format!("{name}.snapshot"))
    }
}

impl CacheStore for DiskCacheStore {
    fn put(&self, key: &str, blob: &[u8]) -> CacheResult<()> {
        let mut tmp = NamedTempFile::new_in(&self.dir)
            .map_err(|e| CacheError::Io(format!("failed to create temp file: {e}")))?;
        tmp.write_all(blob)
            .map_err(|e| CacheError::Io(format!("failed to write snapshot: {e}")))?;
        tmp.persist(self.path_for(key))
            .map_err(|e| CacheError::Io(format!("failed to persist snapshot: {e}")))?;
        debug!(key, bytes = blob.len(), "snapshot written");
        Ok(())
    }

    fn exists(&self, key: &str) -> bool {
        self.path_for(key).exists()
    }

    fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        fs::read(&path)
            .map(Some)
            .map_err(|e| CacheError::Io(format!("failed to read snapshot: {e}")))
    }
}
