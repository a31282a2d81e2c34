//! Disk-backed icon store for persistence across sessions.
//!
//! Content-addressable: each key maps to `<dir>/<sha256(key)>.img` holding
//! the raw originally-fetched bytes. There is no manifest and no expiry;
//! presence on disk is inferred from the filesystem. The store is an
//! optimization, so every failure past construction degrades to a miss.

use std::path::PathBuf;

use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::{debug, trace, warn};

use crate::domain::entities::IconKey;
use crate::domain::errors::{IconError, IconResult};

/// Persistent store of raw icon payloads, one file per key.
#[derive(Debug, Clone)]
pub struct IconDiskCache {
    dir: PathBuf,
}

impl IconDiskCache {
    /// Creates a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    /// Returns [`IconError::Setup`] if the directory cannot be created.
    pub async fn new(dir: PathBuf) -> IconResult<Self> {
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| IconError::Setup(format!("failed to create cache dir: {e}")))?;
        Ok(Self { dir })
    }

    /// Deterministic path for a key's payload.
    #[must_use]
    pub fn path_for(&self, key: &IconKey) -> PathBuf {
        let digest = Sha256::digest(key.as_str().as_bytes());
        self.dir.join(format!("{}.img", hex::encode(digest)))
    }

    /// Reads a key's payload, returning `None` if absent or unreadable.
    pub async fn read(&self, key: &IconKey) -> Option<Vec<u8>> {
        let path = self.path_for(key);
        match fs::read(&path).await {
            Ok(bytes) => {
                trace!(key = %key, path = %path.display(), "disk cache hit");
                Some(bytes)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                trace!(key = %key, "disk cache miss");
                None
            }
            Err(e) => {
                warn!(key = %key, error = %e, "disk cache read failed");
                None
            }
        }
    }

    /// Writes a key's payload through a temporary sibling and an atomic
    /// rename, so readers never observe a torn file.
    ///
    /// # Errors
    /// Returns [`IconError::DiskWriteFailed`] on any I/O failure; the
    /// temporary file is removed best-effort first.
    pub async fn write(&self, key: &IconKey, bytes: &[u8]) -> IconResult<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("img.tmp");

        let result = async {
            fs::write(&tmp, bytes).await?;
            fs::rename(&tmp, &path).await
        }
        .await;

        if let Err(e) = result {
            let _ = fs::remove_file(&tmp).await;
            return Err(IconError::DiskWriteFailed(e.to_string()));
        }

        debug!(key = %key, path = %path.display(), size = bytes.len(), "stored icon on disk");
        Ok(())
    }

    /// Returns true if a payload exists for the key.
    pub async fn contains(&self, key: &IconKey) -> bool {
        fs::try_exists(&self.path_for(key)).await.unwrap_or(false)
    }

    /// Removes every stored payload.
    pub async fn clear(&self) {
        let Ok(mut entries) = fs::read_dir(&self.dir).await else {
            return;
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "img")
                && fs::remove_file(&path).await.is_err()
            {
                warn!(path = %path.display(), "failed to remove cache file");
            }
        }
        debug!("cleared disk cache");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_cache() -> (IconDiskCache, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let cache = IconDiskCache::new(temp_dir.path().to_path_buf())
            .await
            .unwrap();
        (cache, temp_dir)
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let (cache, _temp) = create_test_cache().await;
        let key = IconKey::new("dm:1:aa");

        cache.write(&key, b"icon payload").await.unwrap();
        assert_eq!(cache.read(&key).await.unwrap(), b"icon payload");
    }

    #[tokio::test]
    async fn test_read_miss() {
        let (cache, _temp) = create_test_cache().await;
        assert!(cache.read(&IconKey::new("nope")).await.is_none());
    }

    #[tokio::test]
    async fn test_path_is_stable_and_key_addressed() {
        let (cache, _temp) = create_test_cache().await;
        let key = IconKey::new("guild:41771983423143937:86e39f7a");

        assert_eq!(cache.path_for(&key), cache.path_for(&key));
        assert_ne!(cache.path_for(&key), cache.path_for(&IconKey::new("other")));
        assert!(
            cache
                .path_for(&key)
                .extension()
                .is_some_and(|ext| ext == "img")
        );
    }

    #[tokio::test]
    async fn test_write_replaces_atomically() {
        let (cache, _temp) = create_test_cache().await;
        let key = IconKey::new("dm:1:aa");

        cache.write(&key, b"first").await.unwrap();
        cache.write(&key, b"second").await.unwrap();

        assert_eq!(cache.read(&key).await.unwrap(), b"second");
        // no temp files left behind
        let mut entries = fs::read_dir(cache.dir.clone()).await.unwrap();
        while let Ok(Some(entry)) = entries.next_entry().await {
            assert!(entry.path().extension().is_some_and(|ext| ext == "img"));
        }
    }

    #[tokio::test]
    async fn test_contains_and_clear() {
        let (cache, _temp) = create_test_cache().await;
        let key = IconKey::new("dm:1:aa");

        cache.write(&key, b"payload").await.unwrap();
        assert!(cache.contains(&key).await);

        cache.clear().await;
        assert!(!cache.contains(&key).await);
    }
}
