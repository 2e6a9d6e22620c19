//! JSON file progress store
//!
//! One file per (learner, course) pair under a root directory. Writes go to
//! a temporary file first and are renamed into place so a crash mid-write
//! never leaves a truncated snapshot behind.

use async_trait::async_trait;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use super::{ProgressStore, StoreError, StoreKey, StoredSnapshot};
use crate::snapshot::ProgressSnapshot;

/// Progress store writing pretty-printed JSON files.
pub struct JsonFileProgressStore {
    root_dir: PathBuf,
}

impl JsonFileProgressStore {
    /// Create a store rooted at the given directory, creating it if needed.
    pub async fn new<P: AsRef<Path>>(root_dir: P) -> Result<Self, StoreError> {
        let root_dir = root_dir.as_ref().to_path_buf();

        fs::create_dir_all(&root_dir).await?;

        info!(path = %root_dir.display(), "Initialized progress file store");

        Ok(Self { root_dir })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// File holding the snapshot for a key.
    pub fn path_for(&self, key: &StoreKey) -> PathBuf {
        self.root_dir.join(format!(
            "{}__{}.json",
            encode_component(key.learner_id()),
            encode_component(key.course_id().as_str())
        ))
    }
}

/// Escape everything outside `[A-Za-z0-9.-]` as `%XX` so that keys map to
/// distinct, path-safe file names. `_` is escaped too; `__` separates parts.
fn encode_component(raw: &str) -> String {
    let mut encoded = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'.' {
            encoded.push(byte as char);
        } else {
            let _ = write!(encoded, "%{byte:02X}");
        }
    }
    encoded
}

#[async_trait]
impl ProgressStore for JsonFileProgressStore {
    fn id(&self) -> &str {
        "json-file"
    }

    async fn load(&self, key: &StoreKey) -> Result<Option<StoredSnapshot>, StoreError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path).await {
            Ok(raw) => Ok(Some(StoredSnapshot::new(raw))),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn save(&self, key: &StoreKey, snapshot: &ProgressSnapshot) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let tmp_path = path.with_extension("json.tmp");
        let json = snapshot.to_json_pretty()?;

        fs::write(&tmp_path, json.as_bytes()).await?;
        fs::rename(&tmp_path, &path).await?;

        debug!(key = %key, path = %path.display(), "Wrote progress snapshot");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curriculum::{CourseProvider, PianoFundamentals};

    #[test]
    fn test_encode_component() {
        assert_eq!(encode_component("ada-1.x"), "ada-1.x");
        assert_eq!(encode_component("a_b"), "a%5Fb");
        assert_eq!(encode_component("../etc"), "..%2Fetc");
        assert_eq!(encode_component("a b"), "a%20b");
    }

    #[tokio::test]
    async fn test_roundtrip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileProgressStore::new(dir.path().join("progress")).await.unwrap();
        let key = StoreKey::new("user@example.com", "piano-fundamentals");
        let curriculum = PianoFundamentals.definition().unwrap();
        let mut snapshot = ProgressSnapshot::empty(&curriculum);
        snapshot.insert_scale(&"C Major".into());

        assert!(store.load(&key).await.unwrap().is_none());

        store.save(&key, &snapshot).await.unwrap();

        let path = store.path_for(&key);
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "user%40example.com__piano-fundamentals.json"
        );

        let loaded = store.load(&key).await.unwrap().unwrap().parse().unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileProgressStore::new(dir.path()).await.unwrap();

        let a = store.path_for(&StoreKey::new("a__b", "c"));
        let b = store.path_for(&StoreKey::new("a", "b__c"));
        assert_ne!(a, b);
    }
}
