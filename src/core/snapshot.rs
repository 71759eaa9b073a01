//! Report snapshot storage.
//!
//! Snapshots are CSV exports saved under a fixed prefix in an object store so they
//! can be listed and downloaded later. The store itself sits behind [`ObjectStore`];
//! [`FsObjectStore`] keeps objects as files below a root directory.

use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Location of report snapshots inside the object store.
pub const REPORTS_PREFIX: &str = "private/claims-reports/";

/// Marker object some stores create for empty folders; never listed.
pub const PLACEHOLDER_NAME: &str = ".emptyFolderPlaceholder";

/// Maximum number of snapshots returned by [`list_snapshots`].
pub const LIST_LIMIT: usize = 100;

/// A single stored object, as reported by a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Object name relative to the listed prefix
    pub name: String,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
    /// Size in bytes
    pub size: u64,
}

/// Minimal object store used for report snapshots.
#[allow(async_fn_in_trait)]
pub trait ObjectStore {
    /// Writes `bytes` at `key`, replacing any existing object.
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// Reads the object at `key`, or `None` if it doesn't exist.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Lists objects directly under `prefix`, in no particular order.
    async fn list(&self, prefix: &str) -> Result<Vec<StoredObject>>;
}

/// Object store backed by a local directory tree.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    /// Creates a store rooted at `root`. The directory is created lazily on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the store.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key.trim_start_matches('/'))
    }
}

impl ObjectStore for FsObjectStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.path_for(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<StoredObject>> {
        let dir = self.path_for(prefix);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut objects = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let updated_at = metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
            objects.push(StoredObject {
                name: entry.file_name().to_string_lossy().into_owned(),
                updated_at,
                size: metadata.len(),
            });
        }
        Ok(objects)
    }
}

fn snapshot_key(filename: &str) -> Result<String> {
    let name = filename.trim();
    if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(Error::validation(format!("Invalid snapshot name '{filename}'")));
    }
    Ok(format!("{REPORTS_PREFIX}{name}"))
}

/// Saves CSV text as a snapshot named `filename`, overwriting an existing one.
///
/// Empty CSV means there was nothing to report and is rejected.
#[instrument(skip(store, csv))]
pub async fn save_snapshot<S: ObjectStore>(store: &S, filename: &str, csv: &str) -> Result<()> {
    if csv.is_empty() {
        return Err(Error::validation("No report data available to upload"));
    }
    let key = snapshot_key(filename)?;
    store.put(&key, csv.as_bytes()).await?;
    info!("Saved report snapshot {key} ({} bytes)", csv.len());
    Ok(())
}

/// Lists saved snapshots, most recently updated first, capped at [`LIST_LIMIT`].
pub async fn list_snapshots<S: ObjectStore>(store: &S) -> Result<Vec<StoredObject>> {
    let mut objects: Vec<StoredObject> = store
        .list(REPORTS_PREFIX)
        .await?
        .into_iter()
        .filter(|o| o.name != PLACEHOLDER_NAME)
        .collect();
    objects.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.name.cmp(&b.name)));
    objects.truncate(LIST_LIMIT);
    debug!("Found {} report snapshots", objects.len());
    Ok(objects)
}

/// Fetches a snapshot's CSV content by name.
pub async fn download_snapshot<S: ObjectStore>(store: &S, filename: &str) -> Result<String> {
    let key = snapshot_key(filename)?;
    let bytes = store
        .get(&key)
        .await?
        .ok_or_else(|| Error::SnapshotNotFound {
            name: filename.to_string(),
        })?;
    if bytes.is_empty() {
        return Err(Error::Storage {
            message: format!("Snapshot {filename} is empty"),
        });
    }
    String::from_utf8(bytes).map_err(|e| Error::Storage {
        message: format!("Snapshot {filename} is not valid UTF-8: {e}"),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use std::time::{Duration, SystemTime};

    struct TempStore {
        store: FsObjectStore,
    }

    impl TempStore {
        fn new() -> Self {
            let root = std::env::temp_dir().join(format!("claims-buddy-{}", uuid::Uuid::new_v4()));
            Self {
                store: FsObjectStore::new(root),
            }
        }

        fn set_modified(&self, name: &str, secs_after_epoch: u64) {
            let path = self.store.path_for(&format!("{REPORTS_PREFIX}{name}"));
            let file = std::fs::File::options().write(true).open(path).unwrap();
            file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs_after_epoch))
                .unwrap();
        }
    }

    impl Drop for TempStore {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(self.store.root());
        }
    }

    #[tokio::test]
    async fn test_save_then_download() -> Result<()> {
        let temp = TempStore::new();
        save_snapshot(&temp.store, "claims-report-2026-10-19.csv", "a,b\n1,2").await?;

        let csv = download_snapshot(&temp.store, "claims-report-2026-10-19.csv").await?;
        assert_eq!(csv, "a,b\n1,2");
        Ok(())
    }

    #[tokio::test]
    async fn test_save_overwrites_existing() -> Result<()> {
        let temp = TempStore::new();
        save_snapshot(&temp.store, "report.csv", "first").await?;
        save_snapshot(&temp.store, "report.csv", "second").await?;

        assert_eq!(download_snapshot(&temp.store, "report.csv").await?, "second");
        assert_eq!(list_snapshots(&temp.store).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_save_rejects_empty_csv() {
        let temp = TempStore::new();
        let result = save_snapshot(&temp.store, "report.csv", "").await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert!(list_snapshots(&temp.store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_names_cannot_escape_prefix() {
        let temp = TempStore::new();
        for name in ["../secret.csv", "nested/report.csv", "", ".."] {
            let result = save_snapshot(&temp.store, name, "x").await;
            assert!(matches!(result, Err(Error::Validation { .. })), "{name}");
        }
    }

    #[tokio::test]
    async fn test_download_missing_snapshot() {
        let temp = TempStore::new();
        let result = download_snapshot(&temp.store, "nope.csv").await;
        assert!(matches!(result, Err(Error::SnapshotNotFound { ref name }) if name == "nope.csv"));
    }

    #[tokio::test]
    async fn test_download_empty_blob_is_a_storage_error() -> Result<()> {
        let temp = TempStore::new();
        temp.store.put(&format!("{REPORTS_PREFIX}blank.csv"), b"").await?;

        let result = download_snapshot(&temp.store, "blank.csv").await;
        assert!(matches!(result, Err(Error::Storage { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_orders_newest_first_and_skips_placeholder() -> Result<()> {
        let temp = TempStore::new();
        save_snapshot(&temp.store, "old.csv", "1").await?;
        save_snapshot(&temp.store, "new.csv", "22").await?;
        save_snapshot(&temp.store, "middle.csv", "333").await?;
        temp.store
            .put(&format!("{REPORTS_PREFIX}{PLACEHOLDER_NAME}"), b"")
            .await?;
        temp.set_modified("old.csv", 1_000);
        temp.set_modified("middle.csv", 2_000);
        temp.set_modified("new.csv", 3_000);

        let listed = list_snapshots(&temp.store).await?;
        let names: Vec<&str> = listed.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["new.csv", "middle.csv", "old.csv"]);
        assert_eq!(listed[1].size, 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_is_capped() -> Result<()> {
        let temp = TempStore::new();
        for i in 0..(LIST_LIMIT + 5) {
            save_snapshot(&temp.store, &format!("report-{i:03}.csv"), "x").await?;
        }
        assert_eq!(list_snapshots(&temp.store).await?.len(), LIST_LIMIT);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_empty_store() -> Result<()> {
        let temp = TempStore::new();
        assert!(list_snapshots(&temp.store).await?.is_empty());
        Ok(())
    }
}
