//! Snapshot persister: whole-repository JSON image on disk.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::Span;

use metrix_core::error::{MetrixError, Result};
use metrix_core::RepositorySnapshot;

use crate::storage::MetricRepository;

pub struct Persister {
    repo: Arc<dyn MetricRepository>,
    path: Option<PathBuf>,
    /// Serializes saves so concurrent callers never share the temp file.
    save_lock: Mutex<()>,
    span: Span,
}

impl Persister {
    /// An empty `path` disables persistence: `save` and `load` become no-ops.
    ///
    /// `repo` must be the undecorated store. Pointing it at a
    /// `DurableRepository` would make every restored write save again.
    pub fn new(repo: Arc<dyn MetricRepository>, path: impl Into<PathBuf>, span: Span) -> Self {
        let path = path.into();
        Self {
            repo,
            path: (!path.as_os_str().is_empty()).then_some(path),
            save_lock: Mutex::new(()),
            span,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Span that persistence events are recorded under.
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Write the full repository image, replacing the previous file atomically
    /// (temp file, fsync, rename).
    pub async fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let _guard = self.save_lock.lock().await;
        let snap = self.repo.snapshot().await;
        let bytes = snap.to_json()?;

        write_atomic(path, &bytes)
            .await
            .map_err(|e| MetrixError::Persistence(format!("write {} failed: {e}", path.display())))?;

        tracing::debug!(parent: &self.span, metrics = snap.len(), "snapshot saved");
        Ok(())
    }

    /// Replay the last snapshot into the repository.
    ///
    /// Counters are replayed through `update_counter`, which adds. Call this
    /// once, against an empty repository, before any other writer runs.
    pub async fn load(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let data = match tokio::fs::read_to_string(path).await {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(parent: &self.span, "no snapshot file, starting empty");
                return Ok(());
            }
            Err(e) => {
                return Err(MetrixError::Persistence(format!(
                    "read {} failed: {e}",
                    path.display()
                )))
            }
        };
        if data.trim().is_empty() {
            return Ok(());
        }

        let snap = RepositorySnapshot::from_json(&data)?;
        for (name, value) in &snap.gauges {
            self.repo.update_gauge(name, *value).await?;
        }
        for (name, delta) in &snap.counters {
            self.repo.update_counter(name, *delta).await?;
        }

        tracing::info!(
            parent: &self.span,
            gauges = snap.gauges.len(),
            counters = snap.counters.len(),
            "snapshot restored"
        );
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(".tmp");
    PathBuf::from(s)
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = tmp_path(path);
    let res = async {
        let mut f = tokio::fs::File::create(&tmp).await?;
        f.write_all(bytes).await?;
        f.sync_all().await?;
        drop(f);
        tokio::fs::rename(&tmp, path).await
    }
    .await;
    if res.is_err() {
        let _ = tokio::fs::remove_file(&tmp).await;
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemStorage;

    fn persister(repo: Arc<MemStorage>, path: impl Into<PathBuf>) -> Persister {
        Persister::new(repo, path, Span::none())
    }

    #[tokio::test]
    async fn round_trip_into_fresh_repository() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.json");

        let src = Arc::new(MemStorage::new());
        src.update_gauge("Alloc", 1234.5).await.unwrap();
        src.update_gauge("RandomValue", 0.000123).await.unwrap();
        src.update_counter("PollCount", 17).await.unwrap();
        src.update_counter("Alloc", -3).await.unwrap();
        persister(Arc::clone(&src), &path).save().await.unwrap();

        let dst = Arc::new(MemStorage::new());
        persister(Arc::clone(&dst), &path).load().await.unwrap();

        assert_eq!(dst.all_gauges().await, src.all_gauges().await);
        assert_eq!(dst.all_counters().await, src.all_counters().await);
    }

    #[tokio::test]
    async fn save_overwrites_previous_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.json");
        let repo = Arc::new(MemStorage::new());
        let p = persister(Arc::clone(&repo), &path);

        repo.update_counter("c", 1).await.unwrap();
        p.save().await.unwrap();
        repo.update_counter("c", 1).await.unwrap();
        p.save().await.unwrap();

        let on_disk = RepositorySnapshot::from_json(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk.counters["c"], 2);
        assert!(!tmp_path(&path).exists());
    }

    #[tokio::test]
    async fn missing_file_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Arc::new(MemStorage::new());
        persister(Arc::clone(&repo), dir.path().join("absent.json")).load().await.unwrap();
        assert!(repo.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn empty_path_disables_persistence() {
        let repo = Arc::new(MemStorage::new());
        repo.update_gauge("g", 1.0).await.unwrap();
        let p = persister(repo, "");
        assert!(p.path().is_none());
        p.save().await.unwrap();
        p.load().await.unwrap();
    }

    #[tokio::test]
    async fn corrupt_file_is_a_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.json");
        std::fs::write(&path, "{\"gauges\": [").unwrap();

        let err = persister(Arc::new(MemStorage::new()), &path).load().await.unwrap_err();
        assert!(matches!(err, MetrixError::Persistence(_)));
    }

    #[tokio::test]
    async fn unwritable_path_is_a_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("metrics.json");

        let err = persister(Arc::new(MemStorage::new()), &path).save().await.unwrap_err();
        assert!(matches!(err, MetrixError::Persistence(_)));
    }

    #[tokio::test]
    async fn blank_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.json");
        std::fs::write(&path, "  \n").unwrap();

        let repo = Arc::new(MemStorage::new());
        persister(Arc::clone(&repo), &path).load().await.unwrap();
        assert!(repo.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn failed_save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // rename onto a directory fails after the temp file was written
        let path = dir.path().join("snap");
        std::fs::create_dir(&path).unwrap();

        let repo = Arc::new(MemStorage::new());
        repo.update_counter("c", 1).await.unwrap();
        let err = persister(repo, &path).save().await.unwrap_err();

        assert!(matches!(err, MetrixError::Persistence(_)));
        assert!(!tmp_path(&path).exists());
        assert!(path.is_dir());
    }
}
