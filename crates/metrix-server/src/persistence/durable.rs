//! Synchronous-durability decorator.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use metrix_core::error::Result;
use metrix_core::RepositorySnapshot;

use super::Persister;
use crate::storage::MetricRepository;

/// Saves a snapshot after every successful write.
///
/// A failed save is logged and the write still succeeds: the in-memory value
/// is authoritative, the file is best-effort.
pub struct DurableRepository {
    inner: Arc<dyn MetricRepository>,
    persister: Arc<Persister>,
}

impl DurableRepository {
    pub fn new(inner: Arc<dyn MetricRepository>, persister: Arc<Persister>) -> Self {
        Self { inner, persister }
    }

    async fn persist(&self, name: &str) {
        if let Err(e) = self.persister.save().await {
            tracing::error!(parent: self.persister.span(), metric = %name, error = %e, "sync save failed");
        }
    }
}

#[async_trait]
impl MetricRepository for DurableRepository {
    async fn update_gauge(&self, name: &str, value: f64) -> Result<()> {
        self.inner.update_gauge(name, value).await?;
        self.persist(name).await;
        Ok(())
    }

    async fn update_counter(&self, name: &str, delta: i64) -> Result<()> {
        self.inner.update_counter(name, delta).await?;
        self.persist(name).await;
        Ok(())
    }

    async fn get_gauge(&self, name: &str) -> Option<f64> {
        self.inner.get_gauge(name).await
    }

    async fn get_counter(&self, name: &str) -> Option<i64> {
        self.inner.get_counter(name).await
    }

    async fn all_gauges(&self) -> HashMap<String, f64> {
        self.inner.all_gauges().await
    }

    async fn all_counters(&self) -> HashMap<String, i64> {
        self.inner.all_counters().await
    }

    async fn snapshot(&self) -> RepositorySnapshot {
        self.inner.snapshot().await
    }
}

#[cfg(test)]
mod tests {
    use tracing::Span;

    use super::*;
    use crate::storage::MemStorage;

    #[tokio::test]
    async fn every_write_reaches_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.json");
        let mem: Arc<dyn MetricRepository> = Arc::new(MemStorage::new());
        let persister = Arc::new(Persister::new(Arc::clone(&mem), &path, Span::none()));
        let repo = DurableRepository::new(mem, persister);

        repo.update_counter("Hits", 5).await.unwrap();
        let on_disk = RepositorySnapshot::from_json(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk.counters["Hits"], 5);

        repo.update_gauge("Temp", 36.6).await.unwrap();
        let on_disk = RepositorySnapshot::from_json(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk.gauges["Temp"], 36.6);
        assert_eq!(on_disk.counters["Hits"], 5);
    }

    #[tokio::test]
    async fn failed_save_keeps_the_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("metrics.json");
        let mem: Arc<dyn MetricRepository> = Arc::new(MemStorage::new());
        let persister = Arc::new(Persister::new(Arc::clone(&mem), &path, Span::none()));
        let repo = DurableRepository::new(Arc::clone(&mem), persister);

        repo.update_counter("Hits", 3).await.unwrap();
        assert_eq!(repo.get_counter("Hits").await, Some(3));
        assert!(!path.exists());
    }
}
