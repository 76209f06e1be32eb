//! In-memory repository: both maps behind one `RwLock`.
//!
//! The lock is held only for the map operation itself and never across an
//! `.await`, so the std lock is fine inside async handlers.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard};

use async_trait::async_trait;

use metrix_core::error::{MetrixError, Result};
use metrix_core::RepositorySnapshot;

use super::MetricRepository;

#[derive(Debug, Default)]
struct Maps {
    gauges: HashMap<String, f64>,
    counters: HashMap<String, i64>,
}

#[derive(Debug, Default)]
pub struct MemStorage {
    maps: RwLock<Maps>,
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads recover from poisoning: the maps are always left consistent
    /// because every write is a single insert.
    fn read(&self) -> RwLockReadGuard<'_, Maps> {
        self.maps.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write<R>(&self, f: impl FnOnce(&mut Maps) -> R) -> Result<R> {
        let mut maps = self
            .maps
            .write()
            .map_err(|_| MetrixError::Storage("metric store lock poisoned".into()))?;
        Ok(f(&mut maps))
    }
}

#[async_trait]
impl MetricRepository for MemStorage {
    async fn update_gauge(&self, name: &str, value: f64) -> Result<()> {
        self.write(|m| {
            m.gauges.insert(name.to_string(), value);
        })
    }

    async fn update_counter(&self, name: &str, delta: i64) -> Result<()> {
        self.write(|m| {
            let slot = m.counters.entry(name.to_string()).or_insert(0);
            *slot = slot.saturating_add(delta);
        })
    }

    async fn get_gauge(&self, name: &str) -> Option<f64> {
        self.read().gauges.get(name).copied()
    }

    async fn get_counter(&self, name: &str) -> Option<i64> {
        self.read().counters.get(name).copied()
    }

    async fn all_gauges(&self) -> HashMap<String, f64> {
        self.read().gauges.clone()
    }

    async fn all_counters(&self) -> HashMap<String, i64> {
        self.read().counters.clone()
    }

    async fn snapshot(&self) -> RepositorySnapshot {
        let maps = self.read();
        RepositorySnapshot {
            gauges: maps.gauges.iter().map(|(k, v)| (k.clone(), *v)).collect(),
            counters: maps.counters.iter().map(|(k, v)| (k.clone(), *v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn counter_accumulates() {
        let s = MemStorage::new();
        s.update_counter("x", 5).await.unwrap();
        s.update_counter("x", 3).await.unwrap();
        assert_eq!(s.get_counter("x").await, Some(8));
    }

    #[tokio::test]
    async fn counter_saturates_instead_of_wrapping() {
        let s = MemStorage::new();
        s.update_counter("x", i64::MAX).await.unwrap();
        s.update_counter("x", 1).await.unwrap();
        assert_eq!(s.get_counter("x").await, Some(i64::MAX));
    }

    #[tokio::test]
    async fn gauge_last_write_wins() {
        let s = MemStorage::new();
        s.update_gauge("t", 1.5).await.unwrap();
        s.update_gauge("t", -2.25).await.unwrap();
        assert_eq!(s.get_gauge("t").await, Some(-2.25));
    }

    #[tokio::test]
    async fn unknown_names_are_not_found() {
        let s = MemStorage::new();
        assert_eq!(s.get_gauge("nope").await, None);
        assert_eq!(s.get_counter("nope").await, None);
    }

    #[tokio::test]
    async fn kinds_are_independent_namespaces() {
        let s = MemStorage::new();
        s.update_gauge("same", 1.0).await.unwrap();
        s.update_counter("same", 2).await.unwrap();
        assert_eq!(s.get_gauge("same").await, Some(1.0));
        assert_eq!(s.get_counter("same").await, Some(2));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_increments_are_not_lost() {
        const N: i64 = 500;
        let s = Arc::new(MemStorage::new());

        let tasks: Vec<_> = (0..N)
            .map(|_| {
                let s = Arc::clone(&s);
                tokio::spawn(async move { s.update_counter("x", 1).await })
            })
            .collect();
        for t in tasks {
            t.await.unwrap().unwrap();
        }

        assert_eq!(s.get_counter("x").await, Some(N));
    }

    #[tokio::test]
    async fn snapshot_copies_both_maps() {
        let s = MemStorage::new();
        s.update_gauge("g", 0.5).await.unwrap();
        s.update_counter("c", 4).await.unwrap();

        let snap = s.snapshot().await;
        assert_eq!(snap.gauges.get("g"), Some(&0.5));
        assert_eq!(snap.counters.get("c"), Some(&4));
        assert_eq!(s.all_gauges().await.len(), 1);
        assert_eq!(s.all_counters().await.len(), 1);
    }

    #[tokio::test]
    async fn poisoned_lock_fails_writes_but_keeps_reads() {
        let s = Arc::new(MemStorage::new());
        s.update_gauge("g", 0.5).await.unwrap();
        s.update_counter("c", 4).await.unwrap();

        let poisoner = Arc::clone(&s);
        let joined = std::thread::spawn(move || {
            let _guard = poisoner.maps.write().unwrap();
            panic!("writer died holding the lock");
        })
        .join();
        assert!(joined.is_err());

        assert!(matches!(s.update_gauge("g", 1.0).await, Err(MetrixError::Storage(_))));
        assert!(matches!(s.update_counter("c", 1).await, Err(MetrixError::Storage(_))));
        assert_eq!(s.get_gauge("g").await, Some(0.5));
        assert_eq!(s.get_counter("c").await, Some(4));
        assert_eq!(s.snapshot().await.len(), 2);
    }
}
