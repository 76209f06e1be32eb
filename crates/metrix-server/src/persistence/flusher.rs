//! Periodic snapshot task.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::Persister;

/// Background task that saves a snapshot every `every`.
///
/// A tick's save finishes before the next tick is awaited, so saves never
/// overlap; a slow save delays the schedule instead of piling up.
pub struct Flusher {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl Flusher {
    pub fn spawn(persister: Arc<Persister>, every: Duration) -> Self {
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut tick = tokio::time::interval(every);
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // first tick fires immediately
            tick.tick().await;

            loop {
                tokio::select! {
                    _ = tick.tick() => {
                        tracing::debug!(parent: persister.span(), "periodic save");
                        if let Err(e) = persister.save().await {
                            tracing::error!(parent: persister.span(), error = %e, "periodic save failed");
                        }
                    }
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }
        });

        Self { stop_tx, task }
    }

    /// Stop the timer and wait for an in-flight save to finish.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "flusher task ended abnormally");
        }
    }
}

#[cfg(test)]
mod tests {
    use tracing::Span;

    use super::*;
    use crate::storage::{MemStorage, MetricRepository};
    use metrix_core::RepositorySnapshot;

    #[tokio::test]
    async fn saves_on_each_tick_until_stopped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.json");
        let mem = Arc::new(MemStorage::new());
        let persister = Arc::new(Persister::new(mem.clone(), &path, Span::none()));

        mem.update_counter("PollCount", 2).await.unwrap();
        let flusher = Flusher::spawn(persister, Duration::from_millis(20));

        let mut saved = false;
        for _ in 0..100 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            if path.exists() {
                saved = true;
                break;
            }
        }
        flusher.stop().await;
        assert!(saved, "flusher never wrote the snapshot");

        let on_disk = RepositorySnapshot::from_json(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk.counters["PollCount"], 2);
    }

    #[tokio::test]
    async fn does_not_save_before_first_interval() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.json");
        let persister = Arc::new(Persister::new(Arc::new(MemStorage::new()), &path, Span::none()));

        let flusher = Flusher::spawn(persister, Duration::from_secs(3600));
        tokio::time::sleep(Duration::from_millis(50)).await;
        flusher.stop().await;

        assert!(!path.exists());
    }
}
