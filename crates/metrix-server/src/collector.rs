//! Collector lifecycle: restore, durability wiring, shutdown flush.

use std::sync::Arc;

use axum::Router;

use metrix_core::error::Result;

use crate::app_state::AppState;
use crate::config::CollectorConfig;
use crate::persistence::{self, DurabilityMode, Flusher, Persister};
use crate::router;
use crate::storage::{MemStorage, MetricRepository};

pub struct Collector {
    state: AppState,
    persister: Arc<Persister>,
    flusher: Option<Flusher>,
    mode: DurabilityMode,
}

impl Collector {
    /// Build the repository stack and start background persistence.
    ///
    /// A failed restore is logged and the collector starts empty.
    pub async fn start(cfg: &CollectorConfig) -> Self {
        let storage: Arc<dyn MetricRepository> = Arc::new(MemStorage::new());
        let span = tracing::info_span!("persistence", path = %cfg.storage.file_storage_path);
        let persister = Arc::new(Persister::new(
            Arc::clone(&storage),
            &cfg.storage.file_storage_path,
            span,
        ));

        // Must run before anything else can write: counters are replayed additively.
        if cfg.storage.restore {
            if let Err(e) = persister.load().await {
                tracing::error!(error = %e, "failed to restore metrics, starting empty");
            }
        }

        let mode = DurabilityMode::from_interval(cfg.storage.store_interval());
        let flusher = match mode {
            DurabilityMode::Periodic(every) => {
                tracing::info!(interval_secs = every.as_secs(), "periodic storage mode enabled");
                Some(Flusher::spawn(Arc::clone(&persister), every))
            }
            DurabilityMode::Sync => {
                tracing::info!("sync storage mode enabled");
                None
            }
        };

        let repo = persistence::compose(storage, Arc::clone(&persister), mode);
        Self {
            state: AppState::new(repo, cfg.server.max_body_bytes),
            persister,
            flusher,
            mode,
        }
    }

    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    pub fn router(&self) -> Router {
        router::build_router(self.state())
    }

    pub fn mode(&self) -> DurabilityMode {
        self.mode
    }

    /// Stop the periodic task and write the final snapshot.
    pub async fn shutdown(self) -> Result<()> {
        if let Some(flusher) = self.flusher {
            flusher.stop().await;
        }
        self.persister.save().await
    }
}
