//! Shared application state for the collector's HTTP handlers.

use std::sync::Arc;

use crate::storage::MetricRepository;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    repo: Arc<dyn MetricRepository>,
    max_body_bytes: usize,
}

impl AppState {
    /// `repo` is whatever the durability mode selected: the plain store or the
    /// sync-saving decorator. Handlers cannot tell the difference.
    pub fn new(repo: Arc<dyn MetricRepository>, max_body_bytes: usize) -> Self {
        Self {
            inner: Arc::new(AppStateInner { repo, max_body_bytes }),
        }
    }

    pub fn repo(&self) -> Arc<dyn MetricRepository> {
        Arc::clone(&self.inner.repo)
    }

    /// Limit for (decompressed) request bodies.
    pub fn max_body_bytes(&self) -> usize {
        self.inner.max_body_bytes
    }
}
