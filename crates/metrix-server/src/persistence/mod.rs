//! Durable snapshots of the repository.
//!
//! Two strategies, picked once at startup from `storage.store_interval_secs`:
//! - `Sync` (interval 0): `DurableRepository` saves after every write
//! - `Periodic`: writes go straight to the store and a `Flusher` task saves
//!   on a fixed interval
//!
//! The binary additionally saves once at shutdown in both modes.

pub mod durable;
pub mod flusher;
pub mod persister;

use std::sync::Arc;
use std::time::Duration;

pub use durable::DurableRepository;
pub use flusher::Flusher;
pub use persister::Persister;

use crate::storage::MetricRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurabilityMode {
    Sync,
    Periodic(Duration),
}

impl DurabilityMode {
    pub fn from_interval(interval: Duration) -> Self {
        if interval.is_zero() {
            DurabilityMode::Sync
        } else {
            DurabilityMode::Periodic(interval)
        }
    }
}

/// Pick the repository the protocol handler writes through. Exactly one
/// strategy applies: stacking the decorator on top of a timer would save
/// twice per write.
pub fn compose(
    storage: Arc<dyn MetricRepository>,
    persister: Arc<Persister>,
    mode: DurabilityMode,
) -> Arc<dyn MetricRepository> {
    match mode {
        DurabilityMode::Sync => Arc::new(DurableRepository::new(storage, persister)),
        DurabilityMode::Periodic(_) => storage,
    }
}
