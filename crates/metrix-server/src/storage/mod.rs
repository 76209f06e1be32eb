//! Metric repository: the seam between the protocol handler and whatever holds
//! the current values.
//!
//! Two implementations are composed by construction:
//! - `MemStorage`: the in-memory maps
//! - `persistence::DurableRepository`: decorates another repository and
//!   snapshots to disk after every successful write

pub mod memory;

use std::collections::HashMap;

use async_trait::async_trait;

use metrix_core::error::Result;
use metrix_core::{MetricKind, MetricValue, RepositorySnapshot};

pub use memory::MemStorage;

/// Current gauge and counter values, safe to share across request tasks.
#[async_trait]
pub trait MetricRepository: Send + Sync {
    /// `gauge[name] = value`.
    async fn update_gauge(&self, name: &str, value: f64) -> Result<()>;

    /// `counter[name] += delta`, starting from 0 when absent.
    async fn update_counter(&self, name: &str, delta: i64) -> Result<()>;

    /// `None` means "no such metric", not an error.
    async fn get_gauge(&self, name: &str) -> Option<f64>;

    async fn get_counter(&self, name: &str) -> Option<i64>;

    async fn all_gauges(&self) -> HashMap<String, f64>;

    async fn all_counters(&self) -> HashMap<String, i64>;

    /// Full image of both maps. The default reads them one after the other;
    /// implementations with a single lock should copy both under it.
    async fn snapshot(&self) -> RepositorySnapshot {
        RepositorySnapshot {
            gauges: self.all_gauges().await.into_iter().collect(),
            counters: self.all_counters().await.into_iter().collect(),
        }
    }

    /// Apply a typed write.
    async fn update(&self, name: &str, value: MetricValue) -> Result<()> {
        match value {
            MetricValue::Gauge(v) => self.update_gauge(name, v).await,
            MetricValue::Counter(d) => self.update_counter(name, d).await,
        }
    }

    /// Typed point lookup.
    async fn get(&self, kind: MetricKind, name: &str) -> Option<MetricValue> {
        match kind {
            MetricKind::Gauge => self.get_gauge(name).await.map(MetricValue::Gauge),
            MetricKind::Counter => self.get_counter(name).await.map(MetricValue::Counter),
        }
    }
}
