//! metrix core: transport-agnostic metric value objects, wire envelopes, and errors.
//!
//! This crate defines the data contracts shared by the collector server and any
//! client that reports metrics to it: metric kinds and values, the JSON
//! envelope used by the body-encoded protocol, and the durable snapshot
//! document. It carries no transport or runtime dependencies.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed client input always surfaces as `MetrixError`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod metric;
pub mod protocol;
pub mod snapshot;

/// Shared result type.
pub use error::{ErrorClass, MetrixError, Result};
pub use metric::{MetricKind, MetricValue};
pub use protocol::envelope::MetricEnvelope;
pub use snapshot::RepositorySnapshot;
