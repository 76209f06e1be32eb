//! metrix collector library entry.
//!
//! This crate wires the metric repository, snapshot persistence, and the
//! HTTP protocol handler into a collector. It is consumed by the binary
//! (`main.rs`) and by integration tests.

pub mod api;
pub mod app_state;
pub mod collector;
pub mod config;
pub mod persistence;
pub mod router;
pub mod storage;
pub mod transport;

pub use collector::Collector;
