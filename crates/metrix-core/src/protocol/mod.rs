//! Wire formats for the collector protocol.
//!
//! Two encodings reach the collector:
//! - path segments: `/update/{type}/{name}/{value}`, parsed by `metric::parse_update`
//! - JSON bodies: a `MetricEnvelope` per request
//!
//! Both must validate identically, so the envelope funnels into the same
//! `MetricKind`/`MetricValue` checks as the path form.

pub mod envelope;
