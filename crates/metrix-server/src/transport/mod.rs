//! HTTP transport middleware.
//!
//! Wraps the API routes with gzip handling and an access log. Neither layer
//! knows anything about metrics; the handlers see plain bodies.

pub mod access_log;
pub mod gzip;
