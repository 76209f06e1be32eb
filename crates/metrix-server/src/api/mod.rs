//! Collector HTTP API.
//!
//! | Method | Path | Encoding |
//! |---|---|---|
//! | POST | `/update/{type}/{name}/{value}` | path segments |
//! | POST | `/update/` | JSON envelope |
//! | GET | `/value/{type}/{name}` | path segments, plain-text answer |
//! | POST | `/value/` | JSON envelope in and out |
//! | GET | `/` | HTML listing |

pub mod error;
pub mod handlers;
pub mod listing;

pub use error::ApiError;
