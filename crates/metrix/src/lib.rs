//! Top-level facade crate for metrix.
//!
//! Re-exports the core value types and the collector server so users can depend on a single crate.

pub mod core {
    pub use metrix_core::*;
}

pub mod server {
    pub use metrix_server::*;
}
