//! Durable snapshot document (`{"gauges": {...}, "counters": {...}}`).
//!
//! The whole repository is written as one document and overwritten on every
//! save. Maps are ordered so the file is deterministic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{MetrixError, Result};

/// Full image of the repository state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositorySnapshot {
    #[serde(default)]
    pub gauges: BTreeMap<String, f64>,
    #[serde(default)]
    pub counters: BTreeMap<String, i64>,
}

impl RepositorySnapshot {
    pub fn is_empty(&self) -> bool {
        self.gauges.is_empty() && self.counters.is_empty()
    }

    /// Number of metrics across both kinds.
    pub fn len(&self) -> usize {
        self.gauges.len() + self.counters.len()
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| MetrixError::Persistence(format!("encode snapshot failed: {e}")))
    }

    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| MetrixError::Persistence(format!("invalid snapshot json: {e}")))
    }
}
