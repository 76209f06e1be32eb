//! JSON metric envelope (`{"id", "type", "delta"?, "value"?}`).

use serde::{Deserialize, Serialize};

use crate::error::{MetrixError, Result};
use crate::metric::{validate_name, MetricKind, MetricValue};

/// One metric on the wire. Exactly one of `delta`/`value` is populated on
/// output, matching `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricEnvelope {
    /// Metric name.
    pub id: String,
    /// Metric type (field name is `type` in JSON). Kept as a string so an
    /// unknown type is a validation error rather than a decode error.
    #[serde(rename = "type")]
    pub kind: String,
    /// Counter delta (or accumulated total in responses).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<i64>,
    /// Gauge value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl MetricEnvelope {
    /// Decode an envelope from a request body.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body).map_err(|e| MetrixError::Encoding(format!("invalid envelope json: {e}")))
    }

    /// Build a response envelope for a stored value.
    pub fn from_value(name: impl Into<String>, value: MetricValue) -> Self {
        let kind = value.kind().as_str().to_string();
        let (delta, value) = match value {
            MetricValue::Gauge(v) => (None, Some(v)),
            MetricValue::Counter(d) => (Some(d), None),
        };
        Self {
            id: name.into(),
            kind,
            delta,
            value,
        }
    }

    /// Validate a read request, returning the kind and name to look up.
    ///
    /// Reads check `type` before `id`: an unknown type is a bad request even
    /// when the name is empty.
    pub fn query(&self) -> Result<(MetricKind, &str)> {
        let kind: MetricKind = self.kind.parse()?;
        let name = validate_name(&self.id)?;
        Ok((kind, name))
    }

    /// Validate a write request in update order (name, type, value). The
    /// field matching `type` must be present; the other one is ignored.
    pub fn into_update(self) -> Result<(String, MetricValue)> {
        validate_name(&self.id)?;
        let kind: MetricKind = self.kind.parse()?;
        let value = match kind {
            MetricKind::Gauge => self.value.and_then(MetricValue::gauge),
            MetricKind::Counter => self.delta.map(MetricValue::Counter),
        }
        .ok_or_else(|| MetrixError::InvalidValue {
            kind: kind.as_str(),
            raw: "<missing>".into(),
        })?;
        Ok((self.id, value))
    }
}
