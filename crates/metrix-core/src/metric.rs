//! Metric kinds, values, and input validation.
//!
//! Formatting rules (interop contract):
//! - gauges render as the shortest decimal that round-trips, no exponent, no trailing zeros
//! - counters render as plain base-10

use std::fmt;
use std::str::FromStr;

use crate::error::{MetrixError, Result};

/// Kind of metric. Gauges and counters live in independent namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    /// Last write wins.
    Gauge,
    /// Accumulates deltas.
    Counter,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Gauge => "gauge",
            MetricKind::Counter => "counter",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = MetrixError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "gauge" => Ok(MetricKind::Gauge),
            "counter" => Ok(MetricKind::Counter),
            other => Err(MetrixError::InvalidKind(other.to_string())),
        }
    }
}

/// A typed metric value: a gauge reading or a counter delta.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Gauge(f64),
    Counter(i64),
}

impl MetricValue {
    /// Parse a raw value string according to `kind`.
    ///
    /// Gauges must be finite: the snapshot document has no encoding for NaN or infinities.
    pub fn parse(kind: MetricKind, raw: &str) -> Result<Self> {
        let invalid = || MetrixError::InvalidValue {
            kind: kind.as_str(),
            raw: raw.to_string(),
        };
        match kind {
            MetricKind::Gauge => {
                let v: f64 = raw.parse().map_err(|_| invalid())?;
                Self::gauge(v).ok_or_else(invalid)
            }
            MetricKind::Counter => raw
                .parse::<i64>()
                .map(MetricValue::Counter)
                .map_err(|_| invalid()),
        }
    }

    /// Build a gauge value, rejecting non-finite floats.
    pub fn gauge(v: f64) -> Option<Self> {
        v.is_finite().then_some(MetricValue::Gauge(v))
    }

    pub fn kind(&self) -> MetricKind {
        match self {
            MetricValue::Gauge(_) => MetricKind::Gauge,
            MetricValue::Counter(_) => MetricKind::Counter,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // f64's Display is already shortest round-trip without exponent.
        match self {
            MetricValue::Gauge(v) => write!(f, "{v}"),
            MetricValue::Counter(v) => write!(f, "{v}"),
        }
    }
}

/// Reject empty metric names.
pub fn validate_name(name: &str) -> Result<&str> {
    if name.is_empty() {
        return Err(MetrixError::MissingName);
    }
    Ok(name)
}

/// Validate a path-style update in protocol order: name, then type, then value.
pub fn parse_update(kind: &str, name: &str, raw: &str) -> Result<MetricValue> {
    validate_name(name)?;
    let kind: MetricKind = kind.parse()?;
    MetricValue::parse(kind, raw)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::error::ErrorClass;

    #[test]
    fn gauge_formatting_is_shortest_round_trip() {
        assert_eq!(MetricValue::Gauge(36.6).to_string(), "36.6");
        assert_eq!(MetricValue::Gauge(5.0).to_string(), "5");
        assert_eq!(MetricValue::Gauge(0.1 + 0.2).to_string(), "0.30000000000000004");
        assert_eq!(MetricValue::Gauge(1e21).to_string(), "1000000000000000000000");
        assert_eq!(MetricValue::Gauge(-0.0001).to_string(), "-0.0001");
    }

    #[test]
    fn counter_formatting_is_plain_base10() {
        assert_eq!(MetricValue::Counter(8).to_string(), "8");
        assert_eq!(MetricValue::Counter(-12).to_string(), "-12");
        assert_eq!(MetricValue::Counter(i64::MAX).to_string(), "9223372036854775807");
    }

    #[test]
    fn parse_accepts_well_formed_values() {
        assert_eq!(MetricValue::parse(MetricKind::Gauge, "36.6").unwrap(), MetricValue::Gauge(36.6));
        assert_eq!(MetricValue::parse(MetricKind::Gauge, "-1e3").unwrap(), MetricValue::Gauge(-1000.0));
        assert_eq!(MetricValue::parse(MetricKind::Counter, "5").unwrap(), MetricValue::Counter(5));
        assert_eq!(MetricValue::parse(MetricKind::Counter, "-3").unwrap(), MetricValue::Counter(-3));
    }

    #[test]
    fn parse_rejects_malformed_values() {
        for (kind, raw) in [
            (MetricKind::Gauge, "abc"),
            (MetricKind::Gauge, ""),
            (MetricKind::Gauge, "NaN"),
            (MetricKind::Gauge, "inf"),
            (MetricKind::Counter, "1.5"),
            (MetricKind::Counter, "ten"),
            (MetricKind::Counter, "99999999999999999999"),
        ] {
            let err = MetricValue::parse(kind, raw).unwrap_err();
            assert_eq!(err.class(), ErrorClass::Validation, "kind={kind} raw={raw}");
        }
    }

    #[test]
    fn parse_update_checks_name_before_kind_and_value() {
        assert!(matches!(parse_update("banana", "", "x"), Err(MetrixError::MissingName)));
        assert!(matches!(parse_update("banana", "Name", "1"), Err(MetrixError::InvalidKind(_))));
        assert!(matches!(
            parse_update("counter", "Hits", "1.5"),
            Err(MetrixError::InvalidValue { kind: "counter", .. })
        ));
        assert_eq!(parse_update("gauge", "Temp", "36.6").unwrap(), MetricValue::Gauge(36.6));
    }
}
