//! Collector config loader (strict parsing).

pub mod schema;

use std::fs;
use std::io::ErrorKind;

use metrix_core::error::{MetrixError, Result};

pub use schema::{CollectorConfig, LogSection, ServerSection, StorageSection};

/// Default config file name, used when neither an argument nor `METRIX_CONFIG` is given.
pub const DEFAULT_CONFIG_PATH: &str = "metrix.yaml";

/// Parse `path`, falling back to defaults when the file does not exist.
///
/// The result is not validated yet: the binary installs logging from
/// `log.level` first, then applies environment overrides (which may warn)
/// and calls `validate`.
pub fn load(path: &str) -> Result<CollectorConfig> {
    match fs::read_to_string(path) {
        Ok(s) => parse(&s),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(CollectorConfig::default()),
        Err(e) => Err(MetrixError::Config(format!("read config failed: {e}"))),
    }
}

pub fn load_from_str(s: &str) -> Result<CollectorConfig> {
    let cfg = parse(s)?;
    cfg.validate()?;
    Ok(cfg)
}

fn parse(s: &str) -> Result<CollectorConfig> {
    serde_yaml::from_str(s).map_err(|e| MetrixError::Config(format!("invalid yaml: {e}")))
}
