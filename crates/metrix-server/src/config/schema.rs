use std::time::Duration;

use serde::Deserialize;
use metrix_core::error::{MetrixError, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectorConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub storage: StorageSection,

    #[serde(default)]
    pub log: LogSection,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            storage: StorageSection::default(),
            log: LogSection::default(),
        }
    }
}

impl CollectorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(MetrixError::Config(format!("unsupported config version: {}", self.version)));
        }
        self.server.validate()?;
        Ok(())
    }

    /// Apply the collector's environment overrides (`ADDRESS`, `STORE_INTERVAL`,
    /// `FILE_STORAGE_PATH`, `RESTORE`). Unparseable values are logged and ignored.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = var("ADDRESS").filter(|s| !s.is_empty()) {
            self.server.listen = addr;
        }
        if let Some(raw) = var("STORE_INTERVAL").filter(|s| !s.is_empty()) {
            match raw.parse::<u64>() {
                Ok(secs) => self.storage.store_interval_secs = secs,
                Err(e) => tracing::warn!(value = %raw, error = %e, "ignoring invalid STORE_INTERVAL"),
            }
        }
        if let Some(path) = var("FILE_STORAGE_PATH").filter(|s| !s.is_empty()) {
            self.storage.file_storage_path = path;
        }
        if let Some(raw) = var("RESTORE").filter(|s| !s.is_empty()) {
            match parse_bool(&raw) {
                Some(b) => self.storage.restore = b,
                None => tracing::warn!(value = %raw, "ignoring invalid RESTORE"),
            }
        }
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Upper bound for request bodies after gzip decompression.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        let valid_listen = self
            .listen
            .rsplit_once(':')
            .is_some_and(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok());
        if !valid_listen {
            return Err(MetrixError::Config(format!(
                "server.listen must be host:port, got {:?}",
                self.listen
            )));
        }
        if !(1024..=64 * 1024 * 1024).contains(&self.max_body_bytes) {
            return Err(MetrixError::Config(
                "server.max_body_bytes must be between 1024 and 67108864".into(),
            ));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "localhost:8080".into()
}
fn default_max_body_bytes() -> usize {
    1024 * 1024
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageSection {
    /// 0 selects synchronous durability (save after every write).
    #[serde(default = "default_store_interval_secs")]
    pub store_interval_secs: u64,

    /// Empty disables persistence.
    #[serde(default = "default_file_storage_path")]
    pub file_storage_path: String,

    #[serde(default = "default_restore")]
    pub restore: bool,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            store_interval_secs: default_store_interval_secs(),
            file_storage_path: default_file_storage_path(),
            restore: default_restore(),
        }
    }
}

impl StorageSection {
    pub fn store_interval(&self) -> Duration {
        Duration::from_secs(self.store_interval_secs)
    }
}

fn default_store_interval_secs() -> u64 {
    300
}
fn default_file_storage_path() -> String {
    "/tmp/metrics-db.json".into()
}
fn default_restore() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogSection {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

fn default_log_level() -> String {
    "info".into()
}
