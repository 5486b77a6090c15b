//! Configuration schema.
//!
//! Every section is `#[serde(default)]`; missing fields fall back to the
//! values in the `Default` impls below.

use serde::{Deserialize, Serialize};

pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Remote methods the proxy knows how to forward. Configuration can narrow
/// this list, never extend it.
pub const KNOWN_METHODS: &[&str] = &["create", "getAll"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BarrierConfig {
    pub proxy: ProxyConfig,
    pub bus: BusConfig,
    pub logging: LoggingConfig,
}

/// Per-connection proxy behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// `source` field of every outgoing message, and the prefix of each
    /// connection's instance name.
    pub source_path: String,
    /// Remote methods accepted from callers (subset of `KNOWN_METHODS`).
    pub allowed_methods: Vec<String>,
    /// Depth of each connection's command queue (valid range: 1-4096).
    pub command_queue: usize,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            source_path: "chrome.windows".into(),
            allowed_methods: KNOWN_METHODS.iter().map(|m| m.to_string()).collect(),
            command_queue: 32,
        }
    }
}

impl ProxyConfig {
    pub fn allows(&self, method: &str) -> bool {
        self.allowed_methods.iter().any(|m| m == method)
    }
}

/// Host event bus sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Events buffered per subscriber before it lags (valid range: 1-65536).
    pub capacity: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self { capacity: 256 }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
}
