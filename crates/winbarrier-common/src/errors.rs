use std::path::PathBuf;

use crate::types::WindowId;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Failures reported by the host windowing subsystem itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("window creation failed: {0}")]
    CreateFailed(String),

    #[error("window query failed: {0}")]
    QueryFailed(String),

    #[error("host unavailable")]
    Unavailable,
}

#[derive(Debug, thiserror::Error)]
pub enum BarrierError {
    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("malformed command: {0}")]
    MalformedCommand(String),

    /// The host reported a newly created window we cannot place under
    /// access control.
    #[error("unsupported window shape: window {window_id} arrived with {tabs} tabs")]
    UnsupportedShape { window_id: WindowId, tabs: usize },

    #[error("connection closed")]
    ConnectionClosed,

    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
