use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HcmdError {
    #[error("{0}")]
    LowConfidence(String),
    #[error("{reason}")]
    AmbiguousTarget { reason: String, options: Vec<String> },
    #[error("{0}")]
    MissingTarget(String),
    #[error("{0}")]
    UnsafeOperation(String),
    #[error("{0}")]
    UnsupportedIntent(String),
    #[error("{0}")]
    ExecutionFailure(String),
    #[error("Corrupt state: {0}")]
    CorruptState(String),
    #[error("{0}")]
    InvalidRequest(String),
    #[error("Aborted: {0}")]
    Aborted(String),
    #[error("Config error: {0}")]
    ConfigError(String),
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
