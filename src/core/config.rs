//! User configuration loaded from `config.toml` in the hcmd state directory.
//!
//! A missing file means defaults. A file that exists but does not parse is
//! fatal: silently ignoring a thresholds override would change which inputs
//! are accepted.

use crate::core::error::HcmdError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_INTENT_THRESHOLD: f32 = 0.6;
pub const DEFAULT_SPAN_THRESHOLD: f32 = 0.4;

/// Environment variable that relocates the state directory.
pub const HOME_ENV: &str = "HCMD_HOME";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub intent_threshold: f32,
    pub span_threshold: f32,
    pub memory_file: Option<PathBuf>,
    pub trace_file: Option<PathBuf>,
    pub trace: bool,
    /// Appended to the built-in protected fragments.
    pub protected_paths: Vec<String>,
    /// Answer every yes/no confirmation affirmatively. Never picks an
    /// ambiguity option.
    pub assume_yes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            intent_threshold: DEFAULT_INTENT_THRESHOLD,
            span_threshold: DEFAULT_SPAN_THRESHOLD,
            memory_file: None,
            trace_file: None,
            trace: true,
            protected_paths: Vec::new(),
            assume_yes: false,
        }
    }
}

impl Config {
    /// Load from an explicit path, or from `<state_dir>/config.toml`.
    pub fn load(explicit: Option<&Path>) -> Result<Self, HcmdError> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => state_dir().join("config.toml"),
        };
        if !path.exists() {
            if explicit.is_some() {
                return Err(HcmdError::ConfigError(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, HcmdError> {
        let config: Config =
            toml::from_str(content).map_err(|e| HcmdError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), HcmdError> {
        for (name, value) in [
            ("intent_threshold", self.intent_threshold),
            ("span_threshold", self.span_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(HcmdError::ConfigError(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    pub fn memory_path(&self) -> PathBuf {
        self.memory_file
            .clone()
            .unwrap_or_else(|| state_dir().join("memory.json"))
    }

    pub fn trace_path(&self) -> PathBuf {
        match &self.trace_file {
            Some(p) => p.clone(),
            None => self
                .memory_path()
                .parent()
                .map(|dir| dir.join("traces.jsonl"))
                .unwrap_or_else(|| PathBuf::from("traces.jsonl")),
        }
    }
}

/// `$HCMD_HOME`, else `~/.hcmd`, else `./.hcmd` when no home is known.
pub fn state_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .map(|home| home.join(".hcmd"))
        .unwrap_or_else(|| PathBuf::from(".hcmd"))
}
