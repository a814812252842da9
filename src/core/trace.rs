//! Append-only JSONL audit trail of executed and dry-run steps.
//!
//! Every string is passed through the secret redactor before it is written:
//! natural-language input sometimes carries tokens or passwords.

use crate::core::error::HcmdError;
use crate::core::time;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::LazyLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceStatus {
    Executed,
    DryRun,
    Failed,
    Skipped,
    RolledBack,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepTrace {
    pub trace_id: String,
    pub ts: String,
    pub input: String,
    pub intent: String,
    pub command: String,
    pub dry_run: bool,
    pub status: TraceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl StepTrace {
    pub fn new(input: &str, intent: &str, command: &str, dry_run: bool, status: TraceStatus) -> Self {
        Self {
            trace_id: time::new_event_id(),
            ts: time::now_epoch_z(),
            input: input.to_string(),
            intent: intent.to_string(),
            command: command.to_string(),
            dry_run,
            status,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: &str) -> Self {
        self.detail = Some(detail.to_string());
        self
    }

    fn redacted(self) -> Self {
        Self {
            input: redact_string(&self.input),
            command: redact_string(&self.command),
            detail: self.detail.as_deref().map(redact_string),
            ..self
        }
    }
}

/// Userinfo in a URL, as typed into a clone request: `https://me:pw@host`.
static URL_USERINFO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b([a-z][a-z0-9+.-]*://)[^\s'"/:@]+:[^\s'"@]+@"#).unwrap()
});

static BEARER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(bearer\s+)[A-Za-z0-9_.=+/-]+").unwrap());

static PASSWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(password|passwd)(\s*[:=]\s*)(?:"[^"]*"|'[^']*'|\S+)"#).unwrap()
});

/// Mask credentials while keeping the surrounding command readable.
pub fn redact_string(input: &str) -> String {
    let masked = URL_USERINFO.replace_all(input, "${1}[REDACTED]@");
    let masked = BEARER.replace_all(&masked, "${1}[REDACTED]");
    PASSWORD
        .replace_all(&masked, "${1}${2}[REDACTED]")
        .into_owned()
}

pub fn append_trace(trace_path: &Path, event: StepTrace) -> Result<(), HcmdError> {
    if let Some(parent) = trace_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(trace_path)?;
    let json = serde_json::to_string(&event.redacted())?;
    writeln!(file, "{}", json)?;
    Ok(())
}

/// The newest `n` trace lines, oldest first.
pub fn last_traces(trace_path: &Path, n: usize) -> Result<Vec<StepTrace>, HcmdError> {
    if !trace_path.exists() {
        return Ok(vec![]);
    }
    let content = std::fs::read_to_string(trace_path)?;
    let lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(n);
    lines[start..]
        .iter()
        .map(|line| serde_json::from_str(line).map_err(HcmdError::from))
        .collect()
}
