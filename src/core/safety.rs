//! Safety gate between synthesis and execution.
//!
//! A command is unsafe when it touches a protected path, belongs to a
//! destructive category, runs git outside a repository, or navigates from
//! the filesystem root. Unsafe is not forbidden: the executor asks for
//! confirmation and treats anything but yes as "skip this step".

use crate::core::context::SystemContext;
use crate::core::intent::Intent;
use crate::core::step::Action;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskLevel {
    LOW = 0,      // Read-only or reversible
    MEDIUM = 1,   // Confirm; usually harmless
    HIGH = 2,     // Irreversible
    CRITICAL = 3, // Protected system or repository paths
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SafetyResult {
    pub safe: bool,
    pub warning: Option<String>,
    pub level: RiskLevel,
}

impl SafetyResult {
    pub fn safe() -> Self {
        Self {
            safe: true,
            warning: None,
            level: RiskLevel::LOW,
        }
    }
}

/// Directory prefixes that are protected together with everything below.
const PROTECTED_PREFIXES: &[&str] = &[
    "/bin",
    "/boot",
    "/dev",
    "/etc",
    "/lib",
    "/lib64",
    "/proc",
    "/sbin",
    "/sys",
    "/usr",
    "/System",
    "c:/windows",
    "c:/program files",
];

static QUOTED_ARG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""([^"]*)""#).unwrap());

static DRIVE_ROOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]:[\\/]?$").unwrap());

pub struct SafetyValidator {
    extra_protected: Vec<String>,
}

impl Default for SafetyValidator {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl SafetyValidator {
    pub fn new(extra_protected: Vec<String>) -> Self {
        Self { extra_protected }
    }

    pub fn validate(&self, action: &Action, command: &str, ctx: &SystemContext) -> SafetyResult {
        let mut warnings: Vec<String> = Vec::new();
        let mut level = RiskLevel::LOW;
        let mut flag = |warning: String, risk: RiskLevel| {
            warnings.push(warning);
            if risk > level {
                level = risk;
            }
        };

        if let Some(path) = self.protected_path(command) {
            flag(
                format!("Command touches protected path: {}", path),
                RiskLevel::CRITICAL,
            );
        }

        let intent = action.intent();
        match intent {
            Intent::DeleteFile | Intent::DeleteDir => {
                flag("Delete operations can be destructive".to_string(), RiskLevel::HIGH)
            }
            Intent::GitReset => flag(
                "Hard reset discards uncommitted changes".to_string(),
                RiskLevel::HIGH,
            ),
            Intent::ProcessKill => flag(
                "Terminating a process can lose unsaved work".to_string(),
                RiskLevel::MEDIUM,
            ),
            _ => {}
        }

        if intent.is_git() && !ctx.is_git_repo {
            flag("Git command outside a repository".to_string(), RiskLevel::MEDIUM);
        }

        if intent == Intent::Navigation && ctx.cwd.parent().is_none() {
            flag("Navigating from root directory".to_string(), RiskLevel::MEDIUM);
        }

        if warnings.is_empty() {
            return SafetyResult::safe();
        }
        SafetyResult {
            safe: false,
            warning: Some(warnings.join("; ")),
            level,
        }
    }

    /// First quoted argument that is, or lies under, a protected location.
    fn protected_path(&self, command: &str) -> Option<String> {
        QUOTED_ARG
            .captures_iter(command)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
            .find(|arg| self.is_protected(arg))
    }

    fn is_protected(&self, raw: &str) -> bool {
        if raw.trim().is_empty() {
            return false;
        }
        let path = raw.replace('\\', "/");
        let trimmed = path.trim_end_matches('/');
        if path == "/" || trimmed.is_empty() || DRIVE_ROOT.is_match(raw) {
            return true;
        }
        let lower = trimmed.to_lowercase();
        let under_prefix = PROTECTED_PREFIXES.iter().any(|prefix| {
            let prefix = prefix.to_lowercase();
            lower == prefix || lower.starts_with(&format!("{}/", prefix))
        });
        if under_prefix {
            return true;
        }
        if trimmed.split('/').any(|component| component == ".git") {
            return true;
        }
        self.extra_protected
            .iter()
            .filter(|fragment| !fragment.trim().is_empty())
            .any(|fragment| path.contains(fragment.as_str()))
    }
}
