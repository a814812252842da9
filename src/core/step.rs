//! Steps and plans.
//!
//! A `Step` wraps one `Action`: a tagged variant per intent that carries
//! exactly that intent's slots. Slots are `Option` because a span may be
//! absent until memory fallback or clarification fills it; synthesis treats
//! a still-missing slot as an invalid command.

use crate::core::intent::{Intent, SlotName};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "git", rename_all = "snake_case")]
pub enum GitAction {
    Status,
    Add { path: Option<String> },
    Commit { message: Option<String> },
    Checkout { branch: Option<String> },
    Branch,
    Clone { repo: Option<String> },
    Log,
    Pull,
    Push,
    Diff,
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    Navigation { path: Option<String> },
    ListFiles,
    Pwd,
    CreateFile { path: Option<String> },
    CreateDir { path: Option<String> },
    ReadFile { path: Option<String> },
    DeleteFile { path: Option<String> },
    DeleteDir { path: Option<String> },
    CopyFile { src: Option<String>, dst: Option<String> },
    MoveFile { src: Option<String>, dst: Option<String> },
    RenameFile { src: Option<String>, dst: Option<String> },
    ProcessList,
    ProcessKill { target: Option<String> },
    SystemInfo,
    NetworkInfo,
    Git(GitAction),
}

impl Action {
    /// An action with every slot unset. `None` for UNKNOWN/FORBIDDEN, which
    /// never become executable steps.
    pub fn empty(intent: Intent) -> Option<Self> {
        let action = match intent {
            Intent::Navigation => Action::Navigation { path: None },
            Intent::ListFiles => Action::ListFiles,
            Intent::Pwd => Action::Pwd,
            Intent::CreateFile => Action::CreateFile { path: None },
            Intent::CreateDir => Action::CreateDir { path: None },
            Intent::ReadFile => Action::ReadFile { path: None },
            Intent::DeleteFile => Action::DeleteFile { path: None },
            Intent::DeleteDir => Action::DeleteDir { path: None },
            Intent::CopyFile => Action::CopyFile { src: None, dst: None },
            Intent::MoveFile => Action::MoveFile { src: None, dst: None },
            Intent::RenameFile => Action::RenameFile { src: None, dst: None },
            Intent::ProcessList => Action::ProcessList,
            Intent::ProcessKill => Action::ProcessKill { target: None },
            Intent::SystemInfo => Action::SystemInfo,
            Intent::NetworkInfo => Action::NetworkInfo,
            Intent::GitStatus => Action::Git(GitAction::Status),
            Intent::GitAdd => Action::Git(GitAction::Add { path: None }),
            Intent::GitCommit => Action::Git(GitAction::Commit { message: None }),
            Intent::GitCheckout => Action::Git(GitAction::Checkout { branch: None }),
            Intent::GitBranch => Action::Git(GitAction::Branch),
            Intent::GitClone => Action::Git(GitAction::Clone { repo: None }),
            Intent::GitLog => Action::Git(GitAction::Log),
            Intent::GitPull => Action::Git(GitAction::Pull),
            Intent::GitPush => Action::Git(GitAction::Push),
            Intent::GitDiff => Action::Git(GitAction::Diff),
            Intent::GitReset => Action::Git(GitAction::Reset),
            Intent::Unknown | Intent::Forbidden => return None,
        };
        Some(action)
    }

    pub fn intent(&self) -> Intent {
        match self {
            Action::Navigation { .. } => Intent::Navigation,
            Action::ListFiles => Intent::ListFiles,
            Action::Pwd => Intent::Pwd,
            Action::CreateFile { .. } => Intent::CreateFile,
            Action::CreateDir { .. } => Intent::CreateDir,
            Action::ReadFile { .. } => Intent::ReadFile,
            Action::DeleteFile { .. } => Intent::DeleteFile,
            Action::DeleteDir { .. } => Intent::DeleteDir,
            Action::CopyFile { .. } => Intent::CopyFile,
            Action::MoveFile { .. } => Intent::MoveFile,
            Action::RenameFile { .. } => Intent::RenameFile,
            Action::ProcessList => Intent::ProcessList,
            Action::ProcessKill { .. } => Intent::ProcessKill,
            Action::SystemInfo => Intent::SystemInfo,
            Action::NetworkInfo => Intent::NetworkInfo,
            Action::Git(git) => match git {
                GitAction::Status => Intent::GitStatus,
                GitAction::Add { .. } => Intent::GitAdd,
                GitAction::Commit { .. } => Intent::GitCommit,
                GitAction::Checkout { .. } => Intent::GitCheckout,
                GitAction::Branch => Intent::GitBranch,
                GitAction::Clone { .. } => Intent::GitClone,
                GitAction::Log => Intent::GitLog,
                GitAction::Pull => Intent::GitPull,
                GitAction::Push => Intent::GitPush,
                GitAction::Diff => Intent::GitDiff,
                GitAction::Reset => Intent::GitReset,
            },
        }
    }

    /// Mutable handle on a named slot; `None` when this action has no such
    /// slot.
    pub fn slot_mut(&mut self, name: SlotName) -> Option<&mut Option<String>> {
        match (self, name) {
            (Action::Navigation { path }, SlotName::Path)
            | (Action::CreateFile { path }, SlotName::Path)
            | (Action::CreateDir { path }, SlotName::Path)
            | (Action::ReadFile { path }, SlotName::Path)
            | (Action::DeleteFile { path }, SlotName::Path)
            | (Action::DeleteDir { path }, SlotName::Path)
            | (Action::Git(GitAction::Add { path }), SlotName::Path) => Some(path),
            (Action::CopyFile { src, .. }, SlotName::Src)
            | (Action::MoveFile { src, .. }, SlotName::Src)
            | (Action::RenameFile { src, .. }, SlotName::Src) => Some(src),
            (Action::CopyFile { dst, .. }, SlotName::Dst)
            | (Action::MoveFile { dst, .. }, SlotName::Dst)
            | (Action::RenameFile { dst, .. }, SlotName::Dst) => Some(dst),
            (Action::ProcessKill { target }, SlotName::Target) => Some(target),
            (Action::Git(GitAction::Checkout { branch }), SlotName::Branch) => Some(branch),
            (Action::Git(GitAction::Clone { repo }), SlotName::Repo) => Some(repo),
            (Action::Git(GitAction::Commit { message }), SlotName::Message) => Some(message),
            _ => None,
        }
    }

    pub fn slot(&self, name: SlotName) -> Option<&str> {
        let field = match (self, name) {
            (Action::Navigation { path }, SlotName::Path)
            | (Action::CreateFile { path }, SlotName::Path)
            | (Action::CreateDir { path }, SlotName::Path)
            | (Action::ReadFile { path }, SlotName::Path)
            | (Action::DeleteFile { path }, SlotName::Path)
            | (Action::DeleteDir { path }, SlotName::Path)
            | (Action::Git(GitAction::Add { path }), SlotName::Path) => path,
            (Action::CopyFile { src, .. }, SlotName::Src)
            | (Action::MoveFile { src, .. }, SlotName::Src)
            | (Action::RenameFile { src, .. }, SlotName::Src) => src,
            (Action::CopyFile { dst, .. }, SlotName::Dst)
            | (Action::MoveFile { dst, .. }, SlotName::Dst)
            | (Action::RenameFile { dst, .. }, SlotName::Dst) => dst,
            (Action::ProcessKill { target }, SlotName::Target) => target,
            (Action::Git(GitAction::Checkout { branch }), SlotName::Branch) => branch,
            (Action::Git(GitAction::Clone { repo }), SlotName::Repo) => repo,
            (Action::Git(GitAction::Commit { message }), SlotName::Message) => message,
            _ => return None,
        };
        field.as_deref()
    }

    pub fn set_slot(&mut self, name: SlotName, value: impl Into<String>) -> bool {
        match self.slot_mut(name) {
            Some(slot) => {
                *slot = Some(value.into());
                true
            }
            None => false,
        }
    }

    /// Filled slots by name, for explain output and traces.
    pub fn slots(&self) -> BTreeMap<&'static str, String> {
        let mut out = BTreeMap::new();
        for name in [
            SlotName::Path,
            SlotName::Src,
            SlotName::Dst,
            SlotName::Branch,
            SlotName::Repo,
            SlotName::Target,
            SlotName::Message,
        ] {
            if let Some(value) = self.slot(name) {
                out.insert(name.as_str(), value.to_string());
            }
        }
        out
    }

    /// The slot a file-system target lives in: `src` for two-path intents,
    /// `path` for single-path ones.
    pub fn target_slot(&self) -> Option<SlotName> {
        match self {
            Action::CopyFile { .. } | Action::MoveFile { .. } | Action::RenameFile { .. } => {
                Some(SlotName::Src)
            }
            Action::Navigation { .. }
            | Action::CreateFile { .. }
            | Action::CreateDir { .. }
            | Action::ReadFile { .. }
            | Action::DeleteFile { .. }
            | Action::DeleteDir { .. }
            | Action::Git(GitAction::Add { .. }) => Some(SlotName::Path),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Step {
    /// The input segment this step was resolved from.
    pub text: String,
    pub action: Action,
    pub confidence: f32,
    pub from_pronoun: bool,
    /// Wildcard expression; takes precedence over the target slot at
    /// execution time.
    pub pattern: Option<String>,
}

impl Step {
    pub fn new(text: &str, action: Action, confidence: f32) -> Self {
        Self {
            text: text.to_string(),
            action,
            confidence,
            from_pronoun: false,
            pattern: None,
        }
    }

    pub fn intent(&self) -> Intent {
        self.action.intent()
    }
}

/// Ordered steps; order is execution order.
pub type Plan = Vec<Step>;

static CONNECTIVES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\band then\b|\bthen\b|\band\b|;").unwrap());

/// Split one input line on "and", "then", "and then" and ";".
pub fn split_into_steps(text: &str) -> Vec<String> {
    CONNECTIVES
        .split(text)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}
