//! The closed set of intent tags and their slot requirements.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    Navigation,
    ListFiles,
    Pwd,
    CreateFile,
    CreateDir,
    ReadFile,
    DeleteFile,
    DeleteDir,
    CopyFile,
    MoveFile,
    RenameFile,
    ProcessList,
    ProcessKill,
    SystemInfo,
    NetworkInfo,
    GitStatus,
    GitAdd,
    GitCommit,
    GitCheckout,
    GitBranch,
    GitClone,
    GitLog,
    GitPull,
    GitPush,
    GitDiff,
    GitReset,
    Unknown,
    Forbidden,
}

/// Named argument positions an intent can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotName {
    Path,
    Src,
    Dst,
    Branch,
    Repo,
    Target,
    Message,
}

impl SlotName {
    pub fn as_str(self) -> &'static str {
        match self {
            SlotName::Path => "path",
            SlotName::Src => "src",
            SlotName::Dst => "dst",
            SlotName::Branch => "branch",
            SlotName::Repo => "repo",
            SlotName::Target => "target",
            SlotName::Message => "message",
        }
    }
}

const ALL: &[(Intent, &str)] = &[
    (Intent::Navigation, "NAVIGATION"),
    (Intent::ListFiles, "LIST_FILES"),
    (Intent::Pwd, "PWD"),
    (Intent::CreateFile, "CREATE_FILE"),
    (Intent::CreateDir, "CREATE_DIR"),
    (Intent::ReadFile, "READ_FILE"),
    (Intent::DeleteFile, "DELETE_FILE"),
    (Intent::DeleteDir, "DELETE_DIR"),
    (Intent::CopyFile, "COPY_FILE"),
    (Intent::MoveFile, "MOVE_FILE"),
    (Intent::RenameFile, "RENAME_FILE"),
    (Intent::ProcessList, "PROCESS_LIST"),
    (Intent::ProcessKill, "PROCESS_KILL"),
    (Intent::SystemInfo, "SYSTEM_INFO"),
    (Intent::NetworkInfo, "NETWORK_INFO"),
    (Intent::GitStatus, "GIT_STATUS"),
    (Intent::GitAdd, "GIT_ADD"),
    (Intent::GitCommit, "GIT_COMMIT"),
    (Intent::GitCheckout, "GIT_CHECKOUT"),
    (Intent::GitBranch, "GIT_BRANCH"),
    (Intent::GitClone, "GIT_CLONE"),
    (Intent::GitLog, "GIT_LOG"),
    (Intent::GitPull, "GIT_PULL"),
    (Intent::GitPush, "GIT_PUSH"),
    (Intent::GitDiff, "GIT_DIFF"),
    (Intent::GitReset, "GIT_RESET"),
    (Intent::Unknown, "UNKNOWN"),
    (Intent::Forbidden, "FORBIDDEN"),
];

impl Intent {
    pub fn label(self) -> &'static str {
        ALL.iter()
            .find(|(intent, _)| *intent == self)
            .map(|(_, label)| *label)
            .unwrap_or("UNKNOWN")
    }

    pub fn is_git(self) -> bool {
        self.label().starts_with("GIT_")
    }

    pub fn required_slots(self) -> &'static [SlotName] {
        match self {
            Intent::Navigation
            | Intent::CreateFile
            | Intent::CreateDir
            | Intent::ReadFile
            | Intent::DeleteFile
            | Intent::DeleteDir
            | Intent::GitAdd => &[SlotName::Path],
            Intent::CopyFile | Intent::MoveFile | Intent::RenameFile => {
                &[SlotName::Src, SlotName::Dst]
            }
            Intent::ProcessKill => &[SlotName::Target],
            Intent::GitCheckout => &[SlotName::Branch],
            Intent::GitClone => &[SlotName::Repo],
            _ => &[],
        }
    }

    /// Intents that accept a wildcard in place of their file target.
    pub fn accepts_pattern(self) -> bool {
        matches!(
            self,
            Intent::DeleteFile | Intent::MoveFile | Intent::CopyFile
        )
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        // Older classifier builds emit SHOW_PATH for the working-directory intent.
        if upper == "SHOW_PATH" {
            return Ok(Intent::Pwd);
        }
        if upper == "INVALID" {
            return Ok(Intent::Unknown);
        }
        ALL.iter()
            .find(|(_, label)| *label == upper)
            .map(|(intent, _)| *intent)
            .ok_or_else(|| format!("unknown intent label: {}", s))
    }
}
