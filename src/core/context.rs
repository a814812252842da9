//! System context: OS family, working directory, git and container state.
//!
//! Built once per invocation and read-only afterwards. Every probe is
//! best-effort; a missing binary, a non-repo directory or a stopped daemon
//! degrade the matching flags to false/empty instead of failing.

use crate::core::process::Shell;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
    Windows,
    MacOs,
    Linux,
    Unknown,
}

impl OsFamily {
    pub fn host() -> Self {
        match std::env::consts::OS {
            "windows" => OsFamily::Windows,
            "macos" => OsFamily::MacOs,
            "linux" => OsFamily::Linux,
            _ => OsFamily::Unknown,
        }
    }

    /// Unknown hosts get the POSIX command table.
    pub fn is_windows(self) -> bool {
        self == OsFamily::Windows
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OsFamily::Windows => "windows",
            OsFamily::MacOs => "macos",
            OsFamily::Linux => "linux",
            OsFamily::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemContext {
    pub os_type: OsFamily,
    pub cwd: PathBuf,
    pub is_git_repo: bool,
    pub git_branch: Option<String>,
    pub git_dirty: bool,
    pub docker_available: bool,
    pub docker_running: bool,
    pub docker_containers: Vec<String>,
}

impl SystemContext {
    /// A context with no git or container information.
    pub fn bare(os_type: OsFamily, cwd: impl Into<PathBuf>) -> Self {
        Self {
            os_type,
            cwd: cwd.into(),
            is_git_repo: false,
            git_branch: None,
            git_dirty: false,
            docker_available: false,
            docker_running: false,
            docker_containers: Vec::new(),
        }
    }

    /// Same context rooted at a different working directory. Used after a
    /// navigation step inside a multi-step plan.
    pub fn with_cwd(&self, cwd: &Path) -> Self {
        let mut next = self.clone();
        next.cwd = cwd.to_path_buf();
        next
    }
}

pub struct ContextResolver<'a> {
    shell: &'a dyn Shell,
}

impl<'a> ContextResolver<'a> {
    pub fn new(shell: &'a dyn Shell) -> Self {
        Self { shell }
    }

    pub fn resolve(&self, cwd: &Path) -> SystemContext {
        let mut ctx = SystemContext::bare(OsFamily::host(), cwd);
        self.resolve_git(&mut ctx);
        self.resolve_docker(&mut ctx);
        tracing::debug!(
            os = %ctx.os_type,
            cwd = %ctx.cwd.display(),
            git = ctx.is_git_repo,
            docker = ctx.docker_available,
            "context resolved"
        );
        ctx
    }

    fn probe_stdout(&self, program: &str, args: &[&str], cwd: &Path) -> Option<String> {
        self.shell
            .probe(program, args, cwd)
            .filter(|out| out.success())
            .map(|out| out.stdout.trim().to_string())
    }

    fn resolve_git(&self, ctx: &mut SystemContext) {
        let cwd = ctx.cwd.clone();
        if self
            .probe_stdout("git", &["rev-parse", "--is-inside-work-tree"], &cwd)
            .is_none()
        {
            return;
        }
        ctx.is_git_repo = true;

        ctx.git_branch = self
            .probe_stdout("git", &["branch", "--show-current"], &cwd)
            .filter(|branch| !branch.is_empty());

        if let Some(status) = self.probe_stdout("git", &["status", "--porcelain"], &cwd) {
            ctx.git_dirty = !status.is_empty();
        }
    }

    fn resolve_docker(&self, ctx: &mut SystemContext) {
        let cwd = ctx.cwd.clone();
        if self.probe_stdout("docker", &["info"], &cwd).is_none() {
            return;
        }
        ctx.docker_available = true;
        ctx.docker_running = true;

        if let Some(names) = self.probe_stdout("docker", &["ps", "--format", "{{.Names}}"], &cwd) {
            ctx.docker_containers = names
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect();
        }
    }
}
