//! Process execution: the only place hcmd spawns children.
//!
//! Two entry points: `run` for a synthesized command string handed to the
//! platform shell, and `probe` for argv-style context probes (git, docker).
//! Neither enforces a timeout; a hung child hangs the invocation.

use crate::core::context::OsFamily;
use crate::core::error::HcmdError;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::process::{Command, Stdio};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn ok(stdout: &str) -> Self {
        Self {
            code: 0,
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    pub fn failed(code: i32, stderr: &str) -> Self {
        Self {
            code,
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }

    pub fn success(&self) -> bool {
        self.code == 0
    }
}

pub trait Shell {
    /// Run a literal command string through the platform shell.
    fn run(&self, command: &str, cwd: &Path, os: OsFamily) -> Result<ProcessOutput, HcmdError>;

    /// Run `program args...` directly. `None` when the binary cannot be
    /// spawned at all.
    fn probe(&self, program: &str, args: &[&str], cwd: &Path) -> Option<ProcessOutput>;
}

/// Spawns real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemShell;

impl SystemShell {
    fn shell_command(command: &str, os: OsFamily) -> Command {
        match os {
            OsFamily::Windows => {
                let mut cmd = Command::new("powershell");
                cmd.args(["-NoProfile", "-NonInteractive", "-Command", command]);
                cmd
            }
            _ => {
                let shell = std::env::var("SHELL")
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| "/bin/sh".to_string());
                let mut cmd = Command::new(shell);
                cmd.args(["-c", command]);
                cmd
            }
        }
    }
}

impl Shell for SystemShell {
    fn run(&self, command: &str, cwd: &Path, os: OsFamily) -> Result<ProcessOutput, HcmdError> {
        let output = Self::shell_command(command, os)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .output()
            .map_err(HcmdError::IoError)?;
        Ok(ProcessOutput {
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }

    fn probe(&self, program: &str, args: &[&str], cwd: &Path) -> Option<ProcessOutput> {
        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .output();
        match output {
            Ok(output) => Some(ProcessOutput {
                code: output.status.code().unwrap_or(-1),
                stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
            Err(e) => {
                tracing::debug!(program, error = %e, "probe could not be spawned");
                None
            }
        }
    }
}

/// Scripted shell: records every command and answers from tables.
///
/// Commands not scripted succeed with empty output; probes not scripted
/// behave like a missing binary.
#[derive(Debug, Default)]
pub struct RecordingShell {
    runs: RefCell<Vec<String>>,
    run_outputs: HashMap<String, ProcessOutput>,
    probe_outputs: HashMap<String, ProcessOutput>,
}

impl RecordingShell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the result of a `run` whose command string equals `command`.
    pub fn with_run(mut self, command: &str, output: ProcessOutput) -> Self {
        self.run_outputs.insert(command.to_string(), output);
        self
    }

    /// Script a probe keyed by `"program arg1 arg2"`.
    pub fn with_probe(mut self, argv: &str, output: ProcessOutput) -> Self {
        self.probe_outputs.insert(argv.to_string(), output);
        self
    }

    pub fn commands(&self) -> Vec<String> {
        self.runs.borrow().clone()
    }
}

impl Shell for RecordingShell {
    fn run(&self, command: &str, _cwd: &Path, _os: OsFamily) -> Result<ProcessOutput, HcmdError> {
        self.runs.borrow_mut().push(command.to_string());
        Ok(self
            .run_outputs
            .get(command)
            .cloned()
            .unwrap_or_else(|| ProcessOutput::ok("")))
    }

    fn probe(&self, program: &str, args: &[&str], _cwd: &Path) -> Option<ProcessOutput> {
        let mut key = program.to_string();
        for arg in args {
            key.push(' ');
            key.push_str(arg);
        }
        self.probe_outputs.get(&key).cloned()
    }
}
