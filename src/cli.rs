//! CLI struct definitions for the hcmd command line.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "hcmd",
    version = env!("CARGO_PKG_VERSION"),
    about = "Turn a plain-English instruction into OS-appropriate shell commands, check them, run them, and remember enough to undo them."
)]
pub(crate) struct Cli {
    /// Print the commands instead of running them.
    #[clap(long)]
    pub dry_run: bool,
    /// Resolve every step and print a JSON diagnostic trace; run nothing.
    #[clap(long)]
    pub explain: bool,
    /// Print the execution report as JSON.
    #[clap(long)]
    pub json: bool,
    /// Config file (default: $HCMD_HOME/config.toml).
    #[clap(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Answer yes to every confirmation. Choices between files still ask.
    #[clap(long, short = 'y')]
    pub yes: bool,
    /// The instruction, or `help [topic]`, `rollback`, `version`.
    #[clap(trailing_var_arg = true, allow_hyphen_values = true)]
    pub words: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Request {
    Help(Option<String>),
    Rollback,
    Version,
    Instruction(String),
}

impl Cli {
    /// Flags typed after the instruction land in `words`; pull them back out.
    pub fn absorb_trailing_flags(&mut self) {
        let mut kept = Vec::with_capacity(self.words.len());
        for word in self.words.drain(..) {
            match word.as_str() {
                "--dry-run" => self.dry_run = true,
                "--explain" => self.explain = true,
                "--json" => self.json = true,
                "--yes" | "-y" => self.yes = true,
                _ => kept.push(word),
            }
        }
        self.words = kept;
    }

    pub fn request(&self) -> Request {
        let Some(first) = self.words.first() else {
            return Request::Help(None);
        };
        let rest = &self.words[1..];
        match first.to_lowercase().as_str() {
            "help" => Request::Help(rest.first().cloned()),
            "rollback" | "undo" if rest.is_empty() => Request::Rollback,
            "version" if rest.is_empty() => Request::Version,
            _ => Request::Instruction(self.words.join(" ")),
        }
    }
}
