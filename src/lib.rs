//! hcmd: natural language in, shell commands out.
//!
//! **hcmd turns one plain-English line into OS-appropriate shell commands and
//! runs them safely.**
//!
//! # Pipeline
//!
//! One input line becomes a plan of steps. Each step goes through:
//!
//! - **IntentResolver** (`core::resolver`): rule table, git follow-ups, then
//!   the NLU oracle, then slot extraction with memory fallback
//! - **AmbiguityResolver** (`core::ambiguity`): bare names searched under
//!   the working directory
//! - **PatternExpander** (`core::pattern`): wildcards become file lists
//! - **CommandSynthesizer** (`core::synth` + `plugins`): one literal command
//!   per intent and OS family
//! - **SafetyValidator** (`core::safety`): protected paths, destructive
//!   categories, git outside a repo
//! - **RollbackBuilder** (`core::rollback`): inverse commands for reversible
//!   intents
//!
//! `core::executor::PlanExecutor` drives the state machine and updates
//! `core::memory::SessionMemory`, which is loaded once at start and saved
//! once at the end.
//!
//! # Examples
//!
//! ```bash
//! hcmd go to downloads
//! hcmd create notes.txt and then list files
//! hcmd --dry-run move *.txt to backup
//! hcmd --explain delete it
//! hcmd rollback
//! ```
//!
//! # Crate Structure
//!
//! - [`core`]: the engine (memory, context, resolution, synthesis, safety, execution)
//! - [`plugins`]: intent families implementing `CommandFamily`

mod cli;
pub mod core;
pub mod plugins;

use cli::{Cli, Request};
use crate::core::{
    config::Config,
    context::ContextResolver,
    error::HcmdError,
    executor::{ExecutorOptions, PlanExecutor, PlanReport},
    help,
    keyword::KeywordOracle,
    memory::SessionMemory,
    output,
    process::SystemShell,
    prompt::StdinPrompter,
    time,
};

use clap::Parser;
use std::io::IsTerminal;

/// Parse the command line, run the request, return the process exit code.
pub fn run() -> Result<i32, HcmdError> {
    let mut cli = Cli::parse();
    cli.absorb_trailing_flags();
    if !std::io::stdout().is_terminal() || cli.json {
        colored::control::set_override(false);
    }

    let request = cli.request();
    match &request {
        Request::Version => {
            println!("hcmd {}", env!("CARGO_PKG_VERSION"));
            return Ok(0);
        }
        Request::Help(topic) => {
            println!("{}", help::help_text(topic.as_deref())?);
            return Ok(0);
        }
        Request::Rollback | Request::Instruction(_) => {}
    }

    let config = Config::load(cli.config.as_deref())?;
    let cwd = std::env::current_dir()?;
    let shell = SystemShell;
    let ctx = ContextResolver::new(&shell).resolve(&cwd);
    let mut memory = SessionMemory::load(&config.memory_path());
    let oracle = KeywordOracle;
    let mut prompter = StdinPrompter::new(cli.yes || config.assume_yes);
    let options = ExecutorOptions::from_config(&config, cli.dry_run, cli.json);
    let mut executor = PlanExecutor::new(&oracle, &shell, &mut prompter, &config, options);

    match request {
        Request::Rollback => {
            let report = executor.rollback(&ctx, &mut memory);
            finish(&report, cli.json, "rollback")
        }
        Request::Instruction(text) if cli.explain => {
            let steps = executor.explain(&text, &ctx, &memory)?;
            let body = serde_json::json!({ "input": text, "context": ctx, "steps": steps });
            let envelope = time::report_envelope("explain", "ok", body);
            println!("{}", serde_json::to_string_pretty(&envelope)?);
            Ok(0)
        }
        Request::Instruction(text) => {
            let report = executor.run(&text, &ctx, &mut memory);
            let mode = if cli.dry_run { "dry-run" } else { "execute" };
            finish(&report, cli.json, mode)
        }
        Request::Help(_) | Request::Version => Ok(0),
    }
}

fn finish(report: &PlanReport, json: bool, mode: &str) -> Result<i32, HcmdError> {
    if json {
        let status = if report.succeeded() { "ok" } else { "error" };
        let envelope = time::report_envelope(mode, status, serde_json::to_value(report)?);
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    }
    if let Some(error) = &report.error {
        output::print_error(error);
    } else if let Some(step) = report.steps.iter().find(|s| s.declined) {
        output::print_error(&format!("Aborted: not confirmed: {}", step.input));
    }
    Ok(report.exit_code())
}
