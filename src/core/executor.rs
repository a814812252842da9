//! Plan execution state machine.
//!
//! ```text
//! PARSING -> (PLAN_CONFIRM) -> per step:
//!     AMBIGUITY_CHECK -> PATTERN_CHECK -> SYNTHESIZE -> SAFETY_CHECK
//!     -> EXECUTE -> MEMORY_UPDATE
//! -> DONE | FAILED
//! ```
//!
//! Any step failure aborts the rest of the plan. A declined confirmation
//! only skips its own step. Session memory is saved once, at the end of a
//! plan that did not fail, and never in dry-run mode.

use crate::core::ambiguity::{self, ClarificationRequest};
use crate::core::config::Config;
use crate::core::context::SystemContext;
use crate::core::error::HcmdError;
use crate::core::intent::{Intent, SlotName};
use crate::core::memory::SessionMemory;
use crate::core::oracle::Oracle;
use crate::core::output;
use crate::core::pattern;
use crate::core::process::Shell;
use crate::core::prompt::Prompter;
use crate::core::resolver::IntentResolver;
use crate::core::rollback::RollbackBuilder;
use crate::core::safety::{SafetyResult, SafetyValidator};
use crate::core::step::{Action, Plan, Step, split_into_steps};
use crate::core::synth::{CommandSynthesizer, landing_path, path_slot, rename_paths};
use crate::core::trace::{self, StepTrace, TraceStatus};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct ExecutorOptions {
    pub dry_run: bool,
    /// Suppress live terminal output (used for `--json`).
    pub quiet: bool,
    pub trace_path: Option<PathBuf>,
    pub protected_paths: Vec<String>,
}

impl ExecutorOptions {
    pub fn from_config(config: &Config, dry_run: bool, quiet: bool) -> Self {
        Self {
            dry_run,
            quiet,
            trace_path: config.trace.then(|| config.trace_path()),
            protected_paths: config.protected_paths.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Executed,
    Navigated,
    DryRun,
    Skipped,
    NoMatches,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub input: String,
    pub intent: String,
    pub commands: Vec<String>,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    pub rollback: Vec<String>,
    /// A confirmation for this step (or part of its batch) was declined.
    pub declined: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepReport {
    fn new(input: &str, intent: &str) -> Self {
        Self {
            input: input.to_string(),
            intent: intent.to_string(),
            commands: Vec::new(),
            status: StepStatus::Executed,
            output: None,
            warning: None,
            rollback: Vec::new(),
            declined: false,
            error: None,
        }
    }

    fn for_step(step: &Step) -> Self {
        Self::new(&step.text, step.intent().label())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PlanReport {
    pub dry_run: bool,
    pub steps: Vec<StepReport>,
    pub error: Option<String>,
    /// The plan confirmation was declined.
    pub cancelled: bool,
}

impl PlanReport {
    pub fn succeeded(&self) -> bool {
        self.error.is_none() && !self.cancelled && !self.steps.iter().any(|s| s.declined)
    }

    pub fn exit_code(&self) -> i32 {
        if self.succeeded() { 0 } else { 1 }
    }
}

/// Per-step diagnostics for `--explain`. Nothing is executed or prompted.
#[derive(Debug, Clone, Serialize)]
pub struct ExplainStep {
    pub input: String,
    pub intent: String,
    pub confidence: f32,
    pub slots: BTreeMap<&'static str, String>,
    pub from_pronoun: bool,
    pub pattern: Option<String>,
    pub matches: Vec<String>,
    pub commands: Vec<String>,
    pub safety: Vec<SafetyResult>,
    pub rollback: Vec<String>,
    pub clarification: Option<ClarificationRequest>,
    pub error: Option<String>,
}

/// Directory a NAVIGATION action moves to, normalized.
fn navigation_target(action: &Action, ctx: &SystemContext) -> Option<String> {
    match action {
        Action::Navigation { .. } => path_slot(action, SlotName::Path, ctx),
        _ => None,
    }
}

/// Record what a successful single-target step touched. `ctx` is the
/// context the step ran in.
pub fn remember(memory: &mut SessionMemory, action: &Action, ctx: &SystemContext) {
    match action {
        Action::Navigation { .. }
        | Action::CreateFile { .. }
        | Action::CreateDir { .. }
        | Action::ReadFile { .. }
        | Action::DeleteFile { .. }
        | Action::DeleteDir { .. } => {
            if let Some(path) = path_slot(action, SlotName::Path, ctx) {
                memory.push_object(&path);
            }
        }
        Action::RenameFile { .. } => {
            if let Some((src, dst)) = rename_paths(action, ctx) {
                memory.set_last_src(&src);
                memory.set_last_dst(&dst);
                memory.push_object(&dst);
            }
        }
        Action::MoveFile { .. } | Action::CopyFile { .. } => {
            let src = path_slot(action, SlotName::Src, ctx);
            let dst = path_slot(action, SlotName::Dst, ctx);
            if let (Some(src), Some(dst)) = (src, dst) {
                memory.set_last_src(&src);
                memory.set_last_dst(&dst);
                memory.push_object(&landing_path(&src, &dst));
            }
        }
        Action::Git(_) => memory.set_last_git_intent(action.intent().label()),
        _ => {}
    }
}

pub struct PlanExecutor<'a> {
    resolver: IntentResolver<'a>,
    shell: &'a dyn Shell,
    prompter: &'a mut dyn Prompter,
    safety: SafetyValidator,
    options: ExecutorOptions,
}

impl<'a> PlanExecutor<'a> {
    pub fn new(
        oracle: &'a dyn Oracle,
        shell: &'a dyn Shell,
        prompter: &'a mut dyn Prompter,
        config: &Config,
        options: ExecutorOptions,
    ) -> Self {
        let safety = SafetyValidator::new(options.protected_paths.clone());
        Self {
            resolver: IntentResolver::new(oracle, config),
            shell,
            prompter,
            safety,
            options,
        }
    }

    /// PARSING: split on connectives and resolve every segment up front.
    /// Later segments see the memory and working directory earlier ones
    /// would leave behind, so "create a.txt and then delete it" resolves.
    pub fn parse(
        &self,
        input: &str,
        ctx: &SystemContext,
        memory: &SessionMemory,
    ) -> Result<Plan, HcmdError> {
        let segments = split_into_steps(input);
        if segments.is_empty() {
            return Err(HcmdError::InvalidRequest("Empty instruction".to_string()));
        }
        let mut projected = memory.clone();
        let mut cursor = ctx.clone();
        let mut plan = Plan::new();
        for segment in segments {
            let step = self.resolver.resolve(&segment, &cursor, &projected)?;
            if step.pattern.is_none() {
                remember(&mut projected, &step.action, &cursor);
            }
            if let Some(dir) = navigation_target(&step.action, &cursor) {
                cursor = cursor.with_cwd(Path::new(&dir));
            }
            plan.push(step);
        }
        Ok(plan)
    }

    pub fn run(
        &mut self,
        input: &str,
        ctx: &SystemContext,
        memory: &mut SessionMemory,
    ) -> PlanReport {
        let mut report = PlanReport {
            dry_run: self.options.dry_run,
            ..PlanReport::default()
        };

        let plan = match self.parse(input, ctx, memory) {
            Ok(plan) => plan,
            Err(e) => {
                self.trace(input, "UNKNOWN", "", TraceStatus::Failed, Some(&e.to_string()));
                report.error = Some(e.to_string());
                return report;
            }
        };

        if plan.len() > 1 && !self.options.dry_run && !self.confirm_plan(&plan) {
            report.cancelled = true;
            report.error = Some(HcmdError::Aborted("plan not confirmed".to_string()).to_string());
            return report;
        }

        let undo_before = memory.history_len();
        let mut cursor = ctx.clone();
        for mut step in plan {
            match self.run_step(&mut step, &mut cursor, memory) {
                Ok(step_report) => report.steps.push(step_report),
                Err(e) => {
                    tracing::debug!(input = %step.text, error = %e, "step failed, aborting plan");
                    self.trace(
                        &step.text,
                        step.intent().label(),
                        "",
                        TraceStatus::Failed,
                        Some(&e.to_string()),
                    );
                    let mut failed = StepReport::for_step(&step);
                    failed.status = StepStatus::Failed;
                    failed.error = Some(e.to_string());
                    report.steps.push(failed);
                    report.error = Some(e.to_string());
                    break;
                }
            }
        }

        // A failed plan may already have run reversible commands; keep their undo.
        let ran_reversible = memory.history_len() > undo_before;
        if !self.options.dry_run
            && (report.error.is_none() || ran_reversible)
            && let Err(e) = memory.save()
        {
            if report.error.is_some() {
                tracing::warn!(error = %e, "session memory not saved after failure");
            } else {
                report.error = Some(format!("Could not save session memory: {}", e));
            }
        }
        report
    }

    fn confirm_plan(&mut self, plan: &Plan) -> bool {
        let items: Vec<(String, String)> = plan
            .iter()
            .map(|step| (step.intent().label().to_string(), step.text.clone()))
            .collect();
        for line in output::plan_lines(&items) {
            self.say(&line);
        }
        self.prompter
            .confirm(&format!("Run these {} steps?", plan.len()))
    }

    fn run_step(
        &mut self,
        step: &mut Step,
        ctx: &mut SystemContext,
        memory: &mut SessionMemory,
    ) -> Result<StepReport, HcmdError> {
        // AMBIGUITY_CHECK
        if let Some(request) = ambiguity::detect(step, ctx, memory) {
            if !request.is_recoverable() {
                return Err(request.into_error());
            }
            match self.prompter.choose(&request.reason, &request.options) {
                Some(index) => ambiguity::apply_choice(step, &request, index)?,
                None => return Err(request.into_error()),
            }
        }

        // PATTERN_CHECK
        if let Some(pattern) = step.pattern.clone()
            && step.intent().accepts_pattern()
        {
            return self.run_batch(step, &pattern, ctx, memory);
        }

        // SYNTHESIZE
        let command = CommandSynthesizer::synthesize(&step.action, ctx)?;
        let mut report = StepReport::for_step(step);
        report.commands.push(command.clone());

        // SAFETY_CHECK
        let verdict = self.safety.validate(&step.action, &command, ctx);
        if let Some(warning) = verdict.warning.clone() {
            self.warn(&warning);
            report.warning = Some(warning.clone());
            if !self.options.dry_run && !self.prompter.confirm(&format!("Run `{}`?", command)) {
                report.status = StepStatus::Skipped;
                report.declined = true;
                self.trace(&step.text, step.intent().label(), &command, TraceStatus::Skipped, Some(&warning));
                return Ok(report);
            }
        }

        let rollback = RollbackBuilder::build(&step.action, ctx);

        // EXECUTE
        if self.options.dry_run {
            self.echo(&command);
            report.status = StepStatus::DryRun;
            report.rollback.extend(rollback);
            self.trace(&step.text, step.intent().label(), &command, TraceStatus::DryRun, None);
            if let Some(dir) = navigation_target(&step.action, ctx) {
                *ctx = ctx.with_cwd(Path::new(&dir));
            }
            return Ok(report);
        }

        let before = ctx.clone();
        if let Some(dir) = navigation_target(&step.action, ctx) {
            // A child cannot move its parent shell: print the cd for the caller.
            if !Path::new(&dir).is_dir() {
                return Err(HcmdError::ExecutionFailure(format!("No such directory: {}", dir)));
            }
            self.echo(&command);
            *ctx = ctx.with_cwd(Path::new(&dir));
            report.status = StepStatus::Navigated;
        } else {
            self.echo(&command);
            report.output = self.execute(&command, ctx)?;
            report.status = StepStatus::Executed;
        }

        // MEMORY_UPDATE
        remember(memory, &step.action, &before);
        if let Some(undo) = rollback {
            memory.push_rollback(undo.clone());
            report.rollback.push(undo);
        }
        self.trace(&step.text, step.intent().label(), &command, TraceStatus::Executed, None);
        Ok(report)
    }

    /// Run one wildcard step: one command per matched file, no
    /// single-target memory updates.
    fn run_batch(
        &mut self,
        step: &Step,
        pattern: &str,
        ctx: &SystemContext,
        memory: &mut SessionMemory,
    ) -> Result<StepReport, HcmdError> {
        let mut report = StepReport::for_step(step);
        let intent = step.intent();
        let relocates = matches!(intent, Intent::MoveFile | Intent::CopyFile);
        let dst = if relocates {
            path_slot(&step.action, SlotName::Dst, ctx)
        } else {
            None
        };
        let mut files = pattern::expand(pattern, ctx);
        // Matches already inside the destination would land on themselves.
        if let Some(dst) = dst.as_deref() {
            files.retain(|file| landing_path(file, dst) != *file);
        }
        if files.is_empty() {
            self.say("No files matched");
            report.status = StepStatus::NoMatches;
            self.trace(&step.text, intent.label(), "", TraceStatus::Skipped, Some("No files matched"));
            return Ok(report);
        }

        let slot = step.action.target_slot().ok_or_else(|| {
            HcmdError::UnsupportedIntent(format!("{} does not take a file pattern", intent))
        })?;

        if files.len() > 1 && relocates {
            let dst = dst.ok_or_else(|| {
                HcmdError::UnsupportedIntent(format!("Unsupported or invalid command for {}", intent))
            })?;
            if !Path::new(&dst).is_dir() {
                return Err(HcmdError::InvalidRequest(format!(
                    "Destination for {} files must be an existing directory: {}",
                    files.len(),
                    dst
                )));
            }
        }

        let mut items = Vec::with_capacity(files.len());
        for file in &files {
            let mut action = step.action.clone();
            action.set_slot(slot, file.clone());
            let command = CommandSynthesizer::synthesize(&action, ctx)?;
            let verdict = self.safety.validate(&action, &command, ctx);
            report.commands.push(command.clone());
            items.push((action, command, verdict));
        }

        let destructive = matches!(intent, Intent::DeleteFile | Intent::MoveFile);
        if destructive && !self.options.dry_run {
            for (_, command, verdict) in &items {
                self.say(&format!("  {}", command));
                if let Some(warning) = &verdict.warning {
                    self.warn(warning);
                }
            }
            let question = format!("Apply {} to {} files?", intent, items.len());
            if !self.prompter.confirm(&question) {
                report.status = StepStatus::Skipped;
                report.declined = true;
                self.trace(&step.text, intent.label(), "", TraceStatus::Skipped, Some("batch declined"));
                return Ok(report);
            }
        }

        for (action, command, verdict) in items {
            if self.options.dry_run {
                self.echo(&command);
                if let Some(warning) = &verdict.warning {
                    self.warn(warning);
                }
                report.rollback.extend(RollbackBuilder::build(&action, ctx));
                self.trace(&step.text, intent.label(), &command, TraceStatus::DryRun, None);
                continue;
            }
            if !destructive && let Some(warning) = verdict.warning.as_deref() {
                self.warn(warning);
                if !self.prompter.confirm(&format!("Run `{}`?", command)) {
                    report.declined = true;
                    self.trace(&step.text, intent.label(), &command, TraceStatus::Skipped, Some(warning));
                    continue;
                }
            }
            let rollback = RollbackBuilder::build(&action, ctx);
            self.echo(&command);
            if let Some(out) = self.execute(&command, ctx)? {
                report.output = Some(match report.output.take() {
                    Some(prev) => format!("{}\n{}", prev, out),
                    None => out,
                });
            }
            if let Some(undo) = rollback {
                memory.push_rollback(undo.clone());
                report.rollback.push(undo);
            }
            self.trace(&step.text, intent.label(), &command, TraceStatus::Executed, None);
        }

        report.status = if self.options.dry_run {
            StepStatus::DryRun
        } else {
            StepStatus::Executed
        };
        Ok(report)
    }

    /// Spawn `command`; non-zero exit surfaces stderr verbatim.
    fn execute(&self, command: &str, ctx: &SystemContext) -> Result<Option<String>, HcmdError> {
        let out = self.shell.run(command, &ctx.cwd, ctx.os_type)?;
        tracing::debug!(command, code = out.code, "command finished");
        if !out.success() {
            let reason = if out.stderr.trim().is_empty() {
                format!("Command exited with code {}: {}", out.code, command)
            } else {
                out.stderr.trim().to_string()
            };
            return Err(HcmdError::ExecutionFailure(reason));
        }
        if !self.options.quiet {
            output::print_output(&out.stdout);
        }
        Ok(Some(out.stdout).filter(|s| !s.trim().is_empty()))
    }

    /// Pop and run the newest rollback command.
    pub fn rollback(&mut self, ctx: &SystemContext, memory: &mut SessionMemory) -> PlanReport {
        let mut report = PlanReport {
            dry_run: self.options.dry_run,
            ..PlanReport::default()
        };
        let Some(command) = memory.peek_rollback().map(str::to_string) else {
            self.say("Nothing to roll back");
            return report;
        };

        let mut step = StepReport::new("rollback", "ROLLBACK");
        step.commands.push(command.clone());
        if self.options.dry_run {
            self.echo(&command);
            step.status = StepStatus::DryRun;
            self.trace("rollback", "ROLLBACK", &command, TraceStatus::DryRun, None);
            report.steps.push(step);
            return report;
        }

        self.say(&command);
        if !self.prompter.confirm("Run this rollback command?") {
            step.status = StepStatus::Skipped;
            step.declined = true;
            report.steps.push(step);
            return report;
        }

        memory.pop_rollback();
        match self.execute(&command, ctx) {
            Ok(out) => {
                step.output = out;
                self.trace("rollback", "ROLLBACK", &command, TraceStatus::RolledBack, None);
                if let Err(e) = memory.save() {
                    report.error = Some(format!("Could not save session memory: {}", e));
                }
            }
            Err(e) => {
                self.trace("rollback", "ROLLBACK", &command, TraceStatus::Failed, Some(&e.to_string()));
                step.status = StepStatus::Failed;
                step.error = Some(e.to_string());
                report.error = Some(e.to_string());
            }
        }
        report.steps.push(step);
        report
    }

    /// Resolve and synthesize every step without executing or prompting.
    pub fn explain(
        &self,
        input: &str,
        ctx: &SystemContext,
        memory: &SessionMemory,
    ) -> Result<Vec<ExplainStep>, HcmdError> {
        let plan = self.parse(input, ctx, memory)?;
        let mut projected = memory.clone();
        let mut cursor = ctx.clone();
        let mut out = Vec::with_capacity(plan.len());
        for mut step in plan {
            let clarification = ambiguity::detect(&mut step, &cursor, &projected);
            let mut entry = ExplainStep {
                input: step.text.clone(),
                intent: step.intent().label().to_string(),
                confidence: step.confidence,
                slots: BTreeMap::new(),
                from_pronoun: step.from_pronoun,
                pattern: step.pattern.clone(),
                matches: Vec::new(),
                commands: Vec::new(),
                safety: Vec::new(),
                rollback: Vec::new(),
                clarification,
                error: None,
            };

            let actions: Vec<Action> = match (&step.pattern, step.action.target_slot()) {
                (Some(pattern), Some(slot)) if step.intent().accepts_pattern() => {
                    entry.matches = pattern::expand(pattern, &cursor);
                    entry
                        .matches
                        .iter()
                        .map(|file| {
                            let mut action = step.action.clone();
                            action.set_slot(slot, file.clone());
                            action
                        })
                        .collect()
                }
                _ => vec![step.action.clone()],
            };

            for action in &actions {
                match CommandSynthesizer::synthesize(action, &cursor) {
                    Ok(command) => {
                        entry.safety.push(self.safety.validate(action, &command, &cursor));
                        entry.rollback.extend(RollbackBuilder::build(action, &cursor));
                        entry.commands.push(command);
                    }
                    Err(e) => {
                        entry.error = Some(e.to_string());
                        break;
                    }
                }
            }
            entry.slots = step.action.slots();

            if step.pattern.is_none() {
                remember(&mut projected, &step.action, &cursor);
            }
            if let Some(dir) = navigation_target(&step.action, &cursor) {
                cursor = cursor.with_cwd(Path::new(&dir));
            }
            out.push(entry);
        }
        Ok(out)
    }

    fn trace(&self, input: &str, intent: &str, command: &str, status: TraceStatus, detail: Option<&str>) {
        let Some(path) = &self.options.trace_path else {
            return;
        };
        let mut event = StepTrace::new(input, intent, command, self.options.dry_run, status);
        if let Some(detail) = detail {
            event = event.with_detail(detail);
        }
        if let Err(e) = trace::append_trace(path, event) {
            tracing::warn!(path = %path.display(), error = %e, "trace write failed");
        }
    }

    fn echo(&self, command: &str) {
        if !self.options.quiet {
            output::print_command(command);
        }
    }

    fn say(&self, line: &str) {
        if !self.options.quiet {
            println!("{}", line);
        }
    }

    fn warn(&self, warning: &str) {
        if !self.options.quiet {
            output::print_warning(warning);
        }
    }
}
