use hcmd::core::config::Config;
use hcmd::core::context::{OsFamily, SystemContext};
use hcmd::core::executor::{ExecutorOptions, PlanExecutor, StepStatus};
use hcmd::core::keyword::KeywordOracle;
use hcmd::core::memory::SessionMemory;
use hcmd::core::paths::normalize_from;
use hcmd::core::process::{ProcessOutput, RecordingShell};
use hcmd::core::prompt::ScriptedPrompter;
use hcmd::core::trace::{TraceStatus, last_traces};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

struct Sandbox {
    _work: TempDir,
    _state: TempDir,
    root: PathBuf,
    state: PathBuf,
}

impl Sandbox {
    fn new() -> Self {
        let work = tempdir().unwrap();
        let state = tempdir().unwrap();
        Self {
            root: work.path().canonicalize().unwrap(),
            state: state.path().canonicalize().unwrap(),
            _work: work,
            _state: state,
        }
    }

    fn ctx(&self) -> SystemContext {
        SystemContext::bare(OsFamily::Linux, &self.root)
    }

    fn memory(&self) -> SessionMemory {
        SessionMemory::load(&self.memory_path())
    }

    fn memory_path(&self) -> PathBuf {
        self.state.join("memory.json")
    }

    fn trace_path(&self) -> PathBuf {
        self.state.join("traces.jsonl")
    }

    fn options(&self) -> ExecutorOptions {
        ExecutorOptions {
            quiet: true,
            trace_path: Some(self.trace_path()),
            ..ExecutorOptions::default()
        }
    }

    fn abs(&self, rel: &str) -> String {
        normalize_from(rel, &self.root)
    }

    fn touch(&self, rel: &str) {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "x").unwrap();
    }
}

fn exists(path: &str) -> bool {
    Path::new(path).exists()
}

#[cfg(unix)]
mod live {
    use super::*;
    use hcmd::core::process::SystemShell;

    #[test]
    fn test_create_then_delete_plan() {
        let sandbox = Sandbox::new();
        let mut memory = sandbox.memory();
        let mut prompter = ScriptedPrompter::new().yes().yes();
        let report = PlanExecutor::new(
            &KeywordOracle,
            &SystemShell,
            &mut prompter,
            &Config::default(),
            sandbox.options(),
        )
        .run("create a.txt and then delete a.txt", &sandbox.ctx(), &mut memory);

        assert_eq!(report.exit_code(), 0, "{:?}", report.error);
        assert_eq!(report.steps.len(), 2);
        assert!(!exists(&sandbox.abs("a.txt")));
        assert_eq!(prompter.asked.len(), 2);
        assert!(prompter.asked[0].contains("2 steps"));

        // Only the create is reversible.
        let reloaded = sandbox.memory();
        assert_eq!(
            reloaded.state.history,
            vec![format!("rm \"{}\"", sandbox.abs("a.txt"))]
        );
        assert_eq!(reloaded.last_path(), Some(sandbox.abs("a.txt").as_str()));
    }

    #[test]
    fn test_pronoun_delete_after_confirmation() {
        let sandbox = Sandbox::new();
        sandbox.touch("notes.txt");
        let mut memory = sandbox.memory();
        memory.push_object(&sandbox.abs("notes.txt"));

        let mut prompter = ScriptedPrompter::new().yes();
        let report = PlanExecutor::new(
            &KeywordOracle,
            &SystemShell,
            &mut prompter,
            &Config::default(),
            sandbox.options(),
        )
        .run("delete it", &sandbox.ctx(), &mut memory);

        assert_eq!(report.exit_code(), 0, "{:?}", report.error);
        assert_eq!(report.steps[0].intent, "DELETE_FILE");
        assert!(report.steps[0].warning.is_some());
        assert!(!exists(&sandbox.abs("notes.txt")));
        assert_eq!(prompter.asked.len(), 1);
    }

    #[test]
    fn test_declined_delete_keeps_file() {
        let sandbox = Sandbox::new();
        sandbox.touch("notes.txt");
        let mut memory = sandbox.memory();
        memory.push_object(&sandbox.abs("notes.txt"));

        let mut prompter = ScriptedPrompter::new().no();
        let report = PlanExecutor::new(
            &KeywordOracle,
            &SystemShell,
            &mut prompter,
            &Config::default(),
            sandbox.options(),
        )
        .run("delete it", &sandbox.ctx(), &mut memory);

        assert_eq!(report.exit_code(), 1);
        assert_eq!(report.steps[0].status, StepStatus::Skipped);
        assert!(report.steps[0].declined);
        assert!(exists(&sandbox.abs("notes.txt")));
    }

    #[test]
    fn test_wildcard_move_into_directory() {
        let sandbox = Sandbox::new();
        for name in ["a.txt", "b.txt", "c.txt", "keep.md"] {
            sandbox.touch(name);
        }
        fs::create_dir(sandbox.root.join("backup")).unwrap();
        let mut memory = sandbox.memory();

        let mut prompter = ScriptedPrompter::new().yes();
        let report = PlanExecutor::new(
            &KeywordOracle,
            &SystemShell,
            &mut prompter,
            &Config::default(),
            sandbox.options(),
        )
        .run("move *.txt to backup", &sandbox.ctx(), &mut memory);

        assert_eq!(report.exit_code(), 0, "{:?}", report.error);
        assert_eq!(report.steps[0].commands.len(), 3);
        assert_eq!(prompter.asked.len(), 1);
        assert!(prompter.asked[0].contains("3 files"));
        for name in ["a.txt", "b.txt", "c.txt"] {
            assert!(exists(&sandbox.abs(&format!("backup/{}", name))));
            assert!(!exists(&sandbox.abs(name)));
        }
        assert!(exists(&sandbox.abs("keep.md")));

        // Batches leave single-target memory alone but stay reversible.
        assert!(memory.last_path().is_none());
        assert!(memory.last_src().is_none());
        assert_eq!(memory.state.history.len(), 3);
    }

    #[test]
    fn test_wildcard_move_skips_files_already_in_destination() {
        let sandbox = Sandbox::new();
        sandbox.touch("a.txt");
        sandbox.touch("b.txt");
        sandbox.touch("backup/old.txt");
        let mut memory = sandbox.memory();

        let mut prompter = ScriptedPrompter::new().yes();
        let report = PlanExecutor::new(
            &KeywordOracle,
            &SystemShell,
            &mut prompter,
            &Config::default(),
            sandbox.options(),
        )
        .run("move *.txt to backup", &sandbox.ctx(), &mut memory);

        assert_eq!(report.exit_code(), 0, "{:?}", report.error);
        assert_eq!(report.steps[0].commands.len(), 2);
        assert!(prompter.asked[0].contains("2 files"));
        for name in ["a.txt", "b.txt", "old.txt"] {
            assert!(exists(&sandbox.abs(&format!("backup/{}", name))));
        }
        assert_eq!(sandbox.memory().state.history.len(), 2);
    }

    #[test]
    fn test_rename_found_in_subdirectory_stays_there() {
        let sandbox = Sandbox::new();
        sandbox.touch("sub/a.txt");
        let mut memory = sandbox.memory();

        let mut prompter = ScriptedPrompter::new().yes();
        let report = PlanExecutor::new(
            &KeywordOracle,
            &SystemShell,
            &mut prompter,
            &Config::default(),
            sandbox.options(),
        )
        .run("rename a.txt to b.txt", &sandbox.ctx(), &mut memory);

        assert_eq!(report.exit_code(), 0, "{:?}", report.error);
        assert!(exists(&sandbox.abs("sub/b.txt")));
        assert!(!exists(&sandbox.abs("b.txt")));
        assert_eq!(memory.last_dst(), Some(sandbox.abs("sub/b.txt").as_str()));
    }

    #[test]
    fn test_navigation_moves_later_steps() {
        let sandbox = Sandbox::new();
        fs::create_dir(sandbox.root.join("sub")).unwrap();
        let mut memory = sandbox.memory();

        let mut prompter = ScriptedPrompter::new().yes();
        let report = PlanExecutor::new(
            &KeywordOracle,
            &SystemShell,
            &mut prompter,
            &Config::default(),
            sandbox.options(),
        )
        .run("go to sub and then create x.txt", &sandbox.ctx(), &mut memory);

        assert_eq!(report.exit_code(), 0, "{:?}", report.error);
        assert_eq!(report.steps[0].status, StepStatus::Navigated);
        assert!(exists(&sandbox.abs("sub/x.txt")));
        assert!(!exists(&sandbox.abs("x.txt")));
    }

    #[test]
    fn test_missing_target_aborts_rest_of_plan() {
        let sandbox = Sandbox::new();
        let mut memory = sandbox.memory();

        let mut prompter = ScriptedPrompter::new().yes();
        let report = PlanExecutor::new(
            &KeywordOracle,
            &SystemShell,
            &mut prompter,
            &Config::default(),
            sandbox.options(),
        )
        .run("read ghost.txt and then create b.txt", &sandbox.ctx(), &mut memory);

        assert_eq!(report.exit_code(), 1);
        assert_eq!(
            report.error.as_deref(),
            Some("No file named 'ghost.txt' found")
        );
        assert_eq!(report.steps.len(), 1);
        assert_eq!(report.steps[0].status, StepStatus::Failed);
        assert!(!exists(&sandbox.abs("b.txt")));
        assert!(!sandbox.memory_path().exists());
    }

    #[test]
    fn test_ambiguous_name_asks_for_choice() {
        let sandbox = Sandbox::new();
        sandbox.touch("one/a.txt");
        sandbox.touch("two/a.txt");
        let mut memory = sandbox.memory();

        let mut prompter = ScriptedPrompter::new().pick(1).yes();
        let report = PlanExecutor::new(
            &KeywordOracle,
            &SystemShell,
            &mut prompter,
            &Config::default(),
            sandbox.options(),
        )
        .run("delete a.txt", &sandbox.ctx(), &mut memory);

        assert_eq!(report.exit_code(), 0, "{:?}", report.error);
        assert_eq!(prompter.asked[0], "Multiple files named 'a.txt' found");
        assert!(exists(&sandbox.abs("one/a.txt")));
        assert!(!exists(&sandbox.abs("two/a.txt")));
    }

    #[test]
    fn test_rollback_undoes_create() {
        let sandbox = Sandbox::new();
        let mut memory = sandbox.memory();
        let mut prompter = ScriptedPrompter::new();
        let report = PlanExecutor::new(
            &KeywordOracle,
            &SystemShell,
            &mut prompter,
            &Config::default(),
            sandbox.options(),
        )
        .run("create notes.txt", &sandbox.ctx(), &mut memory);
        assert_eq!(report.exit_code(), 0, "{:?}", report.error);
        assert!(exists(&sandbox.abs("notes.txt")));
        assert!(prompter.asked.is_empty());

        let mut memory = sandbox.memory();
        let mut prompter = ScriptedPrompter::new().yes();
        let mut executor = PlanExecutor::new(
            &KeywordOracle,
            &SystemShell,
            &mut prompter,
            &Config::default(),
            sandbox.options(),
        );
        let report = executor.rollback(&sandbox.ctx(), &mut memory);
        assert_eq!(report.exit_code(), 0, "{:?}", report.error);
        assert!(!exists(&sandbox.abs("notes.txt")));

        let report = executor.rollback(&sandbox.ctx(), &mut memory);
        assert_eq!(report.exit_code(), 0);
        assert!(report.steps.is_empty());
        assert!(sandbox.memory().state.history.is_empty());
    }

    #[test]
    fn test_trace_records_each_command() {
        let sandbox = Sandbox::new();
        let mut memory = sandbox.memory();
        let mut prompter = ScriptedPrompter::new().yes();
        PlanExecutor::new(
            &KeywordOracle,
            &SystemShell,
            &mut prompter,
            &Config::default(),
            sandbox.options(),
        )
        .run("create a.txt and then create b.txt", &sandbox.ctx(), &mut memory);

        let traces = last_traces(&sandbox.trace_path(), 10).unwrap();
        assert_eq!(traces.len(), 2);
        assert!(traces.iter().all(|t| t.status == TraceStatus::Executed));
        assert_eq!(traces[0].intent, "CREATE_FILE");
        assert!(traces[1].command.contains("b.txt"));
    }
}

#[test]
fn test_dry_run_touches_nothing() {
    let sandbox = Sandbox::new();
    let shell = RecordingShell::new();
    let mut memory = sandbox.memory();
    let mut prompter = ScriptedPrompter::new();
    let options = ExecutorOptions {
        dry_run: true,
        ..sandbox.options()
    };
    let report = PlanExecutor::new(&KeywordOracle, &shell, &mut prompter, &Config::default(), options)
        .run("create a.txt and then delete it", &sandbox.ctx(), &mut memory);

    assert_eq!(report.exit_code(), 0, "{:?}", report.error);
    assert!(report.dry_run);
    assert!(report.steps.iter().all(|s| s.status == StepStatus::DryRun));
    assert_eq!(
        report.steps[1].commands,
        vec![format!("rm \"{}\"", sandbox.abs("a.txt"))]
    );
    assert!(shell.commands().is_empty());
    assert!(prompter.asked.is_empty());
    assert!(memory.last_path().is_none());
    assert!(!sandbox.memory_path().exists());
}

#[test]
fn test_declined_plan_runs_nothing() {
    let sandbox = Sandbox::new();
    let shell = RecordingShell::new();
    let mut memory = sandbox.memory();
    let mut prompter = ScriptedPrompter::new().no();
    let report = PlanExecutor::new(
        &KeywordOracle,
        &shell,
        &mut prompter,
        &Config::default(),
        sandbox.options(),
    )
    .run("create a.txt and then create b.txt", &sandbox.ctx(), &mut memory);

    assert!(report.cancelled);
    assert_eq!(report.exit_code(), 1);
    assert!(report.steps.is_empty());
    assert!(shell.commands().is_empty());
}

#[test]
fn test_wildcard_without_matches_is_not_an_error() {
    let sandbox = Sandbox::new();
    let shell = RecordingShell::new();
    let mut memory = sandbox.memory();
    let mut prompter = ScriptedPrompter::new();
    let report = PlanExecutor::new(
        &KeywordOracle,
        &shell,
        &mut prompter,
        &Config::default(),
        sandbox.options(),
    )
    .run("delete *.log", &sandbox.ctx(), &mut memory);

    assert_eq!(report.exit_code(), 0);
    assert_eq!(report.steps[0].status, StepStatus::NoMatches);
    assert!(shell.commands().is_empty());
}

#[test]
fn test_batch_move_needs_existing_directory() {
    let sandbox = Sandbox::new();
    sandbox.touch("a.txt");
    sandbox.touch("b.txt");
    let shell = RecordingShell::new();
    let mut memory = sandbox.memory();
    let mut prompter = ScriptedPrompter::new().yes();
    let report = PlanExecutor::new(
        &KeywordOracle,
        &shell,
        &mut prompter,
        &Config::default(),
        sandbox.options(),
    )
    .run("move *.txt to nowhere", &sandbox.ctx(), &mut memory);

    assert_eq!(report.exit_code(), 1);
    assert!(report.error.unwrap().contains("existing directory"));
    assert!(shell.commands().is_empty());
}

#[test]
fn test_parse_projects_memory_across_steps() {
    let sandbox = Sandbox::new();
    let shell = RecordingShell::new();
    let mut prompter = ScriptedPrompter::new();
    let executor = PlanExecutor::new(
        &KeywordOracle,
        &shell,
        &mut prompter,
        &Config::default(),
        sandbox.options(),
    );
    let memory = SessionMemory::in_memory();
    let plan = executor
        .parse("create notes.txt and then delete it", &sandbox.ctx(), &memory)
        .unwrap();

    assert_eq!(plan.len(), 2);
    assert!(plan[1].from_pronoun);
    assert_eq!(
        plan[1].action.slot(hcmd::core::intent::SlotName::Path),
        Some(sandbox.abs("notes.txt").as_str())
    );
    assert!(memory.last_path().is_none());
}

#[test]
fn test_explain_lists_matches_and_commands() {
    let sandbox = Sandbox::new();
    sandbox.touch("a.txt");
    sandbox.touch("b.txt");
    fs::create_dir(sandbox.root.join("backup")).unwrap();
    let shell = RecordingShell::new();
    let mut prompter = ScriptedPrompter::new();
    let executor = PlanExecutor::new(
        &KeywordOracle,
        &shell,
        &mut prompter,
        &Config::default(),
        sandbox.options(),
    );
    let steps = executor
        .explain("move *.txt to backup", &sandbox.ctx(), &SessionMemory::in_memory())
        .unwrap();

    assert_eq!(steps.len(), 1);
    let step = &steps[0];
    assert_eq!(step.intent, "MOVE_FILE");
    assert_eq!(step.pattern.as_deref(), Some("*.txt"));
    assert_eq!(step.matches, vec![sandbox.abs("a.txt"), sandbox.abs("b.txt")]);
    assert_eq!(step.commands.len(), 2);
    assert_eq!(step.rollback.len(), 2);
    assert!(step.safety.iter().all(|s| s.safe));
    assert!(shell.commands().is_empty());
}

#[test]
fn test_failed_batch_keeps_undo_for_completed_moves() {
    let sandbox = Sandbox::new();
    sandbox.touch("a.txt");
    sandbox.touch("b.txt");
    fs::create_dir(sandbox.root.join("backup")).unwrap();
    let failing = format!(
        "mv \"{}\" \"{}\"",
        sandbox.abs("b.txt"),
        sandbox.abs("backup/b.txt")
    );
    let shell = RecordingShell::new().with_run(&failing, ProcessOutput::failed(1, "disk full"));
    let mut memory = sandbox.memory();

    let mut prompter = ScriptedPrompter::new().yes();
    let report = PlanExecutor::new(
        &KeywordOracle,
        &shell,
        &mut prompter,
        &Config::default(),
        sandbox.options(),
    )
    .run("move *.txt to backup", &sandbox.ctx(), &mut memory);

    assert_eq!(report.exit_code(), 1);
    assert_eq!(report.error.as_deref(), Some("disk full"));
    assert_eq!(shell.commands().len(), 2);

    // The first move really ran, so its undo must survive the failure.
    assert_eq!(
        sandbox.memory().state.history,
        vec![format!(
            "mv \"{}\" \"{}\"",
            sandbox.abs("backup/a.txt"),
            sandbox.abs(".")
        )]
    );
}
