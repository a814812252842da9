use hcmd::core::context::{OsFamily, SystemContext};
use hcmd::core::error::HcmdError;
use hcmd::core::rollback::RollbackBuilder;
use hcmd::core::safety::{RiskLevel, SafetyValidator};
use hcmd::core::step::Action;
use hcmd::core::synth::CommandSynthesizer;
use std::fs;
use tempfile::tempdir;

fn linux() -> SystemContext {
    SystemContext::bare(OsFamily::Linux, "/work")
}

fn windows() -> SystemContext {
    SystemContext::bare(OsFamily::Windows, "/work")
}

fn some(value: &str) -> Option<String> {
    Some(value.to_string())
}

#[test]
fn test_posix_file_commands() {
    let ctx = linux();
    let cases = [
        (Action::CreateFile { path: some("a.txt") }, "touch \"/work/a.txt\""),
        (Action::CreateDir { path: some("logs") }, "mkdir \"/work/logs\""),
        (Action::ReadFile { path: some("a.txt") }, "cat \"/work/a.txt\""),
        (Action::DeleteFile { path: some("a.txt") }, "rm \"/work/a.txt\""),
        (Action::DeleteDir { path: some("logs") }, "rm -r \"/work/logs\""),
        (
            Action::CopyFile { src: some("a.txt"), dst: some("b.txt") },
            "cp \"/work/a.txt\" \"/work/b.txt\"",
        ),
        (
            Action::MoveFile { src: some("a.txt"), dst: some("b.txt") },
            "mv \"/work/a.txt\" \"/work/b.txt\"",
        ),
        (
            Action::RenameFile { src: some("a.txt"), dst: some("b.txt") },
            "mv \"/work/a.txt\" \"/work/b.txt\"",
        ),
    ];
    for (action, expected) in cases {
        assert_eq!(CommandSynthesizer::synthesize(&action, &ctx).unwrap(), expected);
    }
}

#[test]
fn test_windows_file_commands() {
    let ctx = windows();
    let create = CommandSynthesizer::synthesize(&Action::CreateFile { path: some("a.txt") }, &ctx)
        .unwrap();
    assert!(create.starts_with("New-Item -ItemType File \""));

    let delete = CommandSynthesizer::synthesize(&Action::DeleteDir { path: some("logs") }, &ctx)
        .unwrap();
    assert!(delete.starts_with("Remove-Item -LiteralPath \""));
    assert!(delete.ends_with("-Recurse -Force"));

    let rename = CommandSynthesizer::synthesize(
        &Action::RenameFile { src: some("a.txt"), dst: some("b.txt") },
        &ctx,
    )
    .unwrap();
    assert!(rename.starts_with("Rename-Item \""));
    assert!(rename.ends_with(" \"b.txt\""));
}

#[test]
fn test_shell_metacharacters_are_escaped() {
    let command = CommandSynthesizer::synthesize(
        &Action::CreateFile { path: some("$HOME \"x\".txt") },
        &linux(),
    )
    .unwrap();
    assert_eq!(command, "touch \"/work/\\$HOME \\\"x\\\".txt\"");
}

#[test]
fn test_missing_slot_is_unsupported() {
    let err = CommandSynthesizer::synthesize(
        &Action::MoveFile { src: some("a.txt"), dst: None },
        &linux(),
    )
    .unwrap_err();
    assert!(matches!(err, HcmdError::UnsupportedIntent(_)));
    assert_eq!(err.to_string(), "Unsupported or invalid command for MOVE_FILE");
}

#[test]
fn test_delete_file_refuses_directories() {
    let tmp = tempdir().unwrap();
    fs::create_dir(tmp.path().join("logs")).unwrap();
    let ctx = SystemContext::bare(OsFamily::Linux, tmp.path());
    let err = CommandSynthesizer::synthesize(&Action::DeleteFile { path: some("logs") }, &ctx)
        .unwrap_err();
    assert!(matches!(err, HcmdError::InvalidRequest(_)));
}

#[test]
fn test_rollback_for_reversible_file_actions() {
    let ctx = linux();
    assert_eq!(
        RollbackBuilder::build(&Action::CreateFile { path: some("a.txt") }, &ctx).as_deref(),
        Some("rm \"/work/a.txt\"")
    );
    assert_eq!(
        RollbackBuilder::build(&Action::CreateDir { path: some("logs") }, &ctx).as_deref(),
        Some("rm -r \"/work/logs\"")
    );
    assert_eq!(
        RollbackBuilder::build(
            &Action::RenameFile { src: some("a.txt"), dst: some("b.txt") },
            &ctx
        )
        .as_deref(),
        Some("mv \"/work/b.txt\" \"/work/a.txt\"")
    );
    assert!(RollbackBuilder::build(&Action::DeleteFile { path: some("a.txt") }, &ctx).is_none());
    assert!(
        RollbackBuilder::build(&Action::CopyFile { src: some("a.txt"), dst: some("b.txt") }, &ctx)
            .is_none()
    );
}

#[test]
fn test_move_into_directory_lands_inside_it() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().canonicalize().unwrap();
    fs::create_dir(root.join("backup")).unwrap();
    fs::write(root.join("a.txt"), "x").unwrap();
    let ctx = SystemContext::bare(OsFamily::Linux, &root);
    let action = Action::MoveFile { src: some("a.txt"), dst: some("backup") };

    let src = root.join("a.txt").to_string_lossy().to_string();
    let landed = root.join("backup").join("a.txt").to_string_lossy().to_string();
    assert_eq!(
        CommandSynthesizer::synthesize(&action, &ctx).unwrap(),
        format!("mv \"{}\" \"{}\"", src, landed)
    );
    assert_eq!(
        RollbackBuilder::build(&action, &ctx),
        Some(format!("mv \"{}\" \"{}\"", landed, root.to_string_lossy()))
    );
}

#[test]
fn test_rename_in_subdirectory_stays_there() {
    let nested = Action::RenameFile {
        src: some("/work/sub/a.txt"),
        dst: some("b.txt"),
    };
    assert_eq!(
        CommandSynthesizer::synthesize(&nested, &linux()).unwrap(),
        "mv \"/work/sub/a.txt\" \"/work/sub/b.txt\""
    );
    assert_eq!(
        RollbackBuilder::build(&nested, &linux()).as_deref(),
        Some("mv \"/work/sub/b.txt\" \"/work/sub/a.txt\"")
    );

    // Rename-Item already works in place; its undo must find the new name there.
    assert_eq!(
        RollbackBuilder::build(&nested, &windows()).as_deref(),
        Some("Rename-Item \"/work/sub/b.txt\" \"a.txt\"")
    );
}

#[test]
fn test_safety_levels_for_file_actions() {
    let validator = SafetyValidator::default();
    let ctx = linux();

    let delete = Action::DeleteFile { path: some("a.txt") };
    let result = validator.validate(&delete, "rm \"/work/a.txt\"", &ctx);
    assert!(!result.safe);
    assert_eq!(result.level, RiskLevel::HIGH);

    let create = Action::CreateFile { path: some("a.txt") };
    assert!(validator.validate(&create, "touch \"/work/a.txt\"", &ctx).safe);

    let system = Action::DeleteDir { path: some("/etc") };
    let result = validator.validate(&system, "rm -r \"/etc\"", &ctx);
    assert_eq!(result.level, RiskLevel::CRITICAL);
    assert!(result.warning.unwrap().contains("protected path: /etc"));
}

#[test]
fn test_configured_protected_fragments() {
    let validator = SafetyValidator::new(vec!["/srv/data".to_string()]);
    let action = Action::CreateFile { path: some("/srv/data/x") };
    let result = validator.validate(&action, "touch \"/srv/data/x\"", &linux());
    assert!(!result.safe);
    assert_eq!(result.level, RiskLevel::CRITICAL);
}
