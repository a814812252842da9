use hcmd::core::context::{OsFamily, SystemContext};
use hcmd::core::intent::Intent;
use hcmd::core::rollback::RollbackBuilder;
use hcmd::core::safety::{RiskLevel, SafetyValidator};
use hcmd::core::step::{Action, GitAction};
use hcmd::core::synth::CommandSynthesizer;
use hcmd::plugins::git::DEFAULT_COMMIT_MESSAGE;

fn repo() -> SystemContext {
    let mut ctx = SystemContext::bare(OsFamily::Linux, "/repo");
    ctx.is_git_repo = true;
    ctx
}

fn git(action: GitAction) -> Action {
    Action::Git(action)
}

#[test]
fn test_git_commands() {
    let ctx = repo();
    let cases = [
        (git(GitAction::Status), "git status"),
        (git(GitAction::Branch), "git branch"),
        (git(GitAction::Log), "git log --oneline -n 20"),
        (git(GitAction::Pull), "git pull"),
        (git(GitAction::Push), "git push"),
        (git(GitAction::Diff), "git diff"),
        (git(GitAction::Reset), "git reset --hard HEAD"),
        (
            git(GitAction::Checkout { branch: Some("develop".to_string()) }),
            "git checkout \"develop\"",
        ),
        (
            git(GitAction::Clone { repo: Some("https://example.com/r.git".to_string()) }),
            "git clone \"https://example.com/r.git\"",
        ),
        (
            git(GitAction::Add { path: Some("src/main.rs".to_string()) }),
            "git add \"/repo/src/main.rs\"",
        ),
    ];
    for (action, expected) in cases {
        assert_eq!(CommandSynthesizer::synthesize(&action, &ctx).unwrap(), expected);
    }
}

#[test]
fn test_commit_message_quoting() {
    let ctx = repo();
    let commit = git(GitAction::Commit { message: Some("fix \"edge\" case".to_string()) });
    assert_eq!(
        CommandSynthesizer::synthesize(&commit, &ctx).unwrap(),
        "git commit -m \"fix \\\"edge\\\" case\""
    );

    let bare = git(GitAction::Commit { message: None });
    assert_eq!(
        CommandSynthesizer::synthesize(&bare, &ctx).unwrap(),
        format!("git commit -m \"{}\"", DEFAULT_COMMIT_MESSAGE)
    );
}

#[test]
fn test_commands_are_os_independent() {
    let mut windows = SystemContext::bare(OsFamily::Windows, "/repo");
    windows.is_git_repo = true;
    for action in [git(GitAction::Status), git(GitAction::Log), git(GitAction::Reset)] {
        assert_eq!(
            CommandSynthesizer::synthesize(&action, &windows).unwrap(),
            CommandSynthesizer::synthesize(&action, &repo()).unwrap()
        );
    }
}

#[test]
fn test_only_add_is_reversible() {
    let ctx = repo();
    let add = git(GitAction::Add { path: Some("notes.md".to_string()) });
    assert_eq!(
        RollbackBuilder::build(&add, &ctx).as_deref(),
        Some("git reset \"/repo/notes.md\"")
    );
    assert!(RollbackBuilder::is_reversible(Intent::GitAdd));
    for intent in [
        Intent::GitCommit,
        Intent::GitCheckout,
        Intent::GitReset,
        Intent::GitPull,
        Intent::GitPush,
    ] {
        assert!(!RollbackBuilder::is_reversible(intent), "{}", intent);
    }
}

#[test]
fn test_git_outside_repository_is_flagged() {
    let outside = SystemContext::bare(OsFamily::Linux, "/tmp");
    let status = git(GitAction::Status);
    let result = SafetyValidator::default().validate(&status, "git status", &outside);
    assert!(!result.safe);
    assert_eq!(
        result.warning.as_deref(),
        Some("Git command outside a repository")
    );

    assert!(SafetyValidator::default().validate(&status, "git status", &repo()).safe);
}

#[test]
fn test_hard_reset_is_high_risk() {
    let reset = git(GitAction::Reset);
    let result = SafetyValidator::default().validate(&reset, "git reset --hard HEAD", &repo());
    assert!(!result.safe);
    assert_eq!(result.level, RiskLevel::HIGH);
}
