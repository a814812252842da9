//! Git intents. Commands are identical on every OS.

use crate::core::context::SystemContext;
use crate::core::error::HcmdError;
use crate::core::intent::{Intent, SlotName};
use crate::core::step::{Action, GitAction};
use crate::core::synth::{CommandFamily, path_slot, quote};

pub const DEFAULT_COMMIT_MESSAGE: &str = "Update via hcmd";

pub struct GitFamily;

/// `.` stays literal so "add everything" stages the whole tree.
fn add_target(action: &Action, ctx: &SystemContext) -> Option<String> {
    match action.slot(SlotName::Path)?.trim() {
        "." => Some(".".to_string()),
        _ => path_slot(action, SlotName::Path, ctx).map(|p| quote(&p, ctx.os_type)),
    }
}

impl CommandFamily for GitFamily {
    fn name(&self) -> &'static str {
        "git"
    }

    fn synthesize(&self, action: &Action, ctx: &SystemContext) -> Result<Option<String>, HcmdError> {
        let Action::Git(git) = action else {
            return Ok(None);
        };
        let os = ctx.os_type;
        let command = match git {
            GitAction::Status => Some("git status".to_string()),
            GitAction::Add { .. } => add_target(action, ctx).map(|t| format!("git add {}", t)),
            GitAction::Commit { message } => {
                let message = message.as_deref().unwrap_or(DEFAULT_COMMIT_MESSAGE);
                Some(format!("git commit -m {}", quote(message, os)))
            }
            GitAction::Checkout { branch } => branch
                .as_deref()
                .map(|b| format!("git checkout {}", quote(b.trim(), os))),
            GitAction::Branch => Some("git branch".to_string()),
            GitAction::Clone { repo } => repo
                .as_deref()
                .map(|r| format!("git clone {}", quote(r.trim(), os))),
            GitAction::Log => Some("git log --oneline -n 20".to_string()),
            GitAction::Pull => Some("git pull".to_string()),
            GitAction::Push => Some("git push".to_string()),
            GitAction::Diff => Some("git diff".to_string()),
            GitAction::Reset => Some("git reset --hard HEAD".to_string()),
        };
        Ok(command)
    }

    fn rollback(&self, action: &Action, ctx: &SystemContext) -> Option<String> {
        match action {
            Action::Git(GitAction::Add { .. }) => {
                add_target(action, ctx).map(|t| format!("git reset {}", t))
            }
            _ => None,
        }
    }

    fn is_reversible(&self, intent: Intent) -> bool {
        intent == Intent::GitAdd
    }
}
