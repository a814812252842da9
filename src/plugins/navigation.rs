use crate::core::context::SystemContext;
use crate::core::error::HcmdError;
use crate::core::intent::{Intent, SlotName};
use crate::core::step::Action;
use crate::core::synth::{CommandFamily, path_slot, quote};

/// NAVIGATION, LIST_FILES and PWD. Nothing here is reversible.
pub struct NavigationFamily;

impl CommandFamily for NavigationFamily {
    fn name(&self) -> &'static str {
        "navigation"
    }

    fn synthesize(&self, action: &Action, ctx: &SystemContext) -> Result<Option<String>, HcmdError> {
        let windows = ctx.os_type.is_windows();
        let command = match action {
            Action::ListFiles if windows => Some("Get-ChildItem".to_string()),
            Action::ListFiles => Some("ls -la".to_string()),
            Action::Pwd if windows => Some("Get-Location".to_string()),
            Action::Pwd => Some("pwd".to_string()),
            Action::Navigation { .. } => path_slot(action, SlotName::Path, ctx)
                .map(|path| format!("cd {}", quote(&path, ctx.os_type))),
            _ => None,
        };
        Ok(command)
    }

    fn rollback(&self, _action: &Action, _ctx: &SystemContext) -> Option<String> {
        None
    }

    fn is_reversible(&self, _intent: Intent) -> bool {
        false
    }
}
