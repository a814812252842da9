//! Command synthesis: (action, OS) to one literal command string.
//!
//! Each intent family lives in `plugins::*` behind `CommandFamily`; this
//! module owns the shared quoting and path helpers and the dispatch entry.

use crate::core::context::{OsFamily, SystemContext};
use crate::core::error::HcmdError;
use crate::core::intent::{Intent, SlotName};
use crate::core::paths;
use crate::core::step::Action;
use crate::plugins;

/// One implementation per intent family (navigation, files, process, git).
pub trait CommandFamily: Sync {
    fn name(&self) -> &'static str;

    /// `Ok(None)` when a required slot is missing. `Err` when the slots are
    /// present but describe something this family refuses to do.
    fn synthesize(&self, action: &Action, ctx: &SystemContext) -> Result<Option<String>, HcmdError>;

    /// Inverse command, computed before the forward command runs.
    fn rollback(&self, action: &Action, ctx: &SystemContext) -> Option<String>;

    fn is_reversible(&self, intent: Intent) -> bool;
}

pub struct CommandSynthesizer;

impl CommandSynthesizer {
    /// Synthesize, turning a missing slot into `UnsupportedIntent`.
    pub fn synthesize(action: &Action, ctx: &SystemContext) -> Result<String, HcmdError> {
        let family = plugins::family_for(action);
        match family.synthesize(action, ctx)? {
            Some(command) => {
                tracing::debug!(family = family.name(), command = %command, "synthesized");
                Ok(command)
            }
            None => Err(HcmdError::UnsupportedIntent(format!(
                "Unsupported or invalid command for {}",
                action.intent()
            ))),
        }
    }
}

/// Double-quote `value` for the target shell.
pub fn quote(value: &str, os: OsFamily) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match (os.is_windows(), c) {
            (true, '`' | '"' | '$') => {
                out.push('`');
                out.push(c);
            }
            (false, '\\' | '"' | '$' | '`') => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// A path slot, normalized to absolute form.
pub fn path_slot(action: &Action, slot: SlotName, ctx: &SystemContext) -> Option<String> {
    action
        .slot(slot)
        .filter(|value| !value.trim().is_empty())
        .map(|value| paths::normalize(value, ctx))
}

/// Where a move/copy lands: an existing directory destination gets the
/// source's base name appended.
pub fn landing_path(src: &str, dst: &str) -> String {
    if std::path::Path::new(dst).is_dir()
        && let Some(name) = paths::base_name(src)
    {
        return std::path::Path::new(dst)
            .join(name)
            .to_string_lossy()
            .to_string();
    }
    dst.to_string()
}

/// Source and target of a rename. A bare new name stays in the source's
/// directory, which may not be the cwd once a bare source was searched for.
pub fn rename_paths(action: &Action, ctx: &SystemContext) -> Option<(String, String)> {
    let src = path_slot(action, SlotName::Src, ctx)?;
    let raw = action
        .slot(SlotName::Dst)
        .filter(|value| !value.trim().is_empty())?;
    let dst = match std::path::Path::new(&src).parent() {
        Some(dir) if paths::is_bare_name(raw) => paths::normalize_from(raw, dir),
        _ => paths::normalize(raw, ctx),
    };
    Some((src, dst))
}
