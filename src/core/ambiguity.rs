//! Bare-name target disambiguation.
//!
//! A target given as a bare name ("report.txt", "logs") is searched for in
//! the working-directory subtree. One match rewrites the slot to the full
//! path; several matches surface a `ClarificationRequest` with every
//! candidate; none surfaces one with no options.

use crate::core::context::SystemContext;
use crate::core::error::HcmdError;
use crate::core::intent::{Intent, SlotName};
use crate::core::memory::SessionMemory;
use crate::core::paths;
use crate::core::step::Step;
use serde::Serialize;
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClarificationRequest {
    pub reason: String,
    /// Empty means the step cannot proceed; otherwise at least two entries.
    pub options: Vec<String>,
    pub slot: SlotName,
}

impl ClarificationRequest {
    pub fn is_recoverable(&self) -> bool {
        !self.options.is_empty()
    }

    pub fn into_error(self) -> HcmdError {
        if self.options.is_empty() {
            HcmdError::MissingTarget(self.reason)
        } else {
            HcmdError::AmbiguousTarget {
                reason: self.reason,
                options: self.options,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchKind {
    AnyEntry,
    DirectoriesOnly,
}

/// Which slot is checked, what to search for, and the message when the
/// slot is empty.
fn target_of(intent: Intent) -> Option<(SlotName, SearchKind, &'static str)> {
    match intent {
        Intent::DeleteFile | Intent::ReadFile => {
            Some((SlotName::Path, SearchKind::AnyEntry, "No file specified"))
        }
        Intent::MoveFile | Intent::CopyFile | Intent::RenameFile => {
            Some((SlotName::Src, SearchKind::AnyEntry, "No source file specified"))
        }
        Intent::Navigation => Some((
            SlotName::Path,
            SearchKind::DirectoriesOnly,
            "No directory specified",
        )),
        _ => None,
    }
}

/// Check `step`'s target, rewriting it in place on a unique match.
pub fn detect(
    step: &mut Step,
    ctx: &SystemContext,
    memory: &SessionMemory,
) -> Option<ClarificationRequest> {
    let (slot, kind, missing) = target_of(step.intent())?;
    if step.from_pronoun || step.pattern.is_some() {
        return None;
    }

    let Some(value) = step.action.slot(slot).map(str::to_string) else {
        return Some(ClarificationRequest {
            reason: missing.to_string(),
            options: Vec::new(),
            slot,
        });
    };

    // Already confirmed in an earlier turn.
    if memory.last_path() == Some(value.as_str()) || memory.last_src() == Some(value.as_str()) {
        return None;
    }
    if !paths::is_bare_name(&value) {
        return None;
    }

    let name = value.trim().trim_matches(|c| c == '"' || c == '\'');
    let matches = search(ctx, name, kind);
    tracing::debug!(name, found = matches.len(), "bare name search");

    match matches.len() {
        0 if kind == SearchKind::DirectoriesOnly => None,
        0 => Some(ClarificationRequest {
            reason: format!("No file named '{}' found", name),
            options: Vec::new(),
            slot,
        }),
        1 => {
            step.action.set_slot(slot, matches[0].clone());
            None
        }
        _ => {
            let noun = match kind {
                SearchKind::DirectoriesOnly => "directories",
                SearchKind::AnyEntry => "files",
            };
            Some(ClarificationRequest {
                reason: format!("Multiple {} named '{}' found", noun, name),
                options: matches,
                slot,
            })
        }
    }
}

/// Overwrite the clarified slot with the option at `index`.
pub fn apply_choice(
    step: &mut Step,
    request: &ClarificationRequest,
    index: usize,
) -> Result<(), HcmdError> {
    let choice = request.options.get(index).ok_or_else(|| {
        HcmdError::InvalidRequest(format!(
            "Choice {} out of range (1-{})",
            index + 1,
            request.options.len()
        ))
    })?;
    step.action.set_slot(request.slot, choice.clone());
    Ok(())
}

fn is_vcs_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_type().is_dir() && entry.file_name() == ".git"
}

fn search(ctx: &SystemContext, name: &str, kind: SearchKind) -> Vec<String> {
    let mut found: Vec<String> = WalkDir::new(&ctx.cwd)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| !is_vcs_dir(entry))
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy() == name)
        .filter(|entry| kind == SearchKind::AnyEntry || entry.file_type().is_dir())
        .map(|entry| paths::normalize_from(&entry.path().to_string_lossy(), &ctx.cwd))
        .collect();
    found.sort();
    found
}
