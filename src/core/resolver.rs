//! Intent resolution: text in, one typed `Step` out.
//!
//! Precedence, first match wins:
//! 1. pronoun-delete shortcut ("delete it" with a remembered path)
//! 2. literal rule table ("ls", "list files", "pwd")
//! 3. git follow-up (verb without "git" right after a git step, inside a repo)
//! 4. the NLU oracle, gated by the intent threshold
//!
//! Slot extraction, pronoun substitution, memory fallback and wildcard
//! detection then run against the fixed intent.

use crate::core::config::Config;
use crate::core::context::SystemContext;
use crate::core::error::HcmdError;
use crate::core::intent::{Intent, SlotName};
use crate::core::memory::SessionMemory;
use crate::core::oracle::{Oracle, Span, SpanKind};
use crate::core::step::{Action, Step};
use regex::Regex;
use std::sync::LazyLock;

static PRONOUN_DELETE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(delete|remove|erase)\s+(it|this|that)$").unwrap());

static RULES: LazyLock<Vec<(Regex, Intent)>> = LazyLock::new(|| {
    vec![
        (
            Regex::new(r"(?i)^(ls|dir|list|list files|show files)$").unwrap(),
            Intent::ListFiles,
        ),
        (Regex::new(r"(?i)^(pwd|where am i)$").unwrap(), Intent::Pwd),
    ]
});

static GIT_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bgit\b").unwrap());

/// Follow-up verbs, checked in order.
static GIT_FOLLOW_UP: LazyLock<Vec<(Regex, Intent)>> = LazyLock::new(|| {
    vec![
        (
            Regex::new(r"(?i)\b(checkout|switch)\b").unwrap(),
            Intent::GitCheckout,
        ),
        (Regex::new(r"(?i)\bcommit\b").unwrap(), Intent::GitCommit),
        (Regex::new(r"(?i)\badd\b").unwrap(), Intent::GitAdd),
        (Regex::new(r"(?i)\bbranch(es)?\b").unwrap(), Intent::GitBranch),
    ]
});

static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)"|'([^']+)'"#).unwrap());

const PRONOUNS: &[&str] = &["it", "this", "that", "there", "them"];

pub const LOW_INTENT_CONFIDENCE: &str = "Low intent confidence";
pub const RENAME_IDENTICAL: &str = "Rename source and destination identical";

pub struct IntentResolver<'a> {
    oracle: &'a dyn Oracle,
    intent_threshold: f32,
    span_threshold: f32,
}

impl<'a> IntentResolver<'a> {
    pub fn new(oracle: &'a dyn Oracle, config: &Config) -> Self {
        Self::with_thresholds(oracle, config.intent_threshold, config.span_threshold)
    }

    pub fn with_thresholds(oracle: &'a dyn Oracle, intent_threshold: f32, span_threshold: f32) -> Self {
        Self {
            oracle,
            intent_threshold,
            span_threshold,
        }
    }

    pub fn resolve(
        &self,
        text: &str,
        ctx: &SystemContext,
        memory: &SessionMemory,
    ) -> Result<Step, HcmdError> {
        let text = text.trim().trim_end_matches(['.', '!']).trim();
        if text.is_empty() {
            return Err(HcmdError::InvalidRequest("Empty instruction".to_string()));
        }

        if PRONOUN_DELETE.is_match(text)
            && let Some(last) = memory.last_path()
        {
            tracing::debug!(path = last, "pronoun delete shortcut");
            let action = Action::DeleteFile {
                path: Some(last.to_string()),
            };
            let mut step = Step::new(text, action, 1.0);
            step.from_pronoun = true;
            return Ok(step);
        }

        let (intent, confidence) = self.classify(text, ctx, memory)?;
        let action = Action::empty(intent).ok_or_else(|| {
            HcmdError::UnsupportedIntent(format!("Unsupported request: {}", text))
        })?;

        let mut step = Step::new(text, action, confidence);
        self.fill_slots(&mut step, memory)?;
        if intent.accepts_pattern() {
            step.pattern = detect_pattern(text);
        }
        tracing::debug!(
            input = text,
            intent = %step.intent(),
            from_pronoun = step.from_pronoun,
            pattern = step.pattern.as_deref().unwrap_or(""),
            "step resolved"
        );
        Ok(step)
    }

    fn classify(
        &self,
        text: &str,
        ctx: &SystemContext,
        memory: &SessionMemory,
    ) -> Result<(Intent, f32), HcmdError> {
        for (re, intent) in RULES.iter() {
            if re.is_match(text) {
                return Ok((*intent, 1.0));
            }
        }

        if let Some(intent) = git_follow_up(text, ctx, memory) {
            tracing::debug!(intent = %intent, "git follow-up inferred");
            return Ok((intent, 1.0));
        }

        let classification = self.oracle.classify(text);
        if classification.confidence < self.intent_threshold {
            tracing::debug!(
                label = %classification.label,
                confidence = classification.confidence,
                "classification below threshold"
            );
            return Err(HcmdError::LowConfidence(LOW_INTENT_CONFIDENCE.to_string()));
        }
        let intent = classification
            .label
            .parse::<Intent>()
            .unwrap_or(Intent::Unknown);
        match intent {
            Intent::Forbidden => Err(HcmdError::UnsafeOperation(format!(
                "Refusing forbidden request: {}",
                text
            ))),
            Intent::Unknown => Err(HcmdError::UnsupportedIntent(format!(
                "Unsupported request: {}",
                text
            ))),
            _ => Ok((intent, classification.confidence)),
        }
    }

    /// Span text if it clears the span threshold. Pronouns resolve from
    /// memory and mark the step; an unresolvable pronoun counts as missing.
    fn span_value(&self, step: &mut Step, span: Span, memory: &SessionMemory) -> Option<String> {
        let value = span.accept(self.span_threshold)?.to_string();
        if PRONOUNS.contains(&value.to_lowercase().as_str()) {
            let last = memory.last_path()?;
            step.from_pronoun = true;
            return Some(last.to_string());
        }
        Some(value)
    }

    fn extract_into(
        &self,
        step: &mut Step,
        kind: SpanKind,
        slot: SlotName,
        memory: &SessionMemory,
    ) -> bool {
        let span = self.oracle.extract(&step.text, kind);
        match self.span_value(step, span, memory) {
            Some(value) => step.action.set_slot(slot, value),
            None => false,
        }
    }

    fn fill_slots(&self, step: &mut Step, memory: &SessionMemory) -> Result<(), HcmdError> {
        match step.intent() {
            Intent::Navigation => {
                if !self.extract_into(step, SpanKind::Navigation, SlotName::Path, memory) {
                    return Err(HcmdError::MissingTarget("No directory specified".to_string()));
                }
            }
            Intent::CreateDir => {
                if !self.extract_into(step, SpanKind::Directory, SlotName::Path, memory) {
                    return Err(HcmdError::MissingTarget("No directory specified".to_string()));
                }
            }
            Intent::DeleteDir => {
                if !self.extract_into(step, SpanKind::Directory, SlotName::Path, memory)
                    && !fallback(step, SlotName::Path, memory.last_path())
                {
                    return Err(HcmdError::MissingTarget("No directory specified".to_string()));
                }
            }
            Intent::CreateFile | Intent::ReadFile => {
                self.extract_into(step, SpanKind::Object, SlotName::Path, memory);
            }
            Intent::DeleteFile => {
                if !self.extract_into(step, SpanKind::Object, SlotName::Path, memory) {
                    fallback(step, SlotName::Path, memory.last_path());
                }
            }
            Intent::MoveFile | Intent::CopyFile => {
                if !self.extract_into(step, SpanKind::Source, SlotName::Src, memory) {
                    fallback(step, SlotName::Src, memory.last_src());
                }
                if !self.extract_into(step, SpanKind::Destination, SlotName::Dst, memory) {
                    fallback(step, SlotName::Dst, memory.last_dst());
                }
            }
            Intent::RenameFile => {
                let (src, dst) = self.oracle.extract_rename(&step.text);
                match self.span_value(step, src, memory) {
                    Some(value) => {
                        step.action.set_slot(SlotName::Src, value);
                    }
                    None => {
                        fallback(step, SlotName::Src, memory.last_src());
                    }
                }
                match self.span_value(step, dst, memory) {
                    Some(value) => {
                        step.action.set_slot(SlotName::Dst, value);
                    }
                    None => {
                        fallback(step, SlotName::Dst, memory.last_dst());
                    }
                }
                let src = step.action.slot(SlotName::Src);
                if src.is_some() && src == step.action.slot(SlotName::Dst) {
                    return Err(HcmdError::InvalidRequest(RENAME_IDENTICAL.to_string()));
                }
            }
            Intent::ProcessKill => {
                self.extract_into(step, SpanKind::ProcessTarget, SlotName::Target, memory);
            }
            Intent::GitAdd => {
                self.extract_into(step, SpanKind::GitAdd, SlotName::Path, memory);
            }
            Intent::GitCheckout => {
                self.extract_into(step, SpanKind::GitCheckout, SlotName::Branch, memory);
            }
            Intent::GitClone => {
                self.extract_into(step, SpanKind::GitClone, SlotName::Repo, memory);
            }
            Intent::GitCommit => {
                if let Some(message) = quoted(&step.text) {
                    step.action.set_slot(SlotName::Message, message);
                }
            }
            _ => {}
        }
        Ok(())
    }
}

fn fallback(step: &mut Step, slot: SlotName, remembered: Option<&str>) -> bool {
    match remembered {
        Some(value) => {
            tracing::debug!(slot = slot.as_str(), value, "slot filled from memory");
            step.action.set_slot(slot, value)
        }
        None => false,
    }
}

fn git_follow_up(text: &str, ctx: &SystemContext, memory: &SessionMemory) -> Option<Intent> {
    if !ctx.is_git_repo || GIT_WORD.is_match(text) {
        return None;
    }
    let previous = memory.last_git_intent()?.parse::<Intent>().ok()?;
    if !previous.is_git() {
        return None;
    }
    GIT_FOLLOW_UP
        .iter()
        .find(|(re, _)| re.is_match(text))
        .map(|(_, intent)| *intent)
}

/// First quoted substring, used as a commit message.
pub fn quoted(text: &str) -> Option<String> {
    let caps = QUOTED.captures(text)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().trim().to_string())
        .filter(|m| !m.is_empty())
}

/// First whitespace token carrying a wildcard. A lone trailing `?` is
/// question punctuation, not a wildcard.
pub fn detect_pattern(text: &str) -> Option<String> {
    text.split_whitespace()
        .map(|token| token.trim_matches(|c| c == '"' || c == '\''))
        .map(|token| {
            if !token.contains('*') {
                token.trim_end_matches('?')
            } else {
                token
            }
        })
        .find(|token| token.contains('*') || token.contains('?'))
        .map(str::to_string)
}
