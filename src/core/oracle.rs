//! NLU oracle contract.
//!
//! The engine only needs two pure functions: text to (label, confidence),
//! and text to a named span with confidence. `KeywordOracle` is the
//! production adapter; `ScriptedOracle` answers from tables for tests.

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: String,
    pub confidence: f32,
}

impl Classification {
    pub fn new(label: &str, confidence: f32) -> Self {
        Self {
            label: label.to_string(),
            confidence,
        }
    }

    pub fn unknown() -> Self {
        Self::new("UNKNOWN", 0.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub text: String,
    pub confidence: f32,
}

impl Span {
    pub fn new(text: &str, confidence: f32) -> Self {
        Self {
            text: text.to_string(),
            confidence,
        }
    }

    pub fn none() -> Self {
        Self::new("", 0.0)
    }

    /// The span text if it clears `threshold` and is non-empty.
    pub fn accept(&self, threshold: f32) -> Option<&str> {
        let text = self.text.trim();
        (self.confidence >= threshold && !text.is_empty()).then_some(text)
    }
}

/// Independently trained extractors, one per argument shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpanKind {
    Navigation,
    Object,
    Directory,
    Source,
    Destination,
    GitAdd,
    GitCheckout,
    GitClone,
    ProcessTarget,
}

pub trait IntentClassifier {
    fn classify(&self, text: &str) -> Classification;
}

pub trait SpanExtractor {
    fn extract(&self, text: &str, kind: SpanKind) -> Span;

    /// Rename takes both paths from one joint pass.
    fn extract_rename(&self, text: &str) -> (Span, Span);
}

pub trait Oracle: IntentClassifier + SpanExtractor {}

impl<T: IntentClassifier + SpanExtractor> Oracle for T {}

/// Deterministic oracle answering from lookup tables.
#[derive(Debug, Default, Clone)]
pub struct ScriptedOracle {
    intents: HashMap<String, Classification>,
    spans: HashMap<(String, SpanKind), Span>,
    renames: HashMap<String, (Span, Span)>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intent(mut self, text: &str, label: &str, confidence: f32) -> Self {
        self.intents
            .insert(text.to_string(), Classification::new(label, confidence));
        self
    }

    pub fn span(mut self, text: &str, kind: SpanKind, value: &str, confidence: f32) -> Self {
        self.spans
            .insert((text.to_string(), kind), Span::new(value, confidence));
        self
    }

    pub fn rename(mut self, text: &str, src: &str, dst: &str, confidence: f32) -> Self {
        self.renames.insert(
            text.to_string(),
            (Span::new(src, confidence), Span::new(dst, confidence)),
        );
        self
    }
}

impl IntentClassifier for ScriptedOracle {
    fn classify(&self, text: &str) -> Classification {
        self.intents
            .get(text)
            .cloned()
            .unwrap_or_else(Classification::unknown)
    }
}

impl SpanExtractor for ScriptedOracle {
    fn extract(&self, text: &str, kind: SpanKind) -> Span {
        self.spans
            .get(&(text.to_string(), kind))
            .cloned()
            .unwrap_or_else(Span::none)
    }

    fn extract_rename(&self, text: &str) -> (Span, Span) {
        self.renames
            .get(text)
            .cloned()
            .unwrap_or_else(|| (Span::none(), Span::none()))
    }
}
