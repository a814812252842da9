//! Keyword oracle: the production NLU adapter.
//!
//! Phrase tables and regexes over the phrasings the classifier was trained
//! on. A phrase hit scores 0.9; anything else scores 0.0 so the resolver's
//! threshold rejects it instead of guessing.

use crate::core::intent::Intent;
use crate::core::oracle::{Classification, IntentClassifier, Span, SpanExtractor, SpanKind};
use regex::Regex;
use std::sync::LazyLock;

const HIT: f32 = 0.9;

static NOISE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(hey|okay|ok|so|well|please|can you|could you|would you|i want to|i'd like to)\s+")
        .unwrap()
});

static NOISE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+(please|now|for me|quickly)$").unwrap());

/// Ordered: the first matching rule wins.
static INTENT_RULES: LazyLock<Vec<(Intent, Regex)>> = LazyLock::new(|| {
    let rules: &[(Intent, &str)] = &[
        (
            Intent::Forbidden,
            r"\b(format|mkfs|fdisk|diskpart|shutdown|reboot|poweroff|wipe|sudo)\b|\brm\s+-rf\s+/\s*$|\b(delete|remove|erase) (everything|all files) (on|in|from) (the |my )?(system|computer|disk|drive)\b",
        ),
        (Intent::GitLog, r"\bgit log\b|\bcommit history\b|\bgit history\b"),
        (
            Intent::GitClone,
            r"\bgit clone\b|\bclone\b.*(https?://|git@|\.git\b|\brepo)",
        ),
        (
            Intent::GitCheckout,
            r"\bgit (checkout|switch)\b|\bcheckout\b|\b(switch|change) (to )?branch\b|\bswitch branch\b",
        ),
        (Intent::GitCommit, r"\bcommit\b"),
        (Intent::GitAdd, r"\bgit add\b|\bstage\b"),
        (Intent::GitPush, r"\bgit push\b|\bpush (my |the )?(changes|commits|code)\b"),
        (Intent::GitPull, r"\bgit pull\b|\bpull (the )?(latest|changes)\b"),
        (Intent::GitDiff, r"\bgit diff\b|\bshow (the )?diff\b"),
        (Intent::GitReset, r"\bgit reset\b"),
        (Intent::GitBranch, r"\bgit branch(es)?\b|\b(list|show) (the )?branches\b"),
        (Intent::GitStatus, r"\bgit status\b|^git$|\brepo(sitory)? status\b"),
        (
            Intent::ProcessKill,
            r"\b(kill|terminate|taskkill)\b|\bend process\b|\bstop (the )?process\b|^stop \S+$",
        ),
        (
            Intent::ProcessList,
            r"\b(list|show|display)( all| the)?( running)? (processes|tasks)\b|\brunning processes\b|^ps$|\btask ?list\b|\bwhat'?s running\b",
        ),
        (
            Intent::SystemInfo,
            r"\bsystem info(rmation)?\b|\bos (version|info)\b|\buname\b|\bwhat (os|operating system)\b",
        ),
        (
            Intent::NetworkInfo,
            r"\b(ip|network) (address|addresses|info|information|config|configuration)\b|\b(ifconfig|ipconfig)\b|\bmy ip\b",
        ),
        (Intent::RenameFile, r"\brename\b"),
        (Intent::MoveFile, r"\b(move|mv|relocate|transfer)\b"),
        (Intent::CopyFile, r"\b(copy|cp|duplicate)\b"),
        (
            Intent::DeleteDir,
            r"\b(delete|remove|erase|rm|trash)\b.*\b(folder|directory|dir)\b|\brmdir\b",
        ),
        (Intent::DeleteFile, r"\b(delete|remove|erase|rm|trash|del)\b"),
        (
            Intent::CreateDir,
            r"\b(create|make|new|add)\b.*\b(folder|directory|dir)\b|\bmkdir\b",
        ),
        (Intent::CreateFile, r"\b(create|make|touch)\b|\bnew file\b"),
        (
            Intent::ListFiles,
            r"^(ls|dir|list)$|\b(list|show|display)( all| the| my)? files\b|\b(directory|folder) contents\b|\bwhat files\b|^ls\b",
        ),
        (
            Intent::Pwd,
            r"\bwhere am i\b|\b(current|working) (directory|folder|path)\b|\bshow (the )?path\b|\bpwd\b",
        ),
        (
            Intent::ReadFile,
            r"\b(read|cat|display)\b|\bshow (the )?contents of\b|\bopen file\b|\bprint (the )?contents\b|\bopen \S+\.\w+$",
        ),
        (
            Intent::Navigation,
            r"\b(go to|goto|navigate to|take me to|switch to|enter|open|change to|browse to)\b|^cd\b|^go (back|up)$",
        ),
    ];
    rules
        .iter()
        .map(|(intent, pattern)| (*intent, Regex::new(pattern).unwrap()))
        .collect()
});

static GO_UP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(go|cd)\s+(back|up)$|^cd\s+\.\.$").unwrap());

static NAVIGATION_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:go to|goto|navigate to|take me to|switch to|change to|browse to|cd into|cd to|cd|enter|open)\s+(.+)$").unwrap()
});

static OBJECT_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:show the contents of|show contents of|print the contents of|print contents of|create|make|touch|new|delete|remove|erase|rm|trash|del|read|cat|display|open)\s+(.+)$").unwrap()
});

static DIRECTORY_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:create|make|new|mkdir|delete|remove|erase|rmdir|rm|trash)\s+(.+)$")
        .unwrap()
});

static TRANSFER_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:move|mv|relocate|transfer|copy|cp|duplicate)\s+(.+?)\s+(?:to|into|inside|in)\s+(.+)$").unwrap()
});

static TRANSFER_SOURCE_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:move|mv|relocate|transfer|copy|cp|duplicate)\s+(.+)$").unwrap()
});

static RENAME_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\brename\s+(.+?)\s+(?:to|as|into)\s+(.+)$").unwrap());

static GIT_ADD_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:git add|add|stage)\s+(.+)$").unwrap());

static GIT_ADD_BARE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:git add|add|stage)\s*$").unwrap());

static GIT_CHECKOUT_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:git checkout|git switch|checkout|switch to branch|switch branch to|change branch to|switch to|switch)\s+(?:the\s+)?(?:branch\s+)?(\S+)").unwrap()
});

static GIT_CLONE_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bclone\s+(?:the\s+)?(?:repo(?:sitory)?\s+)?(\S+)").unwrap()
});

static PROCESS_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:kill|terminate|taskkill|end|stop)\s+(?:the\s+)?(?:process\s+)?(\S+)")
        .unwrap()
});

const FILE_FILLERS: &[&str] = &["a", "an", "the", "new", "file", "named", "called", "my"];
const DIR_FILLERS: &[&str] = &[
    "a", "an", "the", "new", "folder", "directory", "dir", "named", "called", "my",
];

/// Drop politeness noise and trailing punctuation.
pub fn clean_text(text: &str) -> String {
    let mut current = text.trim().trim_end_matches(['.', '!', '?']).trim().to_string();
    loop {
        let next = NOISE_PREFIX.replace(&current, "").to_string();
        let next = NOISE_SUFFIX.replace(&next, "").to_string();
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Strip leading filler words and a trailing type noun.
fn strip_fillers(raw: &str, fillers: &[&str]) -> String {
    let mut words: Vec<&str> = raw.split_whitespace().collect();
    while words.len() > 1 && fillers.contains(&words[0].to_lowercase().as_str()) {
        words.remove(0);
    }
    while words.len() > 1 {
        let last = words[words.len() - 1].to_lowercase();
        if matches!(last.as_str(), "file" | "folder" | "directory" | "dir") {
            words.pop();
        } else {
            break;
        }
    }
    words
        .join(" ")
        .trim_matches(|c| c == '"' || c == '\'')
        .trim_end_matches([',', '.'])
        .to_string()
}

fn capture(re: &Regex, text: &str, group: usize) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(group))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn hit(value: Option<String>) -> Span {
    match value {
        Some(v) if !v.is_empty() => Span::new(&v, HIT),
        _ => Span::none(),
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordOracle;

impl IntentClassifier for KeywordOracle {
    fn classify(&self, text: &str) -> Classification {
        let cleaned = clean_text(text).to_lowercase();
        if cleaned.is_empty() {
            return Classification::unknown();
        }
        for (intent, re) in INTENT_RULES.iter() {
            if re.is_match(&cleaned) {
                tracing::debug!(input = %cleaned, intent = %intent, "keyword rule matched");
                return Classification::new(intent.label(), HIT);
            }
        }
        Classification::unknown()
    }
}

impl SpanExtractor for KeywordOracle {
    fn extract(&self, text: &str, kind: SpanKind) -> Span {
        let cleaned = clean_text(text);
        match kind {
            SpanKind::Navigation => {
                if GO_UP.is_match(&cleaned) {
                    return Span::new("..", HIT);
                }
                hit(capture(&NAVIGATION_SPAN, &cleaned, 1).map(|s| strip_fillers(&s, DIR_FILLERS)))
            }
            SpanKind::Object => {
                hit(capture(&OBJECT_SPAN, &cleaned, 1).map(|s| strip_fillers(&s, FILE_FILLERS)))
            }
            SpanKind::Directory => hit(
                capture(&DIRECTORY_SPAN, &cleaned, 1).map(|s| strip_fillers(&s, DIR_FILLERS)),
            ),
            SpanKind::Source => {
                let src = capture(&TRANSFER_SPAN, &cleaned, 1)
                    .or_else(|| capture(&TRANSFER_SOURCE_ONLY, &cleaned, 1));
                hit(src.map(|s| strip_fillers(&s, FILE_FILLERS)))
            }
            SpanKind::Destination => hit(
                capture(&TRANSFER_SPAN, &cleaned, 2).map(|s| strip_fillers(&s, DIR_FILLERS)),
            ),
            SpanKind::GitAdd => {
                if GIT_ADD_BARE.is_match(&cleaned) {
                    return Span::new(".", 0.5);
                }
                match capture(&GIT_ADD_SPAN, &cleaned, 1).map(|s| strip_fillers(&s, FILE_FILLERS)) {
                    Some(v)
                        if matches!(
                            v.to_lowercase().as_str(),
                            "all" | "everything" | "all files" | "all changes" | "."
                        ) =>
                    {
                        Span::new(".", HIT)
                    }
                    other => hit(other),
                }
            }
            SpanKind::GitCheckout => hit(capture(&GIT_CHECKOUT_SPAN, &cleaned, 1)),
            SpanKind::GitClone => hit(capture(&GIT_CLONE_SPAN, &cleaned, 1)),
            SpanKind::ProcessTarget => hit(capture(&PROCESS_SPAN, &cleaned, 1)),
        }
    }

    fn extract_rename(&self, text: &str) -> (Span, Span) {
        let cleaned = clean_text(text);
        match RENAME_SPAN.captures(&cleaned) {
            Some(caps) => {
                let src = caps
                    .get(1)
                    .map(|m| strip_fillers(m.as_str(), FILE_FILLERS));
                let dst = caps
                    .get(2)
                    .map(|m| strip_fillers(m.as_str(), FILE_FILLERS));
                (hit(src), hit(dst))
            }
            None => (Span::none(), Span::none()),
        }
    }
}
