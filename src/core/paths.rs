//! Path normalization shared by synthesis, ambiguity and rollback.
//!
//! `normalize` is idempotent: its output is always absolute and lexically
//! clean, and absolute clean input is returned unchanged.

use crate::core::context::SystemContext;
use std::path::{Component, Path, PathBuf};

/// Aliases that map to a user folder instead of a cwd-relative path.
pub const WELL_KNOWN_ALIASES: &[&str] = &["downloads", "documents", "desktop"];

/// Absolute location of a well-known user folder, if `name` is one.
pub fn well_known_dir(name: &str) -> Option<PathBuf> {
    let lower = name.trim().to_lowercase();
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"));
    let dir = match lower.as_str() {
        "downloads" => dirs::download_dir().unwrap_or_else(|| home.join("Downloads")),
        "documents" => dirs::document_dir().unwrap_or_else(|| home.join("Documents")),
        "desktop" => dirs::desktop_dir().unwrap_or_else(|| home.join("Desktop")),
        "home" | "~" => home,
        _ => return None,
    };
    Some(dir)
}

pub fn is_well_known(name: &str) -> bool {
    well_known_dir(name).is_some()
}

/// A bare name has no separators and no special meaning: it has to be
/// searched for rather than resolved.
pub fn is_bare_name(raw: &str) -> bool {
    let raw = strip_quotes(raw);
    !raw.is_empty()
        && !raw.contains('/')
        && !raw.contains('\\')
        && !matches!(raw, "." | ".." | "~")
        && !is_well_known(raw)
        && !Path::new(raw).is_absolute()
}

fn strip_quotes(raw: &str) -> &str {
    raw.trim().trim_matches(|c| c == '"' || c == '\'').trim()
}

/// Resolve `raw` against the context's working directory.
pub fn normalize(raw: &str, ctx: &SystemContext) -> String {
    normalize_from(raw, &ctx.cwd)
}

pub fn normalize_from(raw: &str, cwd: &Path) -> String {
    let raw = strip_quotes(raw);
    if let Some(dir) = well_known_dir(raw) {
        return clean(&dir).to_string_lossy().to_string();
    }
    let expanded = if let Some(rest) = raw.strip_prefix("~/") {
        dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| cwd.join(rest))
    } else {
        PathBuf::from(raw)
    };
    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        cwd.join(expanded)
    };
    clean(&absolute).to_string_lossy().to_string()
}

/// Lexical cleanup: drops `.`, folds `..`, never climbs above the root.
fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(p) => out.push(p.as_os_str()),
            Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                let at_root = out.parent().is_none();
                if !at_root {
                    out.pop();
                }
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}

/// Last path component, used when a destination is a directory.
pub fn base_name(path: &str) -> Option<String> {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
}
