//! Wildcard expansion over the working-directory subtree.

use crate::core::context::SystemContext;
use crate::core::paths;
use glob::{MatchOptions, Pattern};
use walkdir::WalkDir;

const MATCH: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Absolute paths of every regular file under `ctx.cwd` whose base name
/// matches `pattern`, sorted. Invalid patterns and no matches both yield an
/// empty list.
pub fn expand(pattern: &str, ctx: &SystemContext) -> Vec<String> {
    let trimmed = pattern.trim().trim_matches(|c| c == '"' || c == '\'');
    // Only the base name is matched; any directory part is dropped.
    let base = trimmed.rsplit(['/', '\\']).next().unwrap_or(trimmed);
    let compiled = match Pattern::new(base) {
        Ok(p) => p,
        Err(e) => {
            tracing::debug!(pattern = trimmed, error = %e, "invalid wildcard pattern");
            return Vec::new();
        }
    };

    let mut files: Vec<String> = WalkDir::new(&ctx.cwd)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| !(entry.file_type().is_dir() && entry.file_name() == ".git"))
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| compiled.matches_with(&entry.file_name().to_string_lossy(), MATCH))
        .map(|entry| paths::normalize_from(&entry.path().to_string_lossy(), &ctx.cwd))
        .collect();
    files.sort();
    files
}
