//! Terminal rendering: command echo, warnings, one-line errors.

use colored::Colorize;

/// Collapse newlines/extra whitespace and bound length for terminal display.
pub fn compact_line(input: &str, max_chars: usize) -> String {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = collapsed.chars();
    let preview: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", preview)
    } else {
        preview
    }
}

/// Failures always render as exactly one line.
pub fn error_line(reason: &str) -> String {
    format!("ERROR: {}", compact_line(reason, 400))
}

pub fn print_error(reason: &str) {
    eprintln!("{}", error_line(reason).red());
}

pub fn print_warning(warning: &str) {
    eprintln!("{} {}", "WARNING:".yellow().bold(), warning.yellow());
}

pub fn print_command(command: &str) {
    println!("{}", command.green());
}

pub fn print_output(text: &str) {
    if !text.trim().is_empty() {
        println!("{}", text);
    }
}

/// "1. CREATE_FILE: create a.txt" lines for the plan confirmation.
pub fn plan_lines(items: &[(String, String)]) -> Vec<String> {
    items
        .iter()
        .enumerate()
        .map(|(i, (intent, text))| format!("{}. {}: {}", i + 1, intent, compact_line(text, 80)))
        .collect()
}
