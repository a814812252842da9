//! Blocking user prompts: yes/no confirmations and numbered choices.

use colored::Colorize;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

pub trait Prompter {
    fn confirm(&mut self, question: &str) -> bool;

    /// Zero-based index of the chosen option; `None` on an invalid or
    /// empty answer.
    fn choose(&mut self, reason: &str, options: &[String]) -> Option<usize>;
}

/// Reads answers from stdin. `assume_yes` answers confirmations without
/// reading, never choices.
pub struct StdinPrompter {
    assume_yes: bool,
}

impl StdinPrompter {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }

    fn read_line(prompt: &str) -> Option<String> {
        eprint!("{}", prompt);
        let _ = io::stderr().flush();
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }
}

pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

impl Prompter for StdinPrompter {
    fn confirm(&mut self, question: &str) -> bool {
        if self.assume_yes {
            eprintln!("{} {}", question.yellow(), "[y/N] y (assumed)".dimmed());
            return true;
        }
        Self::read_line(&format!("{} [y/N] ", question.yellow()))
            .map(|answer| is_affirmative(&answer))
            .unwrap_or(false)
    }

    fn choose(&mut self, reason: &str, options: &[String]) -> Option<usize> {
        eprintln!("{}", reason.yellow());
        for (i, option) in options.iter().enumerate() {
            eprintln!("  {}) {}", i + 1, option);
        }
        let answer = Self::read_line(&format!("Choose 1-{}: ", options.len()))?;
        let index: usize = answer.parse().ok()?;
        (1..=options.len()).contains(&index).then(|| index - 1)
    }
}

/// Answers from a queue and records every question asked. An exhausted
/// queue answers "no" / no choice.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    confirmations: VecDeque<bool>,
    choices: VecDeque<usize>,
    pub asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn yes(mut self) -> Self {
        self.confirmations.push_back(true);
        self
    }

    pub fn no(mut self) -> Self {
        self.confirmations.push_back(false);
        self
    }

    /// Queue a zero-based choice.
    pub fn pick(mut self, index: usize) -> Self {
        self.choices.push_back(index);
        self
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&mut self, question: &str) -> bool {
        self.asked.push(question.to_string());
        self.confirmations.pop_front().unwrap_or(false)
    }

    fn choose(&mut self, reason: &str, _options: &[String]) -> Option<usize> {
        self.asked.push(reason.to_string());
        self.choices.pop_front()
    }
}
