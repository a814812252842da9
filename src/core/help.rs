//! `hcmd help [topic]` text.

use crate::core::error::HcmdError;

pub const TOPICS: &[&str] = &["files", "pronouns", "git", "explain", "rollback"];

const OVERVIEW: &str = "\
hcmd turns plain English into shell commands.

Usage:
  hcmd [--dry-run] [--explain] [--json] [--config PATH] [--yes] <instruction...>
  hcmd help [topic]
  hcmd rollback
  hcmd version

Examples:
  hcmd go to downloads
  hcmd create notes.txt and then list files
  hcmd move *.txt to backup

Chain steps with \"and\", \"then\", \"and then\" or \";\". Multi-step plans are
shown for confirmation before anything runs.

Topics: files, pronouns, git, explain, rollback";

const FILES: &str = "\
File operations:
  create notes.txt            make a folder called reports
  read notes.txt              delete old.log
  remove the build folder     copy a.txt to backup
  move *.txt to archive       rename draft.md to final.md

Bare names are searched for under the current directory. One match is used
directly; several matches ask you to pick one. Deletes always ask first.
\"downloads\", \"documents\" and \"desktop\" mean your user folders. Going
to one that does not exist fails with \"No such directory\"; hcmd never
creates it for you. A wildcard move skips files already in the destination.";

const PRONOUNS: &str = "\
Pronouns:
  \"it\", \"this\", \"that\" and \"there\" refer to the last file or folder hcmd
  touched, so \"create notes.txt\" followed by \"delete it\" removes notes.txt.
  Move, copy and rename also remember their source and destination; leave one
  out and the remembered one is used.";

const GIT: &str = "\
Git:
  git status       git add main.rs / git add everything
  commit \"message\" git checkout develop
  git branch       git clone <url>
  git log          git pull / git push / git diff
  git reset        (hard reset, always asks first)

Right after a git command you may drop the word \"git\": \"checkout main\",
\"add notes.md\", \"commit\". Git commands outside a repository ask first.";

const EXPLAIN: &str = "\
--explain resolves every step without running anything and prints JSON:
the intent, resolved slots, whether a pronoun was used, any wildcard and its
matches, the command, the safety verdict and the rollback command.
--dry-run prints the commands instead of running them.";

const ROLLBACK: &str = "\
Rollback:
  hcmd rollback undoes the most recent reversible action: creating a file or
  folder, a move, a rename or a git add. Deletes, copies, checkouts and resets
  cannot be undone. With --dry-run the command is shown and kept.";

pub fn help_text(topic: Option<&str>) -> Result<&'static str, HcmdError> {
    let Some(topic) = topic else {
        return Ok(OVERVIEW);
    };
    match topic.trim().to_lowercase().as_str() {
        "files" | "file" => Ok(FILES),
        "pronouns" | "pronoun" => Ok(PRONOUNS),
        "git" => Ok(GIT),
        "explain" | "dry-run" => Ok(EXPLAIN),
        "rollback" | "undo" => Ok(ROLLBACK),
        other => Err(HcmdError::InvalidRequest(format!(
            "Unknown help topic '{}' (topics: {})",
            other,
            TOPICS.join(", ")
        ))),
    }
}
