//! Intent families. Each one synthesizes commands and their inverses for a
//! group of related intents.

pub mod files;
pub mod git;
pub mod navigation;
pub mod process;

use crate::core::step::Action;
use crate::core::synth::CommandFamily;

static NAVIGATION: navigation::NavigationFamily = navigation::NavigationFamily;
static FILES: files::FileFamily = files::FileFamily;
static PROCESS: process::ProcessFamily = process::ProcessFamily;
static GIT: git::GitFamily = git::GitFamily;

pub fn family_for(action: &Action) -> &'static dyn CommandFamily {
    match action {
        Action::Navigation { .. } | Action::ListFiles | Action::Pwd => &NAVIGATION,
        Action::CreateFile { .. }
        | Action::CreateDir { .. }
        | Action::ReadFile { .. }
        | Action::DeleteFile { .. }
        | Action::DeleteDir { .. }
        | Action::CopyFile { .. }
        | Action::MoveFile { .. }
        | Action::RenameFile { .. } => &FILES,
        Action::ProcessList
        | Action::ProcessKill { .. }
        | Action::SystemInfo
        | Action::NetworkInfo => &PROCESS,
        Action::Git(_) => &GIT,
    }
}
