use crate::core::context::{OsFamily, SystemContext};
use crate::core::error::HcmdError;
use crate::core::intent::{Intent, SlotName};
use crate::core::paths;
use crate::core::step::Action;
use crate::core::synth::{CommandFamily, landing_path, path_slot, quote, rename_paths};
use std::path::Path;

/// File and directory operations.
pub struct FileFamily;

fn delete_file(path: &str, os: OsFamily) -> String {
    if os.is_windows() {
        format!("Remove-Item -LiteralPath {} -Force", quote(path, os))
    } else {
        format!("rm {}", quote(path, os))
    }
}

fn delete_dir(path: &str, os: OsFamily) -> String {
    if os.is_windows() {
        format!("Remove-Item -LiteralPath {} -Recurse -Force", quote(path, os))
    } else {
        format!("rm -r {}", quote(path, os))
    }
}

fn move_to(src: &str, dst: &str, os: OsFamily) -> String {
    if os.is_windows() {
        format!("Move-Item {} {}", quote(src, os), quote(dst, os))
    } else {
        format!("mv {} {}", quote(src, os), quote(dst, os))
    }
}

/// Rename-Item takes a bare new name, mv takes a full path.
fn rename(src: &str, dst: &str, os: OsFamily) -> String {
    if os.is_windows() {
        let name = paths::base_name(dst).unwrap_or_else(|| dst.to_string());
        format!("Rename-Item {} {}", quote(src, os), quote(&name, os))
    } else {
        format!("mv {} {}", quote(src, os), quote(dst, os))
    }
}

fn src_dst(action: &Action, ctx: &SystemContext) -> Option<(String, String)> {
    let src = path_slot(action, SlotName::Src, ctx)?;
    let dst = path_slot(action, SlotName::Dst, ctx)?;
    Some((src, dst))
}

impl CommandFamily for FileFamily {
    fn name(&self) -> &'static str {
        "files"
    }

    fn synthesize(&self, action: &Action, ctx: &SystemContext) -> Result<Option<String>, HcmdError> {
        let os = ctx.os_type;
        let windows = os.is_windows();
        let command = match action {
            Action::CreateFile { .. } => path_slot(action, SlotName::Path, ctx).map(|p| {
                if windows {
                    format!("New-Item -ItemType File {}", quote(&p, os))
                } else {
                    format!("touch {}", quote(&p, os))
                }
            }),
            Action::CreateDir { .. } => path_slot(action, SlotName::Path, ctx).map(|p| {
                if windows {
                    format!("New-Item -ItemType Directory {}", quote(&p, os))
                } else {
                    format!("mkdir {}", quote(&p, os))
                }
            }),
            Action::ReadFile { .. } => path_slot(action, SlotName::Path, ctx).map(|p| {
                if windows {
                    format!("Get-Content {}", quote(&p, os))
                } else {
                    format!("cat {}", quote(&p, os))
                }
            }),
            Action::DeleteFile { .. } => match path_slot(action, SlotName::Path, ctx) {
                Some(p) if Path::new(&p).is_dir() => {
                    return Err(HcmdError::InvalidRequest(format!(
                        "'{}' is a directory; ask to delete the folder instead",
                        p
                    )));
                }
                Some(p) => Some(delete_file(&p, os)),
                None => None,
            },
            Action::DeleteDir { .. } => {
                path_slot(action, SlotName::Path, ctx).map(|p| delete_dir(&p, os))
            }
            Action::MoveFile { .. } => src_dst(action, ctx)
                .map(|(src, dst)| move_to(&src, &landing_path(&src, &dst), os)),
            Action::CopyFile { .. } => src_dst(action, ctx).map(|(src, dst)| {
                let dst = landing_path(&src, &dst);
                if windows {
                    format!("Copy-Item {} {}", quote(&src, os), quote(&dst, os))
                } else {
                    format!("cp {} {}", quote(&src, os), quote(&dst, os))
                }
            }),
            Action::RenameFile { .. } => {
                rename_paths(action, ctx).map(|(src, dst)| rename(&src, &dst, os))
            }
            _ => None,
        };
        Ok(command)
    }

    fn rollback(&self, action: &Action, ctx: &SystemContext) -> Option<String> {
        let os = ctx.os_type;
        match action {
            Action::CreateFile { .. } => {
                path_slot(action, SlotName::Path, ctx).map(|p| delete_file(&p, os))
            }
            Action::CreateDir { .. } => {
                path_slot(action, SlotName::Path, ctx).map(|p| delete_dir(&p, os))
            }
            Action::MoveFile { .. } => {
                let (src, dst) = src_dst(action, ctx)?;
                let moved = landing_path(&src, &dst);
                let origin = Path::new(&src).parent()?.to_string_lossy().to_string();
                Some(move_to(&moved, &origin, os))
            }
            Action::RenameFile { .. } => {
                let (src, dst) = rename_paths(action, ctx)?;
                Some(rename(&dst, &src, os))
            }
            _ => None,
        }
    }

    fn is_reversible(&self, intent: Intent) -> bool {
        matches!(
            intent,
            Intent::CreateFile | Intent::CreateDir | Intent::MoveFile | Intent::RenameFile
        )
    }
}
