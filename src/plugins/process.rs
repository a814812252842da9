use crate::core::context::{OsFamily, SystemContext};
use crate::core::error::HcmdError;
use crate::core::intent::Intent;
use crate::core::step::Action;
use crate::core::synth::CommandFamily;

/// Process listing and termination, system and network info.
pub struct ProcessFamily;

fn kill(target: &str, os: OsFamily) -> Result<String, HcmdError> {
    let target = target.trim();
    if !target.is_empty() && target.chars().all(|c| c.is_ascii_digit()) {
        return Ok(if os.is_windows() {
            format!("taskkill /PID {} /F", target)
        } else {
            format!("kill {}", target)
        });
    }
    // Names go on the command line unquoted.
    let valid = !target.is_empty()
        && target
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if !valid {
        return Err(HcmdError::InvalidRequest(format!(
            "Not a process id or name: {}",
            target
        )));
    }
    Ok(if os.is_windows() {
        let name = target.strip_suffix(".exe").unwrap_or(target);
        format!("taskkill /IM {}.exe /F", name)
    } else {
        format!("killall {}", target)
    })
}

impl CommandFamily for ProcessFamily {
    fn name(&self) -> &'static str {
        "process"
    }

    fn synthesize(&self, action: &Action, ctx: &SystemContext) -> Result<Option<String>, HcmdError> {
        let os = ctx.os_type;
        let command = match action {
            Action::ProcessList if os.is_windows() => "Get-Process".to_string(),
            Action::ProcessList => "ps aux".to_string(),
            Action::SystemInfo if os.is_windows() => "Get-ComputerInfo".to_string(),
            Action::SystemInfo => "uname -a".to_string(),
            Action::NetworkInfo => match os {
                OsFamily::Windows => "Get-NetIPAddress".to_string(),
                OsFamily::Linux => "ip addr".to_string(),
                OsFamily::MacOs | OsFamily::Unknown => "ifconfig".to_string(),
            },
            Action::ProcessKill { target } => match target {
                Some(target) => kill(target, os)?,
                None => return Ok(None),
            },
            _ => return Ok(None),
        };
        Ok(Some(command))
    }

    fn rollback(&self, _action: &Action, _ctx: &SystemContext) -> Option<String> {
        None
    }

    fn is_reversible(&self, _intent: Intent) -> bool {
        false
    }
}
