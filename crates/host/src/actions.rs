// Privileged side effects, behind a trait so the dispatcher can be
// exercised without touching the machine.

use std::process::Command;

use anyhow::{bail, Context, Result};

pub trait PrivilegedActions: Send + Sync {
    /// Stop every process belonging to the named application account.
    fn force_stop(&self, app: &str) -> Result<()>;

    /// Trigger an immediate system reboot. Irreversible; the host may
    /// never return from a successful call.
    fn reboot(&self) -> Result<()>;
}

/// Shells out for both actions. The host runs with enough privilege
/// for these to succeed; any non-zero exit is reported as an error
/// for the dispatcher to convert into the failure sentinel.
pub struct ProcessActions;

impl PrivilegedActions for ProcessActions {
    fn force_stop(&self, app: &str) -> Result<()> {
        let status = Command::new("pkill")
            .args(["-KILL", "-u", app])
            .status()
            .context("failed to spawn pkill")?;
        // pkill exits non-zero when nothing matched, which covers the
        // "target does not exist" failure case.
        if !status.success() {
            bail!("pkill -u {app} exited with {status}");
        }
        Ok(())
    }

    fn reboot(&self) -> Result<()> {
        let status =
            Command::new("systemctl").arg("reboot").status().context("failed to spawn systemctl")?;
        if !status.success() {
            bail!("systemctl reboot exited with {status}");
        }
        Ok(())
    }
}
