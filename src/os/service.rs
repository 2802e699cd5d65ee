//! Service manager (systemd) control.
use std::process::Command;

use crate::error::{InstallerError, InstallerErrorKind};

/// Operations on the system service manager.
pub trait ServiceManager {
    /// Reloads unit files from disk.
    fn reload(&self) -> Result<(), InstallerError>;

    /// Enables the unit at boot and starts it immediately.
    fn enable_now(&self, unit: &str) -> Result<(), InstallerError>;

    /// Stops the unit.
    fn stop(&self, unit: &str) -> Result<(), InstallerError>;

    /// Disables the unit at boot.
    fn disable(&self, unit: &str) -> Result<(), InstallerError>;

    /// Returns whether the unit is currently active.
    fn is_active(&self, unit: &str) -> bool;
}

/// [`ServiceManager`] backed by the `systemctl` command.
#[derive(Debug, Clone, Default)]
pub struct SystemCtl;

impl SystemCtl {
    fn call(&self, args: &[&str]) -> Result<(), InstallerError> {
        tracing::info!(?args, "systemctl");

        let output = Command::new("systemctl").args(args).output()?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!(?args, status = ?output.status, %stderr, "systemctl failed");

            Err(InstallerError::new(InstallerErrorKind::ServiceManager)
                .with_context(format!("systemctl {}: {}", args.join(" "), stderr.trim())))
        }
    }
}

impl ServiceManager for SystemCtl {
    fn reload(&self) -> Result<(), InstallerError> {
        self.call(&["daemon-reload"])
    }

    fn enable_now(&self, unit: &str) -> Result<(), InstallerError> {
        self.call(&["enable", "--now", unit])
    }

    fn stop(&self, unit: &str) -> Result<(), InstallerError> {
        self.call(&["stop", unit])
    }

    fn disable(&self, unit: &str) -> Result<(), InstallerError> {
        self.call(&["disable", unit])
    }

    fn is_active(&self, unit: &str) -> bool {
        Command::new("systemctl")
            .args(["is-active", "--quiet", unit])
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }
}
