//! Uninstaller functionality.
//!
//! There is no record of what was installed. Both the generated script (see
//! [`script`]) and [`Uninstaller`] remove everything the installer could have
//! created, checking each item first, so they can be run any number of times.
use crate::{
    error::{AddContext, AddInstallerContext, InstallerError},
    inst::InstallConfig,
    os::service::{ServiceManager, SystemCtl},
};

pub mod script;

/// Reverses an installation in-process.
pub struct Uninstaller {
    config: InstallConfig,
    service_manager: Box<dyn ServiceManager>,
}

impl Uninstaller {
    /// Creates a new uninstaller using `systemctl`.
    pub fn new(config: &InstallConfig) -> Self {
        Self {
            config: config.clone(),
            service_manager: Box::new(SystemCtl),
        }
    }

    /// Replaces the service manager.
    pub fn with_service_manager<S>(mut self, service_manager: S) -> Self
    where
        S: ServiceManager + 'static,
    {
        self.service_manager = Box::new(service_manager);
        self
    }

    /// Removes every installed item that is still present.
    pub fn run(&mut self) -> Result<(), InstallerError> {
        self.remove_install_dir()
            .inst_context("failed to remove application directory")?;
        self.remove_desktop_entry()
            .inst_context("failed to remove desktop entry")?;
        self.remove_patches()
            .inst_context("failed to remove shell patches")?;
        self.remove_monitor()
            .inst_context("failed to remove log monitor")?;

        Ok(())
    }

    fn remove_install_dir(&self) -> Result<(), InstallerError> {
        let path = &self.config.paths.install_dir;

        if path.is_dir() {
            tracing::info!(?path, "removing application directory");
            std::fs::remove_dir_all(path).with_contextc(|_| format!("could not remove {path:?}"))?;
        } else {
            tracing::info!(?path, "application directory not present");
        }

        Ok(())
    }

    fn remove_desktop_entry(&self) -> Result<(), InstallerError> {
        let path = &self.config.paths.desktop_entry;

        if path.is_file() {
            tracing::info!(?path, "removing desktop entry");
            std::fs::remove_file(path).with_contextc(|_| format!("could not remove {path:?}"))?;
        }

        Ok(())
    }

    fn remove_patches(&self) -> Result<(), InstallerError> {
        for profile in &self.config.paths.shell_profiles {
            crate::patch::remove_lines_in_file(profile, self.config.patch_pattern())?;
        }

        Ok(())
    }

    fn remove_monitor(&self) -> Result<(), InstallerError> {
        let paths = &self.config.paths;
        let unit_name = paths.monitor_unit_name();

        if self.service_manager.is_active(&unit_name) {
            tracing::info!(unit_name, "stopping log monitor");
            self.service_manager.stop(&unit_name)?;
            self.service_manager.disable(&unit_name)?;
        }

        let mut removed = false;

        if paths.monitor_unit.is_file() {
            tracing::info!(path = ?paths.monitor_unit, "removing unit file");
            std::fs::remove_file(&paths.monitor_unit)?;
            removed = true;
        }

        if paths.monitor_dir.is_dir() {
            tracing::info!(path = ?paths.monitor_dir, "removing log monitor directory");
            std::fs::remove_dir_all(&paths.monitor_dir)?;
            removed = true;
        }

        if removed {
            self.service_manager.reload()?;
        }

        Ok(())
    }
}

impl std::fmt::Debug for Uninstaller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Uninstaller")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
