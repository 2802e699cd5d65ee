use std::path::PathBuf;

use crate::{
    error::InstallerError, manifest::VersionEntry, select::InstallSelection,
};

/// A single installation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Download the application binary into the install directory.
    InstallApp,
    /// Download the icon and write the desktop launcher.
    CreateDesktopEntry,
    /// Patch the shell startup files.
    ApplyPatches,
    /// Install and start the log monitor service.
    InstallMonitor,
    /// Write the uninstaller script.
    WriteUninstaller,
}

#[derive(Debug, Clone)]
pub struct InstallPlan {
    pub version: VersionEntry,
    pub steps: Vec<Step>,
    pub monitor_source: Option<PathBuf>,
}

#[derive(Debug)]
pub struct Planner {
    version: VersionEntry,
    selection: InstallSelection,
    monitor_source: Option<PathBuf>,
}

impl Planner {
    pub fn new(version: &VersionEntry, selection: &InstallSelection) -> Self {
        Self {
            version: version.clone(),
            selection: *selection,
            monitor_source: None,
        }
    }

    pub fn with_monitor_source(mut self, path: PathBuf) -> Self {
        self.monitor_source = Some(path);
        self
    }

    pub fn run(&mut self) -> Result<InstallPlan, InstallerError> {
        let mut steps = Vec::new();

        if self.selection.install_app {
            steps.push(Step::InstallApp);
        }
        if self.selection.create_desktop_entry() {
            steps.push(Step::CreateDesktopEntry);
        }
        if self.selection.apply_patches {
            steps.push(Step::ApplyPatches);
        }

        let mut monitor_source = None;

        if self.selection.install_monitor {
            steps.push(Step::InstallMonitor);

            monitor_source = match self.monitor_source.take() {
                Some(path) => Some(path),
                None => Some(crate::os::current_exe()?),
            };
        }

        steps.push(Step::WriteUninstaller);

        Ok(InstallPlan {
            version: self.version.clone(),
            steps,
            monitor_source,
        })
    }
}
