//! Version and option selection.
use std::collections::BTreeSet;

use crate::{
    error::{InstallerError, InstallerErrorKind},
    manifest::{VersionEntry, VersionManifest},
    prompt::{Choice, UserPrompt},
};

/// An optional installation step offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOption {
    /// Download and install the application.
    InstallApp,
    /// Patch the shell startup files.
    ApplyPatches,
    /// Install the log monitor service.
    InstallMonitor,
}

impl InstallOption {
    /// Menu order.
    pub const ALL: [InstallOption; 3] = [
        Self::InstallApp,
        Self::ApplyPatches,
        Self::InstallMonitor,
    ];

    /// Label shown in the menu.
    pub fn label(&self) -> &'static str {
        match self {
            Self::InstallApp => "Install app",
            Self::ApplyPatches => "Apply patches",
            Self::InstallMonitor => "Install monitor",
        }
    }

    /// Whether the option is pre-checked.
    pub fn default_checked(&self) -> bool {
        match self {
            Self::InstallApp => true,
            Self::ApplyPatches => true,
            Self::InstallMonitor => false,
        }
    }

    /// Looks an option up by its label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|option| option.label() == label)
    }
}

/// The chosen subset of optional steps.
///
/// Desktop entry creation is not a separate flag; it follows `install_app`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallSelection {
    /// Install the application (and its desktop entry).
    pub install_app: bool,
    /// Patch the shell startup files.
    pub apply_patches: bool,
    /// Install the log monitor service.
    pub install_monitor: bool,
}

impl InstallSelection {
    /// A selection with nothing chosen.
    pub fn none() -> Self {
        Self::default()
    }

    /// Builds a selection from menu labels, ignoring unknown labels.
    pub fn from_labels<'a, I>(labels: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut selection = Self::none();

        for label in labels {
            match InstallOption::from_label(label) {
                Some(InstallOption::InstallApp) => selection.install_app = true,
                Some(InstallOption::ApplyPatches) => selection.apply_patches = true,
                Some(InstallOption::InstallMonitor) => selection.install_monitor = true,
                None => tracing::debug!(label, "ignoring unknown option label"),
            }
        }

        selection
    }

    /// Whether the desktop entry is created.
    pub fn create_desktop_entry(&self) -> bool {
        self.install_app
    }
}

/// Asks the user for a release.
///
/// An empty manifest is an error of kind [`InstallerErrorKind::EmptyManifest`]
/// and no menu is shown.
pub fn select_version(
    prompt: &dyn UserPrompt,
    title: &str,
    manifest: &VersionManifest,
) -> Result<Choice<VersionEntry>, InstallerError> {
    if manifest.is_empty() {
        return Err(InstallerErrorKind::EmptyManifest.into());
    }

    let names = manifest.names();

    match prompt.select_one(title, &names)? {
        Choice::Cancelled => {
            tracing::info!("version selection cancelled");
            Ok(Choice::Cancelled)
        }
        Choice::Chosen(index) => {
            let entry = manifest.entries().get(index).ok_or_else(|| {
                InstallerError::new(InstallerErrorKind::InvalidInput)
                    .with_context(format!("version index {index} out of range"))
            })?;

            tracing::info!(index, name = entry.name, "version selected");

            Ok(Choice::Chosen(entry.clone()))
        }
    }
}

/// Asks the user which optional steps to perform.
pub fn select_options(
    prompt: &dyn UserPrompt,
    title: &str,
) -> Result<Choice<InstallSelection>, InstallerError> {
    let labels: Vec<String> = InstallOption::ALL
        .iter()
        .map(|option| option.label().to_string())
        .collect();
    let defaults: Vec<bool> = InstallOption::ALL
        .iter()
        .map(InstallOption::default_checked)
        .collect();

    let choice = prompt.select_many(title, &labels, &defaults)?;

    Ok(choice.map(|indices: BTreeSet<usize>| {
        let selection = InstallSelection::from_labels(
            indices
                .iter()
                .filter_map(|index| labels.get(*index))
                .map(String::as_str),
        );
        tracing::info!(?selection, "options selected");
        selection
    }))
}
