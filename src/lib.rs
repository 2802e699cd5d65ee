//! Installer for the Lumen desktop application on Linux.
//!
//! The installer downloads a list of releases, lets the user pick one along
//! with a set of optional components, and performs only the chosen steps:
//!
//! 1. Download the application into `/opt/lumen` and create a desktop
//!    launcher.
//! 2. Patch `~/.bashrc` and `~/.zshrc` to export
//!    `WEBKIT_DISABLE_DMABUF_RENDERER=1`.
//! 3. Install a systemd service that prepends a privacy warning to the
//!    application's log files.
//!
//! A standalone uninstaller script is written at the end of every run.
//!
//! ## Example
//!
//! ```no_run
//! # use deskcrate::inst::InstallConfig;
//! let config = InstallConfig::new()?;
//! let report = deskcrate::install_interactive(&config)?;
//! println!("installed {}", report.version.name);
//! # Ok::<(), deskcrate::error::InstallerError>(())
//! ```
//!
//! ## Installer principles
//!
//! Steps are independent. A failure stops the remaining steps but nothing
//! already done is rolled back.
//!
//! There is no record of what was installed. Uninstalling removes every
//! item at its fixed location if it exists, so it is safe to repeat.
//!
//! ### Terminal security
//!
//! The installer must run as root. If a GUI terminal is launched with
//! administrator-level permissions, it may be possible for a user to
//! access unauthorized administrator-level resources through the terminal
//! application.
use error::InstallerError;
use inst::{InstallConfig, InstallReport, Installer};
use prompt::UserPrompt;
use uninst::Uninstaller;

pub mod error;
pub mod inst;
mod locale;
pub mod manifest;
pub mod monitor;
pub mod net;
pub mod os;
pub mod patch;
pub mod path;
pub mod prompt;
pub mod select;
mod tui;
pub mod uninst;

/// Starts the installer with a interactive interface.
///
/// A terminal user interface (TUI) will guide the user through the release
/// and option menus and perform the installation.
///
/// If the user exits the intro or the release menu, the error kind
/// [`InterruptedByUser`](crate::error::InstallerErrorKind::InterruptedByUser)
/// will be returned. If an error occurs, an appropriate error kind will be
/// returned.
pub fn install_interactive(config: &InstallConfig) -> Result<InstallReport, InstallerError> {
    let mut installer = Installer::new(config);
    installer.run_interactive()
}

/// Installs with the menus answered by the given prompt.
///
/// This function is intended for "quiet" installs where the installation
/// occurs automatically, such as, a shell script.
pub fn install(
    config: &InstallConfig,
    prompt: &dyn UserPrompt,
) -> Result<InstallReport, InstallerError> {
    let mut installer = Installer::new(config);
    installer.run(prompt)
}

/// Removes everything an installation could have created.
///
/// Requires superuser privileges. Items that are not present are skipped.
pub fn uninstall(config: &InstallConfig) -> Result<(), InstallerError> {
    crate::os::require_elevated()?;

    let mut uninstaller = Uninstaller::new(config);
    uninstaller.run()
}
