//! Installer functionality.
//!
//! [`Installer`] runs the whole sequence: preflight checks, manifest
//! download, the two menus, and the selected installation steps. The
//! uninstaller script is written at the end of every successful run,
//! whatever was selected.
//!
//! Menus are answered by a [`UserPrompt`]. [`Installer::run_interactive()`]
//! uses the terminal UI while [`Installer::run()`] accepts any prompt, such
//! as a [`crate::prompt::PresetPrompt`] for unattended installs:
//!
//! ```no_run
//! # use deskcrate::inst::{InstallConfig, Installer};
//! # use deskcrate::prompt::PresetPrompt;
//! let config = InstallConfig::new()?;
//! let prompt = PresetPrompt::new()
//!     .with_item("2.4.1")
//!     .with_override("Install monitor", true);
//! let report = Installer::new(&config).run(&prompt)?;
//! println!("installed {}", report.version.name);
//! # Ok::<(), deskcrate::error::InstallerError>(())
//! ```
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use exec::Executor;
use plan::Planner;

use crate::error::{InstallerError, InstallerErrorKind};
use crate::locale::Locale;
use crate::manifest::{VersionEntry, VersionManifest};
use crate::net::{Fetcher, HttpFetcher};
use crate::os::deps::Bootstrapper;
use crate::os::service::{ServiceManager, SystemCtl};
use crate::prompt::{Choice, UserPrompt};
use crate::select::InstallSelection;
use crate::tui::Tui;

pub use self::config::*;
pub use self::plan::Step;

mod config;
mod exec;
mod plan;

/// Summary of a finished installation.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct InstallReport {
    /// Release that was selected.
    pub version: VersionEntry,
    /// Options that were selected.
    pub selection: InstallSelection,
    /// Steps performed, in order.
    pub steps: Vec<Step>,
}

/// The installer interface.
pub struct Installer {
    config: InstallConfig,
    fetcher: Box<dyn Fetcher>,
    service_manager: Box<dyn ServiceManager>,
    check_privileges: bool,
    bootstrap: bool,
    monitor_source: Option<PathBuf>,
    locale: Locale,
    tui: Rc<RefCell<Tui>>,
}

impl Installer {
    /// Create a new installer using HTTP and `systemctl`.
    pub fn new(config: &InstallConfig) -> Self {
        Self {
            config: config.clone(),
            fetcher: Box::new(HttpFetcher::new(
                config.connect_timeout,
                config.read_timeout,
            )),
            service_manager: Box::new(SystemCtl),
            check_privileges: true,
            bootstrap: true,
            monitor_source: None,
            locale: Locale::with_system(),
            tui: Rc::new(RefCell::new(Tui::new(&config.app.display_name))),
        }
    }

    /// Replaces how remote files are downloaded.
    pub fn with_fetcher<F>(mut self, fetcher: F) -> Self
    where
        F: Fetcher + 'static,
    {
        self.fetcher = Box::new(fetcher);
        self
    }

    /// Replaces the service manager.
    pub fn with_service_manager<S>(mut self, service_manager: S) -> Self
    where
        S: ServiceManager + 'static,
    {
        self.service_manager = Box::new(service_manager);
        self
    }

    /// Sets whether superuser privileges are required. Default is true.
    pub fn with_privilege_check(mut self, value: bool) -> Self {
        self.check_privileges = value;
        self
    }

    /// Sets whether missing tools are installed before anything else.
    /// Default is true.
    pub fn with_bootstrap(mut self, value: bool) -> Self {
        self.bootstrap = value;
        self
    }

    /// Sets the binary copied into place as the log monitor.
    ///
    /// Default is the currently running executable.
    pub fn with_monitor_source<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.monitor_source = Some(path.into());
        self
    }

    /// Install with a TUI.
    pub fn run_interactive(&mut self) -> Result<InstallReport, InstallerError> {
        self.preflight()?;

        self.tui.borrow_mut().run_background()?;

        let result = self.run_interactive_impl();

        if let Err(error) = &result {
            tracing::error!(%error, "installation failed");

            if !matches!(error.kind(), InstallerErrorKind::InterruptedByUser) {
                self.tui.borrow().show_error(error)?;
            }
        }

        self.tui.borrow_mut().stop()?;

        result
    }

    fn run_interactive_impl(&self) -> Result<InstallReport, InstallerError> {
        let tui = self.tui.borrow();

        if tui.installation_intro()?.is_cancelled() {
            return Err(InstallerErrorKind::InterruptedByUser.into());
        }

        let report = self.run_impl(&*tui, true)?;

        tui.installation_conclusion(&self.config.paths.uninstaller.to_string_lossy())?;

        Ok(report)
    }

    /// Install with menus answered by `prompt`.
    pub fn run(&mut self, prompt: &dyn UserPrompt) -> Result<InstallReport, InstallerError> {
        self.preflight()?;

        let result = self.run_impl(prompt, false);

        if let Err(error) = &result {
            tracing::error!(%error, "installation failed");
        }

        result
    }

    fn preflight(&self) -> Result<(), InstallerError> {
        if self.check_privileges {
            crate::os::require_elevated()?;
        }

        if self.bootstrap {
            Bootstrapper::new(&self.config.required_tools).run()?;
        }

        Ok(())
    }

    fn run_impl(
        &self,
        prompt: &dyn UserPrompt,
        interactive: bool,
    ) -> Result<InstallReport, InstallerError> {
        let manifest = self.with_progress_dialog(interactive, "fetching-manifest", || {
            self.fetch_manifest()
        })?;

        let title = self.locale.text("select-version-title");
        let version = match crate::select::select_version(prompt, &title, &manifest)? {
            Choice::Chosen(version) => version,
            Choice::Cancelled => {
                return Err(InstallerError::new(InstallerErrorKind::InterruptedByUser)
                    .with_context("no version selected"))
            }
        };

        let title = self.locale.text("select-options-title");
        let selection = match crate::select::select_options(prompt, &title)? {
            Choice::Chosen(selection) => selection,
            Choice::Cancelled => {
                tracing::info!("options menu cancelled, continuing with nothing selected");
                InstallSelection::none()
            }
        };

        let steps = self.with_progress_dialog(interactive, "installing", || {
            self.execute(&version, &selection, interactive)
        })?;

        tracing::info!(version = version.name, ?steps, "installation complete");

        Ok(InstallReport {
            version,
            selection,
            steps,
        })
    }

    fn fetch_manifest(&self) -> Result<VersionManifest, InstallerError> {
        tracing::info!(url = self.config.manifest_url, "fetching manifest");

        let manifest =
            crate::manifest::fetch_manifest(self.fetcher.as_ref(), &self.config.manifest_url)?;

        tracing::debug!(?manifest, "fetched manifest");

        Ok(manifest)
    }

    fn execute(
        &self,
        version: &VersionEntry,
        selection: &InstallSelection,
        interactive: bool,
    ) -> Result<Vec<Step>, InstallerError> {
        tracing::debug!(?version, ?selection, config = ?self.config, "running planner");

        let mut planner = Planner::new(version, selection);

        if let Some(path) = &self.monitor_source {
            planner = planner.with_monitor_source(path.clone());
        }

        let plan = planner.run()?;

        tracing::debug!(?plan, "created plan");

        let tui = self.tui.clone();
        let mut executor = Executor::new(
            &self.config,
            &plan,
            self.fetcher.as_ref(),
            self.service_manager.as_ref(),
        )
        .with_progress_callback(move |current, total| {
            tracing::debug!(current, total, "install progress");

            if interactive && tui.borrow().is_running() {
                let _ = tui.borrow().update_progress(current, total);
            }
        });

        executor.run()
    }

    fn with_progress_dialog<F, T>(
        &self,
        interactive: bool,
        text_id: &str,
        func: F,
    ) -> Result<T, InstallerError>
    where
        F: FnOnce() -> Result<T, InstallerError>,
    {
        if !interactive {
            return func();
        }

        self.tui.borrow().show_progress_dialog(text_id)?;
        let result = func();
        self.tui.borrow().hide_progress_dialog()?;

        result
    }
}

impl std::fmt::Debug for Installer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Installer")
            .field("config", &self.config)
            .field("check_privileges", &self.check_privileges)
            .field("bootstrap", &self.bootstrap)
            .field("monitor_source", &self.monitor_source)
            .finish_non_exhaustive()
    }
}
