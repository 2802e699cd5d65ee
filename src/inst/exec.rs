use std::path::Path;

use crate::{
    error::{AddContext, AddInstallerContext, InstallerError, InstallerErrorKind},
    net::Fetcher,
    os::service::ServiceManager,
};

use super::{
    plan::{InstallPlan, Step},
    InstallConfig,
};

pub struct Executor<'a> {
    config: &'a InstallConfig,
    plan: InstallPlan,
    fetcher: &'a dyn Fetcher,
    service_manager: &'a dyn ServiceManager,
    progress_callback: Box<dyn FnMut(u64, u64) + 'a>,
}

impl<'a> Executor<'a> {
    pub fn new(
        config: &'a InstallConfig,
        plan: &InstallPlan,
        fetcher: &'a dyn Fetcher,
        service_manager: &'a dyn ServiceManager,
    ) -> Self {
        Self {
            config,
            plan: plan.clone(),
            fetcher,
            service_manager,
            progress_callback: Box::new(|_, _| {}),
        }
    }

    pub fn with_progress_callback<F>(mut self, progress_callback: F) -> Self
    where
        F: FnMut(u64, u64) + 'a,
    {
        self.progress_callback = Box::new(progress_callback);
        self
    }

    /// Runs the planned steps in order and returns the steps completed.
    pub fn run(&mut self) -> Result<Vec<Step>, InstallerError> {
        let total = self.plan.steps.len() as u64;
        let mut completed = Vec::with_capacity(self.plan.steps.len());

        for (index, step) in self.plan.steps.clone().into_iter().enumerate() {
            let span = tracing::info_span!("install step", ?step);
            let _guard = span.enter();

            match step {
                Step::InstallApp => self
                    .install_app()
                    .inst_context("failed to install application")?,
                Step::CreateDesktopEntry => self
                    .create_desktop_entry()
                    .inst_context("failed to create desktop entry")?,
                Step::ApplyPatches => self
                    .apply_patches()
                    .inst_context("failed to patch shell startup files")?,
                Step::InstallMonitor => self
                    .install_monitor()
                    .inst_context("failed to install log monitor")?,
                Step::WriteUninstaller => crate::uninst::script::write(self.config)
                    .inst_context("failed to write uninstaller")?,
            }

            completed.push(step);
            (self.progress_callback)(index as u64 + 1, total);
        }

        Ok(completed)
    }

    fn install_app(&self) -> Result<(), InstallerError> {
        let paths = &self.config.paths;

        tracing::info!(
            version = self.plan.version.name,
            dir = ?paths.install_dir,
            "installing application"
        );

        std::fs::create_dir_all(&paths.install_dir)
            .with_contextc(|_| format!("could not create {:?}", paths.install_dir))?;
        crate::net::download_to_path(self.fetcher, &self.plan.version.url, &paths.app_executable)?;
        crate::os::set_mode(&paths.app_executable, 0o755)?;

        Ok(())
    }

    fn create_desktop_entry(&self) -> Result<(), InstallerError> {
        let paths = &self.config.paths;

        if paths.icon.exists() {
            tracing::info!(path = ?paths.icon, "icon already present");
        } else {
            crate::net::download_to_path(self.fetcher, &self.config.icon_url, &paths.icon)?;
        }

        let applications_dir = paths
            .desktop_entry
            .parent()
            .ok_or_else(|| InstallerError::new(InstallerErrorKind::InvalidInput))?;

        for dir in crate::os::create_dir_all_tracked(applications_dir)? {
            self.config.target_user.take_ownership(&dir)?;
        }

        tracing::info!(path = ?paths.desktop_entry, "writing desktop entry");

        std::fs::write(&paths.desktop_entry, self.desktop_entry_text())
            .with_contextc(|_| format!("could not write {:?}", paths.desktop_entry))?;
        crate::os::set_mode(&paths.desktop_entry, 0o755)?;
        self.config
            .target_user
            .take_ownership(&paths.desktop_entry)?;

        self.refresh_desktop_database(applications_dir);

        Ok(())
    }

    fn desktop_entry_text(&self) -> String {
        let app = &self.config.app;
        let paths = &self.config.paths;

        format!(
            "[Desktop Entry]\n\
             Version=1.0\n\
             Type=Application\n\
             Name={}\n\
             Comment={}\n\
             Exec={}\n\
             Icon={}\n\
             Terminal=false\n\
             Categories={}\n",
            app.display_name,
            app.comment,
            paths.app_executable.display(),
            paths.icon.display(),
            app.categories,
        )
    }

    fn refresh_desktop_database(&self, applications_dir: &Path) {
        if which::which("update-desktop-database").is_err() {
            tracing::debug!("update-desktop-database not available");
            return;
        }

        match std::process::Command::new("update-desktop-database")
            .arg(applications_dir)
            .status()
        {
            Ok(status) if status.success() => {
                let cache = applications_dir.join("mimeinfo.cache");

                if cache.exists() {
                    if let Err(error) = self.config.target_user.take_ownership(&cache) {
                        tracing::warn!(%error, "could not change owner of mimeinfo.cache");
                    }
                }
            }
            Ok(status) => tracing::warn!(%status, "update-desktop-database failed"),
            Err(error) => tracing::warn!(%error, "could not run update-desktop-database"),
        }
    }

    fn apply_patches(&self) -> Result<(), InstallerError> {
        let line = self.config.patch_line();
        let comment = self.config.patch_comment();

        for profile in &self.config.paths.shell_profiles {
            let created = crate::patch::ensure_line_in_file(profile, &line, Some(&comment))?;

            if created {
                self.config.target_user.take_ownership(profile)?;
            }
        }

        Ok(())
    }

    fn install_monitor(&self) -> Result<(), InstallerError> {
        let paths = &self.config.paths;
        let source = self
            .plan
            .monitor_source
            .as_deref()
            .ok_or_else(|| InstallerError::new(InstallerErrorKind::InvalidInput))?;

        std::fs::create_dir_all(&paths.monitor_dir)
            .with_contextc(|_| format!("could not create {:?}", paths.monitor_dir))?;

        tracing::info!(?source, destination = ?paths.monitor_executable, "copying log monitor");

        std::fs::copy(source, &paths.monitor_executable)
            .with_contextc(|_| format!("could not copy {source:?}"))?;
        crate::os::set_mode(&paths.monitor_executable, 0o755)?;

        if let Some(parent) = paths.monitor_unit.parent() {
            std::fs::create_dir_all(parent)?;
        }

        tracing::info!(path = ?paths.monitor_unit, "writing unit file");

        std::fs::write(&paths.monitor_unit, self.monitor_unit_text()?)
            .with_contextc(|_| format!("could not write {:?}", paths.monitor_unit))?;

        let unit_name = paths.monitor_unit_name();
        self.service_manager.reload()?;
        self.service_manager.enable_now(&unit_name)?;

        Ok(())
    }

    fn monitor_unit_text(&self) -> Result<String, InstallerError> {
        let paths = &self.config.paths;
        let executable = paths.monitor_executable.to_string_lossy();
        let log_dir = paths.log_dir.to_string_lossy();

        for value in [&executable, &log_dir] {
            crate::os::unix::verify_safe_for_shell_script(value)?;
        }

        Ok(format!(
            "[Unit]\n\
             Description={name} log monitor\n\
             After=local-fs.target\n\
             \n\
             [Service]\n\
             Type=simple\n\
             ExecStart=\"{executable}\" monitor \
             --log-dir \"{log_dir}\" --interval-secs {interval}\n\
             Restart=always\n\
             RestartSec=5\n\
             User=root\n\
             \n\
             [Install]\n\
             WantedBy=multi-user.target\n",
            name = self.config.app.display_name,
            interval = self.config.monitor_interval.as_secs(),
        ))
    }
}
