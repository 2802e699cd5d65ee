//! Describing where files are located.
//!
//! All locations are derived from two roots: the system root (normally `/`)
//! and the target user's home directory.
//!
//! ## Default file locations
//!
//! * Application: `/opt/[app-id]/`
//! * Desktop entry: `$HOME/.local/share/applications/[app-id].desktop`
//! * Shell startup files: `$HOME/.bashrc`, `$HOME/.zshrc`
//! * Log monitor: `/opt/[app-id]-log-monitor/`
//! * Log monitor service unit: `/etc/systemd/system/[app-id]-log-monitor.service`
//! * Monitored logs: `$HOME/.local/share/[app-id]/logs/`
//! * Uninstaller: `/usr/local/bin/[app-id]-uninstall`
//!
use std::path::{Path, PathBuf};

/// Shell startup files patched for the target user, relative to the home.
pub const SHELL_STARTUP_FILES: [&str; 2] = [".bashrc", ".zshrc"];

/// Resolved filesystem locations for one run.
#[derive(Debug, Clone, Default)]
pub struct InstallPaths {
    /// Directory the application is installed into.
    pub install_dir: PathBuf,
    /// Application executable inside `install_dir`.
    pub app_executable: PathBuf,
    /// Launcher icon inside `install_dir`.
    pub icon: PathBuf,
    /// Desktop launcher descriptor.
    pub desktop_entry: PathBuf,
    /// Shell startup files receiving the environment patch.
    pub shell_profiles: Vec<PathBuf>,
    /// Directory holding the log monitor binary.
    pub monitor_dir: PathBuf,
    /// Log monitor executable inside `monitor_dir`.
    pub monitor_executable: PathBuf,
    /// systemd unit file of the log monitor.
    pub monitor_unit: PathBuf,
    /// Directory scanned by the log monitor.
    pub log_dir: PathBuf,
    /// Generated uninstaller script.
    pub uninstaller: PathBuf,
}

impl InstallPaths {
    /// Resolves the locations for an application ID.
    ///
    /// `app_id` is a plain lowercase identifier such as `lumen`.
    pub fn new(app_id: &str, root: &Path, home: &Path) -> Self {
        let install_dir = root.join("opt").join(app_id);
        let monitor_dir = root.join("opt").join(format!("{app_id}-log-monitor"));

        Self {
            app_executable: install_dir.join(app_id),
            icon: install_dir.join("icon.png"),
            install_dir,
            desktop_entry: home
                .join(".local/share/applications")
                .join(format!("{app_id}.desktop")),
            shell_profiles: SHELL_STARTUP_FILES
                .iter()
                .map(|name| home.join(name))
                .collect(),
            monitor_executable: monitor_dir.join(format!("{app_id}-log-monitor")),
            monitor_dir,
            monitor_unit: root
                .join("etc/systemd/system")
                .join(format!("{app_id}-log-monitor.service")),
            log_dir: home.join(".local/share").join(app_id).join("logs"),
            uninstaller: root
                .join("usr/local/bin")
                .join(format!("{app_id}-uninstall")),
        }
    }

    /// Returns the systemd unit name of the log monitor.
    pub fn monitor_unit_name(&self) -> String {
        self.monitor_unit
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_root() {
        let paths = InstallPaths::new("my_app", Path::new("/"), Path::new("/home/rust"));

        assert_eq!(paths.install_dir, Path::new("/opt/my_app"));
        assert_eq!(paths.app_executable, Path::new("/opt/my_app/my_app"));
        assert_eq!(paths.icon, Path::new("/opt/my_app/icon.png"));
        assert_eq!(
            paths.desktop_entry,
            Path::new("/home/rust/.local/share/applications/my_app.desktop")
        );
        assert_eq!(
            paths.shell_profiles,
            vec![
                PathBuf::from("/home/rust/.bashrc"),
                PathBuf::from("/home/rust/.zshrc")
            ]
        );
        assert_eq!(
            paths.monitor_unit,
            Path::new("/etc/systemd/system/my_app-log-monitor.service")
        );
        assert_eq!(paths.monitor_unit_name(), "my_app-log-monitor.service");
        assert_eq!(
            paths.monitor_executable,
            Path::new("/opt/my_app-log-monitor/my_app-log-monitor")
        );
        assert_eq!(
            paths.log_dir,
            Path::new("/home/rust/.local/share/my_app/logs")
        );
        assert_eq!(paths.uninstaller, Path::new("/usr/local/bin/my_app-uninstall"));
    }

    #[test]
    fn test_custom_root() {
        let paths = InstallPaths::new("my_app", Path::new("/tmp/root"), Path::new("/tmp/home"));

        assert_eq!(paths.install_dir, Path::new("/tmp/root/opt/my_app"));
        assert_eq!(
            paths.uninstaller,
            Path::new("/tmp/root/usr/local/bin/my_app-uninstall")
        );
        assert_eq!(paths.shell_profiles[1], Path::new("/tmp/home/.zshrc"));
    }
}
