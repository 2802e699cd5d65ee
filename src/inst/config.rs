use std::path::Path;
use std::time::Duration;

use crate::{
    error::InstallerError,
    os::{deps::RequiredTool, TargetUser},
    path::InstallPaths,
};

/// Default location of the version manifest.
pub const DEFAULT_MANIFEST_URL: &str = "https://downloads.lumen-desktop.org/linux/versions.json";

/// Default location of the launcher icon.
pub const DEFAULT_ICON_URL: &str = "https://downloads.lumen-desktop.org/linux/icon.png";

/// Environment variable exported by the shell startup patch.
pub const PATCH_ENV_VAR: &str = "WEBKIT_DISABLE_DMABUF_RENDERER";

/// Identity of the application being installed.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct AppMetadata {
    /// Plain lowercase ID used for file and unit names.
    pub id: String,
    /// Name displayed to the user.
    pub display_name: String,
    /// One line description for the desktop entry.
    pub comment: String,
    /// Desktop entry categories, each terminated by `;`.
    pub categories: String,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            id: "lumen".to_string(),
            display_name: "Lumen".to_string(),
            comment: "Lumen desktop client".to_string(),
            categories: "Utility;Development;".to_string(),
        }
    }
}

/// Every fixed path and constant used during an install or uninstall.
///
/// Built once at startup and handed to each component.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct InstallConfig {
    /// Application identity.
    pub app: AppMetadata,
    /// Resolved file locations.
    pub paths: InstallPaths,
    /// Account owning the patched home directory files.
    pub target_user: TargetUser,
    /// Where the version manifest is fetched from.
    pub manifest_url: String,
    /// Where the launcher icon is fetched from.
    pub icon_url: String,
    /// Maximum time to establish a connection.
    pub connect_timeout: Duration,
    /// Maximum time a single read may stall.
    pub read_timeout: Duration,
    /// Tools ensured by the bootstrapper.
    pub required_tools: Vec<RequiredTool>,
    /// Poll interval of the installed log monitor.
    pub monitor_interval: Duration,
}

impl InstallConfig {
    /// Create a config for the user who invoked the installer (through `sudo`
    /// if applicable) with system paths under `/`.
    pub fn new() -> Result<Self, InstallerError> {
        let target_user = TargetUser::resolve()?;

        Ok(Self::with_roots(Path::new("/"), target_user))
    }

    /// Create a config with the system paths placed under `root`.
    pub fn with_roots(root: &Path, target_user: TargetUser) -> Self {
        let app = AppMetadata::default();
        let paths = InstallPaths::new(&app.id, root, &target_user.home);

        Self {
            app,
            paths,
            target_user,
            manifest_url: DEFAULT_MANIFEST_URL.to_string(),
            icon_url: DEFAULT_ICON_URL.to_string(),
            connect_timeout: Duration::from_secs(15),
            read_timeout: Duration::from_secs(60),
            required_tools: vec![
                RequiredTool::new("sed", "sed"),
                RequiredTool::new("update-desktop-database", "desktop-file-utils"),
            ],
            monitor_interval: crate::monitor::DEFAULT_INTERVAL,
        }
    }

    /// The line appended to each shell startup file.
    pub fn patch_line(&self) -> String {
        format!("export {PATCH_ENV_VAR}=1")
    }

    /// The comment placed above [`Self::patch_line()`] when first added.
    pub fn patch_comment(&self) -> String {
        format!(
            "# {}: {PATCH_ENV_VAR} workaround",
            self.app.display_name
        )
    }

    /// Substring identifying every line added by the patch.
    pub fn patch_pattern(&self) -> &'static str {
        PATCH_ENV_VAR
    }
}
