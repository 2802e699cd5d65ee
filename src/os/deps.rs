//! Bootstrapping of required external tools.
//!
//! Each required tool is looked up on the search path (PATH). Missing tools
//! are installed with the first package manager found, in the order given
//! by [`PackageManager::PRIORITY`].
use std::process::{Command, ExitStatus};

use crate::error::{AddInstallerContext, InstallerError, InstallerErrorKind};

/// An external tool the installer needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredTool {
    /// Executable name looked up on the search path.
    pub command: String,
    /// Package providing the executable.
    pub package: String,
}

impl RequiredTool {
    /// Creates a new tool requirement.
    pub fn new<C: Into<String>, P: Into<String>>(command: C, package: P) -> Self {
        Self {
            command: command.into(),
            package: package.into(),
        }
    }
}

/// Native package managers supported for bootstrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    /// Debian, Ubuntu.
    Apt,
    /// Fedora, RHEL 8+.
    Dnf,
    /// Older RHEL, CentOS.
    Yum,
    /// Arch Linux.
    Pacman,
    /// openSUSE.
    Zypper,
    /// Alpine Linux.
    Apk,
}

impl PackageManager {
    /// Detection order.
    pub const PRIORITY: [PackageManager; 6] = [
        Self::Apt,
        Self::Dnf,
        Self::Yum,
        Self::Pacman,
        Self::Zypper,
        Self::Apk,
    ];

    /// Executable name of the package manager.
    pub fn command(&self) -> &'static str {
        match self {
            Self::Apt => "apt-get",
            Self::Dnf => "dnf",
            Self::Yum => "yum",
            Self::Pacman => "pacman",
            Self::Zypper => "zypper",
            Self::Apk => "apk",
        }
    }

    /// Non-interactive install arguments for the given package.
    pub fn install_args(&self, package: &str) -> Vec<String> {
        let args: &[&str] = match self {
            Self::Apt => &["install", "-y"],
            Self::Dnf | Self::Yum => &["install", "-y"],
            Self::Pacman => &["-S", "--noconfirm", "--needed"],
            Self::Zypper => &["--non-interactive", "install"],
            Self::Apk => &["add"],
        };

        args.iter()
            .map(|arg| arg.to_string())
            .chain(std::iter::once(package.to_string()))
            .collect()
    }

    /// Returns the first package manager for which `is_present` returns true.
    pub fn detect<F>(is_present: F) -> Option<Self>
    where
        F: Fn(&str) -> bool,
    {
        Self::PRIORITY
            .into_iter()
            .find(|manager| is_present(manager.command()))
    }
}

/// A package manager invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallCommand {
    /// Package manager used.
    pub manager: PackageManager,
    /// Tool being installed.
    pub tool: RequiredTool,
}

impl InstallCommand {
    /// Returns the invocation as it would be typed in a shell.
    pub fn to_command_line(&self) -> String {
        std::iter::once(self.manager.command().to_string())
            .chain(self.manager.install_args(&self.tool.package))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn to_command(&self) -> Command {
        let mut command = Command::new(self.manager.command());
        command.args(self.manager.install_args(&self.tool.package));
        command
    }
}

/// Ensures required tools are present.
pub struct Bootstrapper {
    tools: Vec<RequiredTool>,
    is_present: Box<dyn Fn(&str) -> bool>,
    runner: Box<dyn Fn(&InstallCommand) -> std::io::Result<ExitStatus>>,
}

impl Bootstrapper {
    /// Creates a bootstrapper that looks tools up on the search path.
    pub fn new(tools: &[RequiredTool]) -> Self {
        Self {
            tools: tools.to_vec(),
            is_present: Box::new(|command| which::which(command).is_ok()),
            runner: Box::new(|install| install.to_command().status()),
        }
    }

    /// Replaces the tool lookup function.
    pub fn with_lookup<F>(mut self, is_present: F) -> Self
    where
        F: Fn(&str) -> bool + 'static,
    {
        self.is_present = Box::new(is_present);
        self
    }

    /// Replaces how package manager invocations are executed.
    pub fn with_runner<F>(mut self, runner: F) -> Self
    where
        F: Fn(&InstallCommand) -> std::io::Result<ExitStatus> + 'static,
    {
        self.runner = Box::new(runner);
        self
    }

    /// Returns the package manager invocations needed for the missing tools.
    pub fn plan(&self) -> Result<Vec<InstallCommand>, InstallerError> {
        let missing: Vec<&RequiredTool> = self
            .tools
            .iter()
            .filter(|tool| !(self.is_present)(&tool.command))
            .collect();

        if missing.is_empty() {
            tracing::debug!("all required tools present");
            return Ok(Vec::new());
        }

        let Some(manager) = PackageManager::detect(&self.is_present) else {
            let names: Vec<&str> = missing.iter().map(|tool| tool.command.as_str()).collect();
            tracing::error!(?names, "missing tools and no package manager");

            return Err(InstallerError::new(InstallerErrorKind::MissingPackageManager)
                .with_context(format!("missing {}", names.join(", "))));
        };

        tracing::debug!(?manager, "detected package manager");

        Ok(missing
            .into_iter()
            .map(|tool| InstallCommand {
                manager,
                tool: tool.clone(),
            })
            .collect())
    }

    /// Installs every missing tool.
    pub fn run(&self) -> Result<(), InstallerError> {
        for install in self.plan()? {
            let command_line = install.to_command_line();

            tracing::info!(
                command_line = %command_line,
                package = %install.tool.package,
                "installing required tool"
            );

            let status = (self.runner)(&install)
                .map_err(InstallerError::from)
                .inst_contextc(|| format!("could not run {}", install.manager.command()))?;

            if !status.success() {
                return Err(
                    InstallerError::new(InstallerErrorKind::DependencyInstallFailed)
                        .with_context(format!("{command_line} ({status})")),
                );
            }
        }

        Ok(())
    }
}
