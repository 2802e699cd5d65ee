//! Command line entry point for the Lumen installer.
use std::{fs::File, path::PathBuf, time::Duration};

use clap::{Parser, Subcommand};
use deskcrate::{
    inst::{InstallConfig, InstallReport, Installer},
    prompt::PresetPrompt,
    select::InstallOption,
};
use tracing_subscriber::EnvFilter;

/// Entry point
pub fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let command = args.command.unwrap_or_default();

    init_logging(&command)?;

    // Log any error before it is printed so the log file has the full chain
    let result = main2(command);

    if let Err(error) = &result {
        tracing::error!(?error, "main error");
    }

    result
}

fn main2(command: Command) -> anyhow::Result<()> {
    if !matches!(command, Command::Monitor { .. }) {
        deskcrate::os::require_elevated()?;
    }

    match command {
        Command::Install(install_args) => {
            let config = install_args.to_config()?;
            let mut installer = Installer::new(&config);

            let report = if install_args.unattended {
                installer.run(&install_args.to_prompt())?
            } else {
                installer.run_interactive()?
            };

            print_report(&config, &report);
        }
        Command::Uninstall => {
            let config = InstallConfig::new()?;
            deskcrate::uninstall(&config)?;

            println!("{} was uninstalled.", config.app.display_name);
        }
        Command::Monitor {
            log_dir,
            interval_secs,
        } => {
            deskcrate::monitor::run(&log_dir, Duration::from_secs(interval_secs));
        }
    }

    Ok(())
}

fn print_report(config: &InstallConfig, report: &InstallReport) {
    println!(
        "{} {} installation complete.",
        config.app.display_name, report.version.name
    );
    println!(
        "To uninstall, run: sudo {}",
        config.paths.uninstaller.display()
    );
}

/// Initialize logging for debugging
///
/// The TUI owns the terminal during installs so those log to a file. The
/// monitor runs under the service manager and logs to stderr.
fn init_logging(command: &Command) -> anyhow::Result<()> {
    if let Command::Monitor { .. } = command {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("deskcrate=info"));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();

        return Ok(());
    }

    let log_filename = format!("deskcrate_{}.log", whoami::username());
    let log_file = File::options()
        .create(true)
        .append(true)
        .open(tempfile::env::temp_dir().join(log_filename))?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("deskcrate=debug"));

    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_env_filter(filter)
        .with_writer(log_file)
        .init();

    Ok(())
}

// Clap arguments:
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Install the application (default)
    Install(InstallArgs),
    /// Remove everything the installer could have created
    Uninstall,
    /// Run the log monitor service in the foreground
    Monitor {
        /// Directory scanned for log files
        #[arg(long)]
        log_dir: PathBuf,
        /// Seconds between scans
        #[arg(long, default_value_t = 5)]
        interval_secs: u64,
    },
}

impl Default for Command {
    fn default() -> Self {
        Self::Install(InstallArgs::default())
    }
}

#[derive(Debug, Default, clap::Args)]
struct InstallArgs {
    /// Location of the release list
    #[arg(long, env = "DESKCRATE_MANIFEST_URL")]
    manifest_url: Option<String>,
    /// Seconds allowed to establish a connection
    #[arg(long)]
    connect_timeout: Option<u64>,
    /// Seconds a download may stall
    #[arg(long)]
    read_timeout: Option<u64>,
    /// Install without prompting the user
    #[arg(long)]
    unattended: bool,
    /// Release to install when unattended (default is the first listed)
    #[arg(long, requires = "unattended")]
    release: Option<String>,
    /// Skip installing the application when unattended
    #[arg(long, requires = "unattended")]
    no_app: bool,
    /// Skip patching shell startup files when unattended
    #[arg(long, requires = "unattended")]
    no_patches: bool,
    /// Install the log monitor service when unattended
    #[arg(long, requires = "unattended")]
    monitor: bool,
}

impl InstallArgs {
    fn to_config(&self) -> anyhow::Result<InstallConfig> {
        let mut config = InstallConfig::new()?;

        if let Some(url) = &self.manifest_url {
            config.manifest_url = url.clone();
        }
        if let Some(secs) = self.connect_timeout {
            config.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.read_timeout {
            config.read_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    fn to_prompt(&self) -> PresetPrompt {
        let mut prompt = PresetPrompt::new()
            .with_override(InstallOption::InstallApp.label(), !self.no_app)
            .with_override(InstallOption::ApplyPatches.label(), !self.no_patches)
            .with_override(InstallOption::InstallMonitor.label(), self.monitor);

        if let Some(release) = &self.release {
            prompt = prompt.with_item(release);
        }

        prompt
    }
}
