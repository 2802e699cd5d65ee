//! Generated uninstaller script.
//!
//! The script is plain POSIX `sh` and only needs `rm`, `grep`, `sed` and,
//! when present, `systemctl`.
use std::path::Path;

use crate::{
    error::{AddContext, InstallerError, InstallerErrorKind},
    inst::InstallConfig,
};

fn quoted(path: &Path) -> Result<String, InstallerError> {
    let text = path.to_string_lossy();

    crate::os::unix::verify_safe_for_shell_script(&text).map_err(|error| {
        InstallerError::new(InstallerErrorKind::InvalidData)
            .with_source(error)
            .with_context(format!("cannot embed {path:?} in uninstaller"))
    })?;

    Ok(format!("\"{text}\""))
}

/// Renders the uninstaller shell script.
///
/// Each removal is guarded by an existence or activity check, so running the
/// script again after it succeeded does nothing and exits 0.
pub fn render(config: &InstallConfig) -> Result<String, InstallerError> {
    let paths = &config.paths;
    let unit_name = paths.monitor_unit_name();
    let pattern = config.patch_pattern();

    if !pattern.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(InstallerError::new(InstallerErrorKind::InvalidData)
            .with_context("patch pattern not usable in sed expression"));
    }

    let install_dir = quoted(&paths.install_dir)?;
    let desktop_entry = quoted(&paths.desktop_entry)?;
    let monitor_unit = quoted(&paths.monitor_unit)?;
    let monitor_dir = quoted(&paths.monitor_dir)?;
    let profiles = paths
        .shell_profiles
        .iter()
        .map(|path| quoted(path))
        .collect::<Result<Vec<_>, _>>()?
        .join(" ");

    let script = format!(
        r#"#!/bin/sh
# Uninstaller for {name}, generated by deskcrate {version}.
set -e

if [ -d {install_dir} ]; then
    rm -rf {install_dir}
    echo "Removed {install_dir_text}"
fi

if [ -f {desktop_entry} ]; then
    rm -f {desktop_entry}
    echo "Removed {desktop_entry_text}"
fi

for profile in {profiles}; do
    if [ -f "$profile" ] && grep -q '{pattern}' "$profile"; then
        sed -i '/{pattern}/d' "$profile"
        echo "Cleaned $profile"
    fi
done

if command -v systemctl >/dev/null 2>&1 && systemctl is-active --quiet {unit_name}; then
    systemctl stop {unit_name}
    systemctl disable {unit_name}
fi

if [ -f {monitor_unit} ] || [ -d {monitor_dir} ]; then
    rm -f {monitor_unit}
    rm -rf {monitor_dir}
    if command -v systemctl >/dev/null 2>&1; then
        systemctl daemon-reload
    fi
    echo "Removed {unit_name}"
fi

echo "{name} has been uninstalled."
"#,
        name = config.app.display_name,
        version = env!("CARGO_PKG_VERSION"),
        install_dir_text = paths.install_dir.display(),
        desktop_entry_text = paths.desktop_entry.display(),
    );

    Ok(script)
}

/// Writes the uninstaller script to its configured path and marks it executable.
pub fn write(config: &InstallConfig) -> Result<(), InstallerError> {
    let path = &config.paths.uninstaller;
    let script = render(config)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_contextc(|_| format!("could not create {parent:?}"))?;
    }

    tracing::info!(?path, "writing uninstaller");

    std::fs::write(path, script).with_contextc(|_| format!("could not write {path:?}"))?;
    crate::os::set_mode(path, 0o755)?;

    Ok(())
}
