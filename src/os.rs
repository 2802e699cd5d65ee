//! OS specific functionalities.

pub use std::env::current_exe;
use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
};

use crate::error::{InstallerError, InstallerErrorKind};

pub mod deps;
pub mod service;
pub(crate) mod unix;

pub use self::unix::TargetUser;

/// OS specific error wrapper.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum OsError {
    /// Standard IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Any other error.
    #[error("{0}")]
    Other(&'static str),
}

impl From<OsError> for InstallerError {
    fn from(value: OsError) -> Self {
        InstallerError::new(InstallerErrorKind::Io).with_source(value)
    }
}

/// Returns whether the process runs with an effective user ID of root.
pub fn is_elevated() -> bool {
    unix::effective_uid() == 0
}

/// Returns an error of kind [`InstallerErrorKind::NotElevated`] unless the
/// process runs as root.
pub fn require_elevated() -> Result<(), InstallerError> {
    if is_elevated() {
        Ok(())
    } else {
        Err(InstallerErrorKind::NotElevated.into())
    }
}

/// Sets the POSIX permission bits of a file.
pub fn set_mode(target: &Path, mode: u32) -> std::io::Result<()> {
    tracing::debug!(mode, ?target, "set POSIX permissions");
    unix::set_posix_permission(target, mode)
}

/// Creates a directory and its parents, returning the directories that did
/// not exist beforehand (outermost first).
pub fn create_dir_all_tracked(path: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut missing = Vec::new();
    let mut current = Some(path);

    while let Some(dir) = current {
        if dir.as_os_str().is_empty() || dir.exists() {
            break;
        }
        missing.push(dir.to_path_buf());
        current = dir.parent();
    }

    missing.reverse();

    if !missing.is_empty() {
        tracing::debug!(dir = ?path, "creating directories");
        std::fs::create_dir_all(path)?;
    }

    Ok(missing)
}

pub(crate) fn env_var<A: AsRef<OsStr>>(key: A) -> Result<OsString, InstallerError> {
    tracing::trace!(key = ?key.as_ref(), "env_var");
    std::env::var_os(key.as_ref())
        .ok_or_else(|| InstallerErrorKind::InvalidEnvironmentVariable.into())
}
