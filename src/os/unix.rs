// Notes for app menus:
// https://specifications.freedesktop.org/desktop-entry-spec/latest/index.html
//
// Notes on filesystem directories:
// https://specifications.freedesktop.org/basedir-spec/latest/index.html
// https://en.wikipedia.org/wiki/Filesystem_Hierarchy_Standard

use std::ffi::{CStr, CString, OsStr};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use super::OsError;
use crate::error::{AddInstallerContext, InstallerError};

pub fn effective_uid() -> u32 {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { libc::geteuid() }
}

pub fn set_posix_permission(target: &Path, mode: u32) -> std::io::Result<()> {
    let mut perm = target.metadata()?.permissions();
    perm.set_mode(mode);
    std::fs::set_permissions(target, perm)?;
    Ok(())
}

pub fn get_home() -> Result<PathBuf, InstallerError> {
    let home = super::env_var("HOME").inst_context("HOME")?;
    Ok(PathBuf::from(home))
}

/// The account whose home directory receives the per-user files.
///
/// When the installer is started through `sudo`, this is the invoking user
/// rather than root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetUser {
    /// Login name.
    pub name: String,
    /// Home directory.
    pub home: PathBuf,
    /// Numeric user and group ID to hand created files over to.
    ///
    /// `None` when files are created by the user themselves.
    pub owner: Option<(u32, u32)>,
}

impl TargetUser {
    /// Creates a target user that owns nothing explicitly.
    pub fn new<N: Into<String>, P: Into<PathBuf>>(name: N, home: P) -> Self {
        Self {
            name: name.into(),
            home: home.into(),
            owner: None,
        }
    }

    /// Determines the target user from `SUDO_USER` or falls back to `HOME`.
    pub fn resolve() -> Result<Self, InstallerError> {
        if let Ok(sudo_user) = std::env::var("SUDO_USER") {
            if !sudo_user.is_empty() && sudo_user != "root" {
                if let Some((home, uid, gid)) = lookup_passwd(&sudo_user) {
                    tracing::debug!(user = sudo_user, ?home, "resolved sudo user");

                    return Ok(Self {
                        name: sudo_user,
                        home,
                        owner: Some((uid, gid)),
                    });
                }

                tracing::warn!(user = sudo_user, "SUDO_USER not found in password database");
            }
        }

        let name = std::env::var("USER").unwrap_or_else(|_| whoami::username());

        Ok(Self::new(name, get_home()?))
    }

    /// Hands the given path over to the user when it was created on their behalf.
    pub fn take_ownership(&self, path: &Path) -> std::io::Result<()> {
        if let Some((uid, gid)) = self.owner {
            tracing::debug!(?path, uid, gid, "changing owner");
            std::os::unix::fs::chown(path, Some(uid), Some(gid))?;
        }

        Ok(())
    }
}

fn lookup_passwd(name: &str) -> Option<(PathBuf, u32, u32)> {
    let c_name = CString::new(name).ok()?;

    // SAFETY: getpwnam returns either null or a pointer to static storage
    // that stays valid until the next passwd call; every field is copied out
    // before returning.
    unsafe {
        let entry = libc::getpwnam(c_name.as_ptr());

        if entry.is_null() || (*entry).pw_dir.is_null() {
            return None;
        }

        let home = CStr::from_ptr((*entry).pw_dir);
        let home = PathBuf::from(OsStr::from_bytes(home.to_bytes()));

        Some((home, (*entry).pw_uid, (*entry).pw_gid))
    }
}

/// Checks that a path can be placed inside a double-quoted shell string.
pub fn verify_safe_for_shell_script(path_str: &str) -> Result<(), OsError> {
    if path_str
        .chars()
        .any(|c| c.is_control() || matches!(c, '"' | '$' | '`' | '\\'))
    {
        return Err(OsError::Other("invalid path character"));
    }

    Ok(())
}
