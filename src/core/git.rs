//! Git repository lookup and pre-commit hook management.
//!
//! The gate itself never talks to git; this module only finds the hooks
//! directory so `pcg install` can wire the gate into commits.

use crate::core::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Name of the hook we manage.
pub const HOOK_NAME: &str = "pre-commit";

/// Marker line identifying a hook written by us.
pub const HOOK_MARKER: &str = "# precommit-gate hook";

/// Hook script template.
pub const HOOK_SCRIPT: &str = r#"#!/bin/sh
# precommit-gate hook - installed by `pcg install`

# Skip if PCG_SKIP is set
if [ "$PCG_SKIP" = "1" ]; then
    exit 0
fi

exec pcg run
"#;

/// Result of [`GitRepo::install_hook`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookInstall {
    /// Our hook was already in place.
    AlreadyInstalled(PathBuf),
    /// The hook was written; a foreign hook was moved to `backup`.
    Installed {
        /// Path of the new hook.
        path: PathBuf,
        /// Where the previous hook went, if there was one.
        backup: Option<PathBuf>,
    },
}

/// Result of [`GitRepo::uninstall_hook`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookRemoval {
    /// Nothing at the hook path.
    NotInstalled(PathBuf),
    /// A hook exists but we did not write it.
    Foreign(PathBuf),
    /// Our hook was removed.
    Removed {
        /// Path of the removed hook.
        path: PathBuf,
        /// A backup left over from `install --force`.
        backup: Option<PathBuf>,
    },
}

/// Represents a Git repository.
#[derive(Debug, Clone)]
pub struct GitRepo {
    /// Root directory of the repository (where .git is).
    root: PathBuf,
    /// Path to the .git directory (or file for worktrees).
    git_dir: PathBuf,
}

impl GitRepo {
    /// Discovers the Git repository from the current directory.
    pub fn discover() -> Result<Self> {
        Self::discover_from(&std::env::current_dir().map_err(|e| Error::io("get current dir", e))?)
    }

    /// Discovers the Git repository from a specific path.
    pub fn discover_from(path: &Path) -> Result<Self> {
        let output = git(&["rev-parse", "--show-toplevel", "--git-dir"], path)?;
        if !output.status.success() {
            return Err(Error::NotGitRepo);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut lines = stdout.lines();

        let root = lines.next().map(PathBuf::from).ok_or(Error::NotGitRepo)?;
        let git_dir = lines
            .next()
            .map(|s| absolute_under(&root, s))
            .ok_or(Error::NotGitRepo)?;

        tracing::debug!(root = %root.display(), git_dir = %git_dir.display(), "found repository");
        Ok(Self { root, git_dir })
    }

    /// Returns the root directory of the repository.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .git directory path.
    #[must_use]
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    /// Returns the hooks directory, honouring `core.hooksPath`.
    #[must_use]
    pub fn hooks_dir(&self) -> PathBuf {
        let configured = git(&["config", "--get", "core.hooksPath"], &self.root)
            .ok()
            .filter(|output| output.status.success())
            .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
            .filter(|path| !path.is_empty());

        match configured {
            Some(path) => absolute_under(&self.root, &path),
            None => self.git_dir.join("hooks"),
        }
    }

    /// Returns the path to a specific hook.
    #[must_use]
    pub fn hook_path(&self, hook_name: &str) -> PathBuf {
        self.hooks_dir().join(hook_name)
    }

    /// Writes the pre-commit hook.
    ///
    /// A hook we did not write is left alone unless `force` is set, in which
    /// case it is renamed to `pre-commit.bak` first.
    pub fn install_hook(&self, force: bool) -> Result<HookInstall> {
        let hooks_dir = self.hooks_dir();
        let hook_path = hooks_dir.join(HOOK_NAME);

        std::fs::create_dir_all(&hooks_dir).map_err(|e| Error::io("create hooks dir", e))?;

        let mut backup = None;
        if hook_path.exists() {
            if is_our_hook(&hook_path)? {
                return Ok(HookInstall::AlreadyInstalled(hook_path));
            }
            if !force {
                return Err(Error::HookExists { path: hook_path });
            }

            let backup_path = backup_path(&hooks_dir);
            std::fs::rename(&hook_path, &backup_path).map_err(|e| Error::io("backup hook", e))?;
            tracing::info!(backup = %backup_path.display(), "backed up existing hook");
            backup = Some(backup_path);
        }

        std::fs::write(&hook_path, HOOK_SCRIPT).map_err(|e| Error::io("write hook", e))?;
        make_executable(&hook_path)?;

        Ok(HookInstall::Installed {
            path: hook_path,
            backup,
        })
    }

    /// Removes the pre-commit hook if we wrote it.
    pub fn uninstall_hook(&self) -> Result<HookRemoval> {
        let hooks_dir = self.hooks_dir();
        let hook_path = hooks_dir.join(HOOK_NAME);

        if !hook_path.exists() {
            return Ok(HookRemoval::NotInstalled(hook_path));
        }
        if !is_our_hook(&hook_path)? {
            return Ok(HookRemoval::Foreign(hook_path));
        }

        std::fs::remove_file(&hook_path).map_err(|e| Error::io("remove hook", e))?;

        let backup = Some(backup_path(&hooks_dir)).filter(|p| p.exists());
        Ok(HookRemoval::Removed {
            path: hook_path,
            backup,
        })
    }
}

fn git(args: &[&str], cwd: &Path) -> Result<std::process::Output> {
    Command::new("git")
        .args(args)
        .current_dir(cwd)
        .output()
        .map_err(|source| Error::Spawn {
            command: format!("git {}", args.join(" ")),
            source,
        })
}

fn absolute_under(root: &Path, path: &str) -> PathBuf {
    let path = PathBuf::from(path);
    if path.is_absolute() {
        path
    } else {
        root.join(path)
    }
}

fn backup_path(hooks_dir: &Path) -> PathBuf {
    hooks_dir.join(format!("{HOOK_NAME}.bak"))
}

fn is_our_hook(path: &Path) -> Result<bool> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::io("read existing hook", e))?;
    Ok(content.contains(HOOK_MARKER))
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = std::fs::metadata(path)
        .map_err(|e| Error::io("get hook metadata", e))?
        .permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms).map_err(|e| Error::io("set hook perms", e))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
