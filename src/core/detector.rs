//! Environment detection.
//!
//! Before scanning, the gate makes sure the toolchain the project's tests need
//! is installed and new enough. An unsupported environment is not an error:
//! the whole run degrades to a skip.

use crate::config::EnvironmentConfig;
use crate::core::executor::{CommandRunner, Executor};
use regex::Regex;
use std::path::Path;

/// A `major.minor.patch` version; missing components are zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Version {
    /// Major component.
    pub major: u64,
    /// Minor component.
    pub minor: u64,
    /// Patch component.
    pub patch: u64,
}

impl Version {
    /// Creates a version.
    #[must_use]
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Finds the first `N.N[.N]` sequence in `text`.
    #[must_use]
    pub fn find(text: &str) -> Option<Self> {
        let pattern = Regex::new(r"(\d+)\.(\d+)(?:\.(\d+))?").ok()?;
        let caps = pattern.captures(text)?;
        let part = |i: usize| {
            caps.get(i)
                .map_or(Some(0), |m| m.as_str().parse::<u64>().ok())
        };
        Some(Self::new(part(1)?, part(2)?, part(3)?))
    }
}

impl std::str::FromStr for Version {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut parts = s.trim().split('.');
        let mut next = |name: &str, required: bool| -> std::result::Result<u64, String> {
            match parts.next() {
                Some(p) => p
                    .parse()
                    .map_err(|_| format!("Invalid {name} version component in '{s}'")),
                None if required => Err(format!("Missing {name} version component in '{s}'")),
                None => Ok(0),
            }
        };
        let version = Self::new(next("major", true)?, next("minor", false)?, next("patch", false)?);
        if parts.next().is_some() {
            return Err(format!("Too many version components in '{s}'"));
        }
        Ok(version)
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Why the environment cannot run the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unsupported {
    /// The tool is not on PATH.
    ToolMissing(String),
    /// The tool ran but printed no recognisable version.
    VersionUnknown(String),
    /// The tool is older than required.
    TooOld {
        /// Tool name.
        tool: String,
        /// Installed version.
        found: Version,
        /// Minimum required version.
        required: Version,
    },
}

impl std::fmt::Display for Unsupported {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ToolMissing(tool) => write!(f, "{tool} not found"),
            Self::VersionUnknown(tool) => write!(f, "Could not determine {tool} version"),
            Self::TooOld {
                tool,
                found,
                required,
            } => write!(f, "Insufficient {tool} version {found} (need {required})"),
        }
    }
}

/// Result of environment detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Check disabled in configuration.
    Unchecked,
    /// Tool present and new enough.
    Supported {
        /// Detected version.
        version: Version,
    },
    /// The gate should be skipped.
    Unsupported(Unsupported),
}

impl Environment {
    /// Returns true unless the environment is unsupported.
    #[must_use]
    pub const fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }
}

/// Detector for the project's toolchain.
#[derive(Debug)]
pub struct Detector<'a> {
    config: &'a EnvironmentConfig,
}

impl<'a> Detector<'a> {
    /// Creates a new detector with the given configuration.
    #[must_use]
    pub const fn new(config: &'a EnvironmentConfig) -> Self {
        Self { config }
    }

    /// Asks the configured tool for its version through `runner`.
    pub fn detect(&self, runner: &dyn CommandRunner, cwd: &Path) -> Environment {
        if !self.config.check {
            return Environment::Unchecked;
        }

        let tool = &self.config.tool;
        if !Executor::command_exists(tool) {
            tracing::warn!(tool = %tool, "tool not found on PATH");
            return Environment::Unsupported(Unsupported::ToolMissing(tool.clone()));
        }

        let version_command = format!("{tool} {}", self.config.version_arg);
        let output = match runner.run(&version_command, cwd) {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(error = %e, command = %version_command, "version check failed");
                return Environment::Unsupported(Unsupported::VersionUnknown(tool.clone()));
            },
        };

        self.evaluate(&output.output.join("\n"))
    }

    /// Decides support from the output of the version command.
    #[must_use]
    pub fn evaluate(&self, version_output: &str) -> Environment {
        let tool = &self.config.tool;
        let Some(found) = Version::find(version_output) else {
            return Environment::Unsupported(Unsupported::VersionUnknown(tool.clone()));
        };

        let required = self.config.min_version.parse::<Version>().unwrap_or_default();
        tracing::debug!(tool = %tool, %found, %required, "detected tool version");

        if found < required {
            Environment::Unsupported(Unsupported::TooOld {
                tool: tool.clone(),
                found,
                required,
            })
        } else {
            Environment::Supported { version: found }
        }
    }
}
