//! Configuration handling for precommit-gate.
//!
//! Configuration lives in `precommit-gate.toml`, found by walking up from the
//! working directory. Every section has defaults matching a PHP project, so a
//! missing file is not an error.

use crate::checks::builtin;
use crate::core::detector::Version;
use crate::core::error::{Error, Result};
use crate::core::rules::Rule;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "precommit-gate.toml";

/// Placeholder in the test command replaced by the test configuration path.
pub const CONFIG_PLACEHOLDER: &str = "{config}";

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which files are scanned.
    pub project: ProjectConfig,
    /// The test gate.
    pub tests: TestsConfig,
    /// Toolchain precondition.
    pub environment: EnvironmentConfig,
    /// What blocks a commit.
    pub policy: PolicyConfig,
    /// Marker rules, checked in order.
    pub rules: Vec<Rule>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project: ProjectConfig::default(),
            tests: TestsConfig::default(),
            environment: EnvironmentConfig::default(),
            policy: PolicyConfig::default(),
            rules: builtin::php_rules(),
        }
    }
}

impl Config {
    /// Loads configuration from the default location.
    pub fn load() -> Result<Self> {
        let path = Self::find_config_file()?;
        Self::load_from(&path)
    }

    /// Loads configuration or returns defaults if not found.
    pub fn load_or_default() -> Result<Self> {
        match Self::find_config_file() {
            Ok(path) => Self::load_from(&path),
            Err(Error::ConfigNotFound { .. }) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::ConfigNotFound {
                path: path.to_path_buf(),
            },
            _ => Error::io("read config", e),
        })?;

        let config = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parses and validates configuration text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::config_parse_with_source("Failed to parse TOML", e))?;

        config.validate()?;

        Ok(config)
    }

    /// Finds the configuration file by searching up the directory tree.
    pub fn find_config_file() -> Result<PathBuf> {
        let cwd = std::env::current_dir().map_err(|e| Error::io("get current dir", e))?;
        Self::find_config_file_from(&cwd)
    }

    /// Finds the configuration file by searching up from `start`.
    pub fn find_config_file_from(start: &Path) -> Result<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| Error::ConfigNotFound {
                path: start.join(CONFIG_FILE_NAME),
            })
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        for (i, rule) in self.rules.iter().enumerate() {
            if rule.label.trim().is_empty() {
                return Err(Error::config_invalid(
                    format!("rules[{i}].label"),
                    "must not be empty",
                ));
            }
            if rule.patterns.is_empty() {
                return Err(Error::config_invalid(
                    format!("rules[{i}].patterns"),
                    format!("rule '{}' has no patterns", rule.label),
                ));
            }
            // An empty pattern would match every file.
            if rule.patterns.iter().any(String::is_empty) {
                return Err(Error::config_invalid(
                    format!("rules[{i}].patterns"),
                    format!("rule '{}' has an empty pattern", rule.label),
                ));
            }
        }

        if self.tests.command.trim().is_empty() {
            return Err(Error::config_invalid("tests.command", "must not be empty"));
        }

        if let Some(ref timeout) = self.tests.timeout {
            if humantime::parse_duration(timeout).is_err() {
                return Err(Error::config_invalid(
                    "tests.timeout",
                    format!("Invalid duration: {timeout}"),
                ));
            }
        }

        if self.environment.check {
            if self.environment.tool.trim().is_empty() {
                return Err(Error::config_invalid("environment.tool", "must not be empty"));
            }
            self.environment
                .min_version
                .parse::<Version>()
                .map_err(|e| Error::config_invalid("environment.min_version", e))?;
        }

        Ok(())
    }

    /// Generates default configuration as a string.
    pub fn default_toml() -> Result<String> {
        Self::default().to_toml()
    }

    /// Serializes this configuration.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Internal {
            message: format!("Failed to serialize config: {e}"),
        })
    }

    /// Generates configuration for a specific preset; unknown names give the default.
    #[must_use]
    pub fn for_preset(preset: &str) -> Self {
        crate::presets::config(preset).unwrap_or_default()
    }
}

/// Which files are collected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Directory collection starts from.
    pub root: PathBuf,
    /// Extension allow-list; empty collects every file.
    pub extensions: Vec<String>,
    /// Names pruned at any depth.
    pub exclude: Vec<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            extensions: vec!["php".to_string(), "php5".to_string()],
            exclude: vec!["vendor".to_string()],
        }
    }
}

/// Test gate configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestsConfig {
    /// Whether the gate runs at all.
    pub enabled: bool,
    /// Shell command; `{config}` is replaced with [`TestsConfig::config`].
    pub command: String,
    /// Test runner configuration file, relative to the project root.
    pub config: String,
    /// Skip the gate silently when the configuration file is missing.
    pub require_config: bool,
    /// Question asked before running the tests.
    pub prompt: String,
    /// Kill the test run after this long (e.g. "10m"). Unset waits forever.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
    /// How many trailing output lines to show on failure; 0 shows all.
    pub failure_output_lines: usize,
}

impl Default for TestsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: format!("phpunit --configuration {CONFIG_PLACEHOLDER}"),
            config: "phpunit.xml".to_string(),
            require_config: true,
            prompt: "Would you like to run tests before committing?".to_string(),
            timeout: None,
            failure_output_lines: 0,
        }
    }
}

impl TestsConfig {
    /// The command with the configuration placeholder filled in.
    #[must_use]
    pub fn command_line(&self) -> String {
        self.command.replace(CONFIG_PLACEHOLDER, &self.config)
    }

    /// Parsed timeout; validated configs never fail here.
    #[must_use]
    pub fn timeout_duration(&self) -> Option<Duration> {
        self.timeout
            .as_deref()
            .and_then(|t| humantime::parse_duration(t).ok())
    }
}

/// Toolchain precondition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Whether to check the tool at all.
    pub check: bool,
    /// Tool that must be installed.
    pub tool: String,
    /// Argument that makes the tool print its version.
    pub version_arg: String,
    /// Oldest supported version.
    pub min_version: String,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            check: true,
            tool: "php".to_string(),
            version_arg: "--version".to_string(),
            min_version: "5.4".to_string(),
        }
    }
}

/// What blocks a commit besides failing tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Abort the commit when an error-severity rule matches.
    pub block_on_error: bool,
}
