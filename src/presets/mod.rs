//! Configuration presets for common project types.
//!
//! Presets provide sensible default configurations for different tech stacks.

use crate::checks::builtin;
use crate::config::{Config, EnvironmentConfig, ProjectConfig, TestsConfig};

/// Available preset names.
pub mod names {
    /// PHP projects (phpunit). The default.
    pub const PHP: &str = "php";
    /// Python projects (pytest).
    pub const PYTHON: &str = "python";
    /// Node.js/TypeScript projects (npm test).
    pub const NODE: &str = "node";
    /// Rust projects (cargo test).
    pub const RUST: &str = "rust";
}

/// Returns a list of available preset names.
#[must_use]
pub const fn available() -> &'static [&'static str] {
    &[names::PHP, names::PYTHON, names::NODE, names::RUST]
}

/// Returns a description for a preset.
#[must_use]
pub fn description(name: &str) -> &'static str {
    match name {
        names::PHP => "PHP projects (phpunit, dd() and conflict markers)",
        names::PYTHON => "Python projects (pytest, breakpoints and conflict markers)",
        names::NODE => "Node.js/TypeScript projects (npm test, debugger and conflict markers)",
        names::RUST => "Rust projects (cargo test, dbg! and conflict markers)",
        _ => "Unknown preset",
    }
}

/// Builds the configuration for a preset.
#[must_use]
pub fn config(name: &str) -> Option<Config> {
    let config = match name {
        names::PHP => Config::default(),
        names::PYTHON => stack(
            &["py"],
            &["venv", "__pycache__", "build", "dist"],
            TestsConfig {
                command: "pytest -c {config}".to_string(),
                config: "pytest.ini".to_string(),
                ..TestsConfig::default()
            },
            tool("python3", "3.8"),
            builtin::python_rules(),
        ),
        names::NODE => stack(
            &["js", "jsx", "ts", "tsx", "mjs", "cjs"],
            &["node_modules", "dist", "build", "coverage"],
            TestsConfig {
                command: "npm test".to_string(),
                config: "package.json".to_string(),
                ..TestsConfig::default()
            },
            tool("node", "18"),
            builtin::node_rules(),
        ),
        names::RUST => stack(
            &["rs"],
            &["target"],
            TestsConfig {
                command: "cargo test --quiet".to_string(),
                config: "Cargo.toml".to_string(),
                ..TestsConfig::default()
            },
            tool("cargo", "1.70"),
            builtin::rust_rules(),
        ),
        _ => return None,
    };
    Some(config)
}

fn stack(
    extensions: &[&str],
    exclude: &[&str],
    tests: TestsConfig,
    environment: EnvironmentConfig,
    rules: Vec<crate::core::rules::Rule>,
) -> Config {
    Config {
        project: ProjectConfig {
            extensions: extensions.iter().map(ToString::to_string).collect(),
            exclude: exclude.iter().map(ToString::to_string).collect(),
            ..ProjectConfig::default()
        },
        tests,
        environment,
        rules,
        ..Config::default()
    }
}

fn tool(name: &str, min_version: &str) -> EnvironmentConfig {
    EnvironmentConfig {
        tool: name.to_string(),
        min_version: min_version.to_string(),
        ..EnvironmentConfig::default()
    }
}
