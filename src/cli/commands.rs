//! CLI command implementations.

use crate::config::{Config, CONFIG_FILE_NAME};
use crate::core::collector;
use crate::core::error::{Error, Result};
use crate::core::executor::ProcessRunner;
use crate::core::gate::{Answer, AnswerSource, FixedAnswer, TtyAnswers};
use crate::core::git::{GitRepo, HookInstall, HookRemoval};
use crate::core::reporter::{Level, Reporter};
use crate::core::rules::{self, Finding, Severity};
use crate::core::runner::Runner;
use console::style;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use super::RunArgs;

/// Environment variable that skips the gate.
const SKIP_VAR: &str = "PCG_SKIP";

/// Loads the configuration, resolving a relative project root against the
/// directory of the file it came from.
fn load_config(path: Option<&Path>) -> Result<Config> {
    let source = match path {
        Some(p) => Some(p.to_path_buf()),
        None => match Config::find_config_file() {
            Ok(found) => Some(found),
            Err(Error::ConfigNotFound { .. }) => None,
            Err(e) => return Err(e),
        },
    };

    let Some(source) = source else {
        tracing::debug!("no configuration file, using defaults");
        return Ok(Config::default());
    };

    let mut config = Config::load_from(&source)?;
    if config.project.root.is_relative() {
        if let Some(dir) = source.parent().filter(|d| !d.as_os_str().is_empty()) {
            config.project.root = dir.join(&config.project.root);
        }
    }
    Ok(config)
}

/// Run the gate.
pub fn run(config_path: Option<&Path>, args: &RunArgs) -> Result<ExitCode> {
    if std::env::var(SKIP_VAR).ok().as_deref() == Some("1") {
        eprintln!("{} Skipping pre-commit gate ({SKIP_VAR}=1)", style("•").cyan());
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = load_config(config_path)?;
    if let Some(ref root) = args.root {
        config.project.root.clone_from(root);
    }
    if args.no_tests {
        config.tests.enabled = false;
    }

    let mut answers: Box<dyn AnswerSource> = if args.yes {
        Box::new(FixedAnswer(Answer::Yes))
    } else {
        Box::new(TtyAnswers)
    };
    let commands = ProcessRunner::new()
        .with_timeout(config.tests.timeout_duration())
        .with_spinner(console::user_attended_stderr());
    let mut reporter = Reporter::stdout();

    let outcome = Runner::new(&config, &mut reporter, answers.as_mut(), &commands).run()?;
    Ok(outcome.exit_code())
}

/// One finding in `scan --json` output.
#[derive(Debug, Serialize)]
struct FindingRecord<'a> {
    path: &'a Path,
    rule: &'a str,
    severity: Severity,
    pattern: &'a str,
}

impl<'a> From<&Finding<'a>> for FindingRecord<'a> {
    fn from(finding: &Finding<'a>) -> Self {
        Self {
            path: finding.path,
            rule: &finding.rule.label,
            severity: finding.severity(),
            pattern: finding.pattern,
        }
    }
}

/// `scan --json` output.
#[derive(Debug, Serialize)]
struct ScanReport<'a> {
    root: &'a Path,
    files: usize,
    findings: Vec<FindingRecord<'a>>,
}

/// Apply the content rules only.
pub fn scan(config_path: Option<&Path>, root: Option<&Path>, json: bool) -> Result<ExitCode> {
    let mut config = load_config(config_path)?;
    if let Some(root) = root {
        config.project.root = root.to_path_buf();
    }

    let project = &config.project;
    let files = collector::collect(&project.root, &project.extensions, &project.exclude)?;
    let findings = rules::check_all(&files, &config.rules);

    if json {
        let report = ScanReport {
            root: &project.root,
            files: files.len(),
            findings: findings.iter().map(FindingRecord::from).collect(),
        };
        let text = serde_json::to_string_pretty(&report).map_err(|e| Error::Internal {
            message: format!("Failed to serialize findings: {e}"),
        })?;
        let mut stdout = std::io::stdout();
        writeln!(stdout, "{text}").map_err(|e| Error::io("write output", e))?;
    } else {
        let mut reporter = Reporter::stdout();
        reporter.line(&format!("Found {} project files", files.len()), Level::Plain)?;
        for finding in &findings {
            reporter.finding(finding)?;
        }
    }

    let errors = findings
        .iter()
        .filter(|f| f.severity() == Severity::Error)
        .count();
    if config.policy.block_on_error && errors > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Initialize configuration.
pub fn init(preset: Option<&str>, force: bool) -> Result<ExitCode> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        eprintln!(
            "{} Configuration already exists: {}",
            style("!").yellow(),
            config_path.display()
        );
        eprintln!("  Use --force to overwrite.");
        return Ok(ExitCode::FAILURE);
    }

    let config = preset.map_or_else(Config::default, Config::for_preset);
    std::fs::write(&config_path, config.to_toml()?).map_err(|e| Error::io("write config", e))?;

    eprintln!("{} Created {}", style("✓").green(), config_path.display());
    if let Some(p) = preset {
        eprintln!("  Using preset: {p} ({})", crate::presets::description(p));
    }

    eprintln!("\nNext steps:");
    eprintln!("  1. Review and customize {CONFIG_FILE_NAME}");
    eprintln!("  2. Run: pcg install");

    Ok(ExitCode::SUCCESS)
}

/// Install git hook.
pub fn install(force: bool) -> Result<ExitCode> {
    let repo = GitRepo::discover()?;

    match repo.install_hook(force)? {
        HookInstall::AlreadyInstalled(path) => {
            eprintln!(
                "{} Hook already installed at {}",
                style("✓").green(),
                path.display()
            );
        },
        HookInstall::Installed { path, backup } => {
            if let Some(backup) = backup {
                eprintln!(
                    "{} Backed up existing hook to {}",
                    style("•").cyan(),
                    backup.display()
                );
            }
            eprintln!(
                "{} Installed pre-commit hook at {}",
                style("✓").green(),
                path.display()
            );
        },
    }

    Ok(ExitCode::SUCCESS)
}

/// Uninstall git hook.
pub fn uninstall() -> Result<ExitCode> {
    let repo = GitRepo::discover()?;

    match repo.uninstall_hook()? {
        HookRemoval::NotInstalled(path) => {
            eprintln!(
                "{} No hook installed at {}",
                style("•").cyan(),
                path.display()
            );
            Ok(ExitCode::SUCCESS)
        },
        HookRemoval::Foreign(path) => {
            eprintln!(
                "{} Hook at {} was not installed by precommit-gate",
                style("!").yellow(),
                path.display()
            );
            eprintln!("  Remove manually if desired.");
            Ok(ExitCode::FAILURE)
        },
        HookRemoval::Removed { path, backup } => {
            eprintln!(
                "{} Removed pre-commit hook from {}",
                style("✓").green(),
                path.display()
            );
            if let Some(backup) = backup {
                eprintln!(
                    "  Backup exists at {} - restore if needed",
                    backup.display()
                );
            }
            Ok(ExitCode::SUCCESS)
        },
    }
}

/// Show configuration.
pub fn config(config_path: Option<&Path>, raw: bool) -> Result<ExitCode> {
    let path = match config_path {
        Some(p) => Ok(p.to_path_buf()),
        None => Config::find_config_file(),
    };

    match path {
        Ok(path) => {
            eprintln!("Configuration file: {}", path.display());
            let content = if raw {
                std::fs::read_to_string(&path).map_err(|e| Error::io("read config", e))?
            } else {
                load_config(Some(&path))?.to_toml()?
            };
            eprintln!();
            std::io::stdout()
                .write_all(content.as_bytes())
                .map_err(|e| Error::io("write output", e))?;
            Ok(ExitCode::SUCCESS)
        },
        Err(Error::ConfigNotFound { .. }) => {
            eprintln!("{} No configuration file found, defaults:", style("!").yellow());
            eprintln!("  Run: pcg init");
            eprintln!();
            std::io::stdout()
                .write_all(Config::default_toml()?.as_bytes())
                .map_err(|e| Error::io("write output", e))?;
            Ok(ExitCode::SUCCESS)
        },
        Err(e) => Err(e),
    }
}

/// Generate shell completions.
pub fn completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    clap_complete::generate(
        shell,
        &mut super::Cli::command(),
        "pcg",
        &mut std::io::stdout(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_load_config_resolves_root_against_file() {
        let temp = TempDir::new().expect("create temp dir");
        let path = temp.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[project]\nroot = \"app\"\n").expect("write config");

        let config = load_config(Some(&path)).expect("load");
        assert_eq!(config.project.root, temp.path().join("app"));
    }

    #[test]
    #[cfg(unix)]
    fn test_load_config_keeps_absolute_root() {
        let temp = TempDir::new().expect("create temp dir");
        let path = temp.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[project]\nroot = \"/srv/shop\"\n").expect("write config");

        let config = load_config(Some(&path)).expect("load");
        assert_eq!(config.project.root, PathBuf::from("/srv/shop"));
    }

    #[test]
    fn test_load_config_missing_explicit_file() {
        let temp = TempDir::new().expect("create temp dir");
        let result = load_config(Some(&temp.path().join("nope.toml")));
        assert!(matches!(result, Err(Error::ConfigNotFound { .. })));
    }

    #[test]
    fn test_finding_record() {
        let rule = crate::core::rules::Rule::new("dd()", [" dd("], Severity::Warning);
        let finding = Finding {
            path: Path::new("src/a.php"),
            rule: &rule,
            pattern: " dd(",
        };
        let json = serde_json::to_value(FindingRecord::from(&finding)).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "path": "src/a.php",
                "rule": "dd()",
                "severity": "warning",
                "pattern": " dd(",
            })
        );
    }
}
