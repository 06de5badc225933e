//! The pre-commit run.
//!
//! Environment check, collection, rule checks, test gate, in that order. The
//! runner owns the decision whether the commit may proceed.

use crate::config::Config;
use crate::core::collector::{self, ProjectFileSet};
use crate::core::detector::{Detector, Environment};
use crate::core::error::{Error, Result};
use crate::core::executor::CommandRunner;
use crate::core::gate::{AnswerSource, GateOutcome, TestGate};
use crate::core::reporter::{Level, Reporter};
use crate::core::rules::{self, Finding, Severity};
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

/// Counts of findings by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindingCounts {
    /// Warning-severity findings.
    pub warnings: usize,
    /// Error-severity findings.
    pub errors: usize,
}

impl FindingCounts {
    /// Tallies `findings`.
    #[must_use]
    pub fn tally(findings: &[Finding<'_>]) -> Self {
        findings
            .iter()
            .fold(Self::default(), |mut counts, finding| {
                match finding.severity() {
                    Severity::Warning => counts.warnings += 1,
                    Severity::Error => counts.errors += 1,
                }
                counts
            })
    }

    /// Total number of findings.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.warnings + self.errors
    }
}

/// What a run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Result of the environment check.
    pub environment: Environment,
    /// Number of collected files.
    pub files: usize,
    /// Findings by severity.
    pub findings: FindingCounts,
    /// Final state of the test gate; `None` when the run was skipped early.
    pub gate: Option<GateOutcome>,
    /// Whether error findings block the commit.
    pub block_on_error: bool,
}

impl RunOutcome {
    fn skipped(environment: Environment) -> Self {
        Self {
            environment,
            files: 0,
            findings: FindingCounts::default(),
            gate: None,
            block_on_error: false,
        }
    }

    /// Returns true if the commit may proceed.
    #[must_use]
    pub fn success(&self) -> bool {
        let tests_failed = self.gate.as_ref().is_some_and(GateOutcome::is_failure);
        let blocked_by_findings = self.block_on_error && self.findings.errors > 0;
        !tests_failed && !blocked_by_findings
    }

    /// Process exit code: 0 to commit, 1 to abort.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        if self.success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

/// Collaborators a run talks to.
pub struct Runner<'a, W: Write> {
    config: &'a Config,
    reporter: &'a mut Reporter<W>,
    answers: &'a mut dyn AnswerSource,
    commands: &'a dyn CommandRunner,
}

impl<W: Write> std::fmt::Debug for Runner<'_, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("root", &self.config.project.root)
            .finish_non_exhaustive()
    }
}

impl<'a, W: Write> Runner<'a, W> {
    /// Creates a runner.
    pub fn new(
        config: &'a Config,
        reporter: &'a mut Reporter<W>,
        answers: &'a mut dyn AnswerSource,
        commands: &'a dyn CommandRunner,
    ) -> Self {
        Self {
            config,
            reporter,
            answers,
            commands,
        }
    }

    /// Runs the whole gate.
    pub fn run(&mut self) -> Result<RunOutcome> {
        let root = self.config.project.root.as_path();

        // An unreadable root is fatal even when the environment check would skip the run.
        std::fs::read_dir(root).map_err(|source| Error::Walk {
            path: root.to_path_buf(),
            source,
        })?;

        let environment = Detector::new(&self.config.environment).detect(self.commands, root);
        if let Environment::Unsupported(ref reason) = environment {
            self.reporter.line(
                &format!("{reason} (skipping pre-commit checks)"),
                Level::Warning,
            )?;
            return Ok(RunOutcome::skipped(environment));
        }

        let files = self.collect(root)?;
        let findings = self.scan(&files)?;

        let project_name = project_name(root);
        let gate = TestGate::new(&self.config.tests, root, &project_name)
            .run(self.reporter, self.answers, self.commands)?;

        let outcome = RunOutcome {
            environment,
            files: files.len(),
            findings,
            gate: Some(gate),
            block_on_error: self.config.policy.block_on_error,
        };

        if outcome.block_on_error && outcome.findings.errors > 0 {
            self.reporter.line(
                &format!(
                    "Commit blocked: {} error finding(s).",
                    outcome.findings.errors
                ),
                Level::Error,
            )?;
        }

        tracing::info!(
            files = outcome.files,
            warnings = outcome.findings.warnings,
            errors = outcome.findings.errors,
            success = outcome.success(),
            "pre-commit run finished"
        );
        Ok(outcome)
    }

    /// Collects project files and reports how many were found.
    pub fn collect(&mut self, root: &Path) -> Result<ProjectFileSet> {
        let project = &self.config.project;
        let files = collector::collect(root, &project.extensions, &project.exclude)?;
        self.reporter
            .line(&format!("Found {} project files", files.len()), Level::Plain)?;
        Ok(files)
    }

    /// Applies every configured rule to `files`, reporting each finding.
    pub fn scan(&mut self, files: &ProjectFileSet) -> Result<FindingCounts> {
        let findings = rules::check_all(files, &self.config.rules);
        for finding in &findings {
            self.reporter.finding(finding)?;
        }
        Ok(FindingCounts::tally(&findings))
    }
}

/// Display name for the project: the root's directory name, capitalised.
#[must_use]
pub fn project_name(root: &Path) -> String {
    let name = std::fs::canonicalize(root)
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "project".to_string());

    let mut chars = name.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
