//! The interactive test gate.
//!
//! ```text
//! Idle -> Prompted -> Running -> Passed | Failed
//!                  \-> Skipped
//! ```
//!
//! The gate is skipped silently when tests are disabled or the test runner's
//! configuration file is missing. Only a failing test run blocks the commit.

use crate::config::TestsConfig;
use crate::core::error::Result;
use crate::core::executor::{CommandRunner, TestRunResult};
use crate::core::reporter::{Level, Reporter};
use std::io::{BufRead, Write};
use std::path::Path;

/// A yes/no answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    /// Run the tests.
    Yes,
    /// Skip the tests.
    No,
}

/// Interprets prompt input; anything but `n` means yes.
#[must_use]
pub fn parse_answer(input: &str) -> Answer {
    if input.trim().eq_ignore_ascii_case("n") {
        Answer::No
    } else {
        Answer::Yes
    }
}

/// Where prompt answers come from.
#[cfg_attr(test, mockall::automock)]
pub trait AnswerSource {
    /// Reads one line of input.
    fn read_answer(&mut self) -> std::io::Result<String>;
}

/// Reads answers from the controlling terminal, bypassing stdin.
#[derive(Debug, Default)]
pub struct TtyAnswers;

impl TtyAnswers {
    #[cfg(unix)]
    const DEVICE: &'static str = "/dev/tty";
    #[cfg(windows)]
    const DEVICE: &'static str = "CONIN$";
}

impl AnswerSource for TtyAnswers {
    #[cfg(any(unix, windows))]
    fn read_answer(&mut self) -> std::io::Result<String> {
        let tty = std::fs::File::open(Self::DEVICE)?;
        let mut line = String::new();
        std::io::BufReader::new(tty).read_line(&mut line)?;
        Ok(line)
    }

    #[cfg(not(any(unix, windows)))]
    fn read_answer(&mut self) -> std::io::Result<String> {
        Err(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "no controlling terminal",
        ))
    }
}

/// Always gives the same answer without reading anything.
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub Answer);

impl AnswerSource for FixedAnswer {
    fn read_answer(&mut self) -> std::io::Result<String> {
        Ok(match self.0 {
            Answer::Yes => "y".to_string(),
            Answer::No => "n".to_string(),
        })
    }
}

/// Why the gate did not run the tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Tests disabled in configuration or on the command line.
    Disabled,
    /// The test runner's configuration file does not exist.
    NoConfig,
    /// The user answered no.
    Declined,
    /// No terminal to ask on.
    NoTerminal,
}

/// Final state of the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Tests were not run.
    Skipped(SkipReason),
    /// Tests ran and passed.
    Passed,
    /// Tests ran and failed; the commit must be aborted.
    Failed(TestRunResult),
}

impl GateOutcome {
    /// Returns true if the commit must be aborted.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Runs the project's tests behind a prompt.
#[derive(Debug)]
pub struct TestGate<'a> {
    config: &'a TestsConfig,
    root: &'a Path,
    project_name: &'a str,
}

impl<'a> TestGate<'a> {
    /// Creates a gate for the project at `root`.
    #[must_use]
    pub const fn new(config: &'a TestsConfig, root: &'a Path, project_name: &'a str) -> Self {
        Self {
            config,
            root,
            project_name,
        }
    }

    /// Returns true if the test runner's configuration file exists under the root.
    #[must_use]
    pub fn has_test_config(&self) -> bool {
        self.root.join(&self.config.config).is_file()
    }

    /// Drives the gate to a final state.
    pub fn run<W: Write>(
        &self,
        reporter: &mut Reporter<W>,
        answers: &mut dyn AnswerSource,
        runner: &dyn CommandRunner,
    ) -> Result<GateOutcome> {
        if !self.config.enabled {
            tracing::debug!("tests disabled");
            return Ok(GateOutcome::Skipped(SkipReason::Disabled));
        }

        if self.config.require_config && !self.has_test_config() {
            tracing::info!(config = %self.config.config, "no test configuration, skipping tests");
            return Ok(GateOutcome::Skipped(SkipReason::NoConfig));
        }

        reporter.inline(&format!("{} [Y/n] ", self.config.prompt), Level::Plain)?;
        let answer = match answers.read_answer() {
            Ok(input) => parse_answer(&input),
            Err(e) => {
                tracing::warn!(error = %e, "cannot read answer, treating as no");
                reporter.line("", Level::Plain)?;
                reporter.line("Skipping Tests (no terminal available).", Level::Warning)?;
                return Ok(GateOutcome::Skipped(SkipReason::NoTerminal));
            },
        };

        if answer == Answer::No {
            reporter.line("Skipping Tests.", Level::Warning)?;
            return Ok(GateOutcome::Skipped(SkipReason::Declined));
        }

        reporter.line("Running Tests...", Level::Success)?;
        let result = runner.run(&self.config.command_line(), self.root)?;

        if result.success() {
            reporter.line("Tests Passed.", Level::Success)?;
            return Ok(GateOutcome::Passed);
        }

        tracing::info!(exit_code = result.exit_code, summary = ?result.summary(), "tests failed");
        reporter.line(
            &format!("Tests failed for {} with message:", self.project_name),
            Level::Error,
        )?;
        reporter.lines(result.tail(self.config.failure_output_lines), Level::Plain)?;

        Ok(GateOutcome::Failed(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::executor::MockCommandRunner;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tempfile::TempDir;

    struct Fixture {
        temp: TempDir,
        config: TestsConfig,
    }

    impl Fixture {
        fn new() -> Self {
            let temp = TempDir::new().expect("create temp dir");
            std::fs::write(temp.path().join("phpunit.xml"), "<phpunit/>").expect("write config");
            Self {
                temp,
                config: TestsConfig::default(),
            }
        }

        fn run(
            &self,
            answers: &mut dyn AnswerSource,
            runner: &dyn CommandRunner,
        ) -> (GateOutcome, String) {
            let mut reporter = Reporter::new(Vec::new(), false);
            let gate = TestGate::new(&self.config, self.temp.path(), "Shop");
            let outcome = gate.run(&mut reporter, answers, runner).expect("gate runs");
            let out = String::from_utf8(reporter.into_inner()).expect("utf8");
            (outcome, out)
        }
    }

    fn answering(input: &'static str) -> MockAnswerSource {
        let mut answers = MockAnswerSource::new();
        answers
            .expect_read_answer()
            .times(1)
            .returning(move || Ok(input.to_string()));
        answers
    }

    fn never_runs() -> MockCommandRunner {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().never();
        runner
    }

    #[rstest]
    #[case("n", Answer::No)]
    #[case("N", Answer::No)]
    #[case(" n \n", Answer::No)]
    #[case("", Answer::Yes)]
    #[case("\n", Answer::Yes)]
    #[case("y", Answer::Yes)]
    #[case("no", Answer::Yes)]
    #[case("nope", Answer::Yes)]
    fn test_parse_answer(#[case] input: &str, #[case] expected: Answer) {
        assert_eq!(parse_answer(input), expected);
    }

    #[test]
    fn test_declined_never_runs_tests() {
        let fixture = Fixture::new();
        let (outcome, out) = fixture.run(&mut answering("n\n"), &never_runs());

        assert_eq!(outcome, GateOutcome::Skipped(SkipReason::Declined));
        assert!(!outcome.is_failure());
        assert_eq!(
            out,
            "Would you like to run tests before committing? [Y/n] Skipping Tests.\n"
        );
    }

    #[test]
    fn test_default_answer_runs_tests_and_passes() {
        let fixture = Fixture::new();
        let root = fixture.temp.path().to_path_buf();
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(move |command, cwd| {
                command == "phpunit --configuration phpunit.xml" && cwd == root.as_path()
            })
            .times(1)
            .returning(|_, _| Ok(TestRunResult::new(["OK (12 tests)"], 0)));

        let (outcome, out) = fixture.run(&mut answering("\n"), &runner);

        assert_eq!(outcome, GateOutcome::Passed);
        assert!(out.ends_with("Running Tests...\nTests Passed.\n"));
    }

    #[test]
    fn test_failure_reports_output_and_fails() {
        let fixture = Fixture::new();
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .times(1)
            .returning(|_, _| Ok(TestRunResult::new(["3 failures"], 1)));

        let (outcome, out) = fixture.run(&mut answering("y"), &runner);

        assert!(outcome.is_failure());
        assert_eq!(
            outcome,
            GateOutcome::Failed(TestRunResult::new(["3 failures"], 1))
        );
        assert!(out.ends_with("Tests failed for Shop with message:\n3 failures\n"));
    }

    #[test]
    fn test_failure_output_is_trimmed_to_tail() {
        let mut fixture = Fixture::new();
        fixture.config.failure_output_lines = 2;
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .returning(|_, _| Ok(TestRunResult::new(["a", "b", "c"], 2)));

        let (_, out) = fixture.run(&mut answering("y"), &runner);
        assert!(out.ends_with("with message:\nb\nc\n"));
    }

    #[test]
    fn test_missing_terminal_counts_as_no() {
        let fixture = Fixture::new();
        let mut answers = MockAnswerSource::new();
        answers.expect_read_answer().times(1).returning(|| {
            Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no /dev/tty",
            ))
        });

        let (outcome, out) = fixture.run(&mut answers, &never_runs());

        assert_eq!(outcome, GateOutcome::Skipped(SkipReason::NoTerminal));
        assert!(out.contains("no terminal available"));
    }

    #[test]
    fn test_missing_test_config_skips_silently() {
        let mut fixture = Fixture::new();
        fixture.config.config = "phpunit.xml.dist".to_string();
        let mut answers = MockAnswerSource::new();
        answers.expect_read_answer().never();

        let (outcome, out) = fixture.run(&mut answers, &never_runs());

        assert_eq!(outcome, GateOutcome::Skipped(SkipReason::NoConfig));
        assert!(out.is_empty());
    }

    #[test]
    fn test_missing_test_config_ignored_when_not_required() {
        let mut fixture = Fixture::new();
        fixture.config.config = "absent.xml".to_string();
        fixture.config.require_config = false;
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|command, _| command == "phpunit --configuration absent.xml")
            .times(1)
            .returning(|_, _| Ok(TestRunResult::new(["OK"], 0)));

        let (outcome, _) = fixture.run(&mut answering(""), &runner);
        assert_eq!(outcome, GateOutcome::Passed);
    }

    #[test]
    fn test_disabled_skips_silently() {
        let mut fixture = Fixture::new();
        fixture.config.enabled = false;
        let mut answers = MockAnswerSource::new();
        answers.expect_read_answer().never();

        let (outcome, out) = fixture.run(&mut answers, &never_runs());

        assert_eq!(outcome, GateOutcome::Skipped(SkipReason::Disabled));
        assert!(out.is_empty());
    }

    #[test]
    fn test_fixed_answer() {
        assert_eq!(
            parse_answer(&FixedAnswer(Answer::Yes).read_answer().expect("read")),
            Answer::Yes
        );
        assert_eq!(
            parse_answer(&FixedAnswer(Answer::No).read_answer().expect("read")),
            Answer::No
        );
    }

    #[test]
    fn test_runner_error_propagates() {
        let fixture = Fixture::new();
        let mut runner = MockCommandRunner::new();
        runner.expect_run().returning(|command, _| {
            Err(crate::core::error::Error::Spawn {
                command: command.to_string(),
                source: std::io::Error::other("boom"),
            })
        });

        let mut reporter = Reporter::new(Vec::new(), false);
        let gate = TestGate::new(&fixture.config, fixture.temp.path(), "Shop");
        let result = gate.run(&mut reporter, &mut answering("y"), &runner);
        assert!(result.is_err());
    }
}
