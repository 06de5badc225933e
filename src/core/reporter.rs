//! Styled console output.
//!
//! Every emission is wrapped in its level's colour and reset afterwards, so a
//! half-printed line never leaks styling into the terminal.

use crate::core::error::{Error, Result};
use crate::core::rules::{Finding, Severity};
use console::Style;
use std::io::Write;

/// Output styling level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Level {
    /// No styling.
    #[default]
    Plain,
    /// Yellow.
    Warning,
    /// Red.
    Error,
    /// Green.
    Success,
}

impl Level {
    fn style(self) -> Option<Style> {
        match self {
            Self::Plain => None,
            Self::Warning => Some(Style::new().yellow().bold()),
            Self::Error => Some(Style::new().red().bold()),
            Self::Success => Some(Style::new().green().bold()),
        }
    }
}

impl From<Severity> for Level {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Warning => Self::Warning,
            Severity::Error => Self::Error,
        }
    }
}

/// Writes styled lines to a sink.
#[derive(Debug)]
pub struct Reporter<W: Write> {
    out: W,
    colors: bool,
}

impl Reporter<std::io::Stdout> {
    /// Reporter on standard output, coloured when stdout supports it.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(std::io::stdout(), console::colors_enabled())
    }
}

impl<W: Write> Reporter<W> {
    /// Creates a reporter writing to `out`.
    pub const fn new(out: W, colors: bool) -> Self {
        Self { out, colors }
    }

    /// Emits one line followed by a newline.
    pub fn line(&mut self, text: &str, level: Level) -> Result<()> {
        self.emit(&[text], level, true)
    }

    /// Emits `text` without a trailing newline; used for prompts.
    pub fn inline(&mut self, text: &str, level: Level) -> Result<()> {
        self.emit(&[text], level, false)
    }

    /// Emits several lines with a trailing newline.
    pub fn lines<S: AsRef<str>>(&mut self, lines: &[S], level: Level) -> Result<()> {
        self.emit(lines, level, true)
    }

    /// Emits a finding coloured by its severity.
    pub fn finding(&mut self, finding: &Finding<'_>) -> Result<()> {
        self.line(&finding.to_string(), finding.severity().into())
    }

    /// Writes `lines` in `level`'s style; lines are separated by newlines and
    /// `newline` controls the one after the last line.
    pub fn emit<S: AsRef<str>>(
        &mut self,
        lines: &[S],
        level: Level,
        newline: bool,
    ) -> Result<()> {
        let text = lines
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join("\n");

        self.write_styled(&text, level, newline)
            .map_err(|e| Error::io("write output", e))
    }

    fn write_styled(&mut self, text: &str, level: Level, newline: bool) -> std::io::Result<()> {
        match level.style() {
            Some(style) => write!(
                self.out,
                "{}",
                style.force_styling(self.colors).apply_to(text)
            )?,
            None => self.out.write_all(text.as_bytes())?,
        }

        if newline {
            writeln!(self.out)?;
        }
        self.out.flush()
    }

    /// Consumes the reporter, returning the sink.
    pub fn into_inner(self) -> W {
        self.out
    }
}
