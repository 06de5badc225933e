//! Literal marker rules and the checker that applies them.
//!
//! Matching is plain, case-sensitive substring search. A file yields at most
//! one finding per rule no matter how many of the rule's patterns it contains.

use crate::core::collector::ProjectFileSet;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How serious a rule hit is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Advisory.
    Warning,
    /// Blocking intent; only blocks when `policy.block_on_error` is set.
    Error,
}

impl Severity {
    /// Prefix used when reporting a finding.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Warning => "Warning",
            Self::Error => "Error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A set of literal patterns reported under one label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Name shown in reports, e.g. `dd()`.
    pub label: String,
    /// Any of these substrings counts as a hit.
    pub patterns: Vec<String>,
    /// Reporting severity.
    pub severity: Severity,
}

impl Rule {
    /// Creates a rule.
    pub fn new<I, P>(label: impl Into<String>, patterns: I, severity: Severity) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self {
            label: label.into(),
            patterns: patterns.into_iter().map(Into::into).collect(),
            severity,
        }
    }

    /// Returns the first pattern contained in `content`.
    #[must_use]
    pub fn first_match(&self, content: &str) -> Option<&str> {
        self.patterns
            .iter()
            .map(String::as_str)
            .find(|pattern| content.contains(pattern))
    }
}

/// A rule that matched a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Finding<'a> {
    /// File the rule matched.
    pub path: &'a Path,
    /// The rule that matched.
    pub rule: &'a Rule,
    /// First of the rule's patterns found in the file.
    pub pattern: &'a str,
}

impl Finding<'_> {
    /// Severity of the matched rule.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.rule.severity
    }

    /// Report message without the severity prefix.
    #[must_use]
    pub fn message(&self) -> String {
        format!("{} found in {}", self.rule.label, self.path.display())
    }
}

impl std::fmt::Display for Finding<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.rule.severity, self.message())
    }
}

/// Returns true if `content` contains any of `patterns`.
#[must_use]
pub fn contains_any<S: AsRef<str>>(patterns: &[S], content: &str) -> bool {
    patterns.iter().any(|p| content.contains(p.as_ref()))
}

/// Checks every file against one rule, in path order.
#[must_use]
pub fn check<'a>(files: &'a ProjectFileSet, rule: &'a Rule) -> Vec<Finding<'a>> {
    files
        .iter()
        .filter_map(|(path, content)| {
            rule.first_match(content)
                .map(|pattern| Finding { path, rule, pattern })
        })
        .collect()
}

/// Checks every file against every rule; findings are grouped by rule in the given order.
#[must_use]
pub fn check_all<'a>(files: &'a ProjectFileSet, rules: &'a [Rule]) -> Vec<Finding<'a>> {
    rules.iter().flat_map(|rule| check(files, rule)).collect()
}
