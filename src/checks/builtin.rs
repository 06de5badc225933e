//! Built-in rule definitions.
//!
//! These rules are used when a configuration file does not declare its own
//! `[[rules]]`.

use crate::core::rules::{Rule, Severity};

/// Labels of built-in rules.
pub mod names {
    /// Laravel's dump-and-die helper.
    pub const DUMP_AND_DIE: &str = "dd()";
    /// Unresolved merge conflict.
    pub const GIT_CONFLICT: &str = "git conflict";
    /// Rust's `dbg!` macro.
    pub const DBG_MACRO: &str = "dbg!()";
    /// JavaScript debugging leftovers.
    pub const JS_DEBUGGER: &str = "debugger";
    /// Python breakpoints.
    pub const PY_BREAKPOINT: &str = "breakpoint()";
}

/// Unresolved merge-conflict markers, for every stack.
#[must_use]
pub fn merge_conflict() -> Rule {
    Rule::new(names::GIT_CONFLICT, ["<<<<<<<"], Severity::Error)
}

/// Default PHP rules.
#[must_use]
pub fn php_rules() -> Vec<Rule> {
    vec![
        Rule::new(names::DUMP_AND_DIE, [" dd("], Severity::Warning),
        merge_conflict(),
    ]
}

/// Default Rust rules.
#[must_use]
pub fn rust_rules() -> Vec<Rule> {
    vec![
        Rule::new(names::DBG_MACRO, ["dbg!("], Severity::Warning),
        merge_conflict(),
    ]
}

/// Default Node.js/TypeScript rules.
#[must_use]
pub fn node_rules() -> Vec<Rule> {
    vec![
        Rule::new(names::JS_DEBUGGER, ["debugger;"], Severity::Warning),
        merge_conflict(),
    ]
}

/// Default Python rules.
#[must_use]
pub fn python_rules() -> Vec<Rule> {
    vec![
        Rule::new(
            names::PY_BREAKPOINT,
            ["breakpoint()", "import pdb"],
            Severity::Warning,
        ),
        merge_conflict(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_rule_set_checks_conflicts() {
        for rules in [php_rules(), rust_rules(), node_rules(), python_rules()] {
            assert!(rules.contains(&merge_conflict()));
        }
    }

    #[test]
    fn test_conflict_rule_is_error() {
        assert_eq!(merge_conflict().severity, Severity::Error);
        assert_eq!(php_rules()[0].severity, Severity::Warning);
    }
}
