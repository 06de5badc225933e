//! Built-in marker rules.
//!
//! The rule engine itself lives in [`crate::core::rules`]; this module only
//! provides the default rule sets shipped with the presets.

pub mod builtin;
