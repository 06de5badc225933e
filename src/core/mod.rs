//! Core functionality for precommit-gate.
//!
//! This module contains the main components:
//! - [`collector`]: Project file discovery
//! - [`rules`]: Content rules and findings
//! - [`gate`]: The prompt-driven test gate
//! - [`runner`]: The pre-commit run itself
//! - [`reporter`]: Styled console output
//! - [`detector`]: Toolchain version checks
//! - [`executor`]: Subprocess execution
//! - [`error`]: Error types and result handling
//! - [`git`]: Git repository lookup for hook installation

pub mod collector;
pub mod detector;
pub mod error;
pub mod executor;
pub mod gate;
pub mod git;
pub mod reporter;
pub mod rules;
pub mod runner;
