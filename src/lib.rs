//! # precommit-gate
//!
//! A pre-commit quality gate for PHP projects and friends.
//!
//! Before each commit the gate scans the project's source files for leftover
//! debug calls and unresolved merge conflict markers, reports what it finds,
//! and offers to run the test suite. Only a failing test run aborts the commit.
//!
//! ## Features
//!
//! - **Content rules**: `dd(` and `<<<<<<<` out of the box, custom rules in
//!   `precommit-gate.toml`
//! - **Test gate**: interactive prompt, then `phpunit` (or any command)
//! - **Presets**: PHP, Python, Node.js and Rust defaults
//! - **Hook management**: `pcg install` wires the gate into `.git/hooks`
//!
//! ## Example
//!
//! ```rust,no_run
//! use precommit_gate::core::executor::ProcessRunner;
//! use precommit_gate::core::gate::TtyAnswers;
//! use precommit_gate::core::reporter::Reporter;
//! use precommit_gate::{Config, Runner};
//!
//! fn main() -> precommit_gate::Result<()> {
//!     // Load configuration
//!     let config = Config::load_or_default()?;
//!
//!     let mut reporter = Reporter::stdout();
//!     let mut answers = TtyAnswers;
//!     let commands = ProcessRunner::new();
//!
//!     // Scan, report, and run the test gate
//!     let outcome = Runner::new(&config, &mut reporter, &mut answers, &commands).run()?;
//!
//!     if !outcome.success() {
//!         std::process::exit(1);
//!     }
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/precommit-gate/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod checks;
pub mod cli;
pub mod config;
pub mod core;
pub mod presets;

// Re-export main types for convenience
pub use config::Config;
pub use core::collector::{collect, ProjectFileSet};
pub use core::error::{Error, Result};
pub use core::rules::{Finding, Rule, Severity};
pub use core::runner::{RunOutcome, Runner};
