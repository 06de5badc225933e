//! Command-line interface for precommit-gate.
//!
//! This module provides the `pcg` CLI with subcommands for:
//! - `run`: Run the gate (the default)
//! - `scan`: Apply the content rules only
//! - `init`: Initialize configuration
//! - `install`: Install git hook
//! - `uninstall`: Remove git hook
//! - `config`: Show configuration

mod commands;

use crate::core::error::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Pre-commit quality gate: debug leftovers, conflict markers, and a test run.
#[derive(Debug, Parser)]
#[command(
    name = "pcg",
    author,
    version,
    about = "Pre-commit quality gate: debug leftovers, conflict markers, and a test run",
    long_about = r#"
precommit-gate (pcg) scans your project before each commit for leftover
debug calls such as dd() and for unresolved merge conflict markers, then
offers to run the test suite. Findings are reported; only failing tests
abort the commit.

Quick start:
  pcg init      # Create configuration
  pcg install   # Install git hook
  # Done! Every commit now goes through the gate.

Environment variables:
  PCG_SKIP=1                Skip the gate entirely
  RUST_LOG=debug            Diagnostic logging on stderr
"#,
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use color output.
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Configuration file to use instead of searching for one.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Always use color.
    Always,
    /// Auto-detect color support.
    #[default]
    Auto,
    /// Never use color.
    Never,
}

/// Options for `pcg run`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct RunArgs {
    /// Project root to scan, overriding `project.root`.
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Answer yes to the test prompt.
    #[arg(short, long, conflicts_with = "no_tests")]
    pub yes: bool,

    /// Never run tests.
    #[arg(long)]
    pub no_tests: bool,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the pre-commit gate.
    #[command(visible_alias = "r")]
    Run(RunArgs),

    /// Apply the content rules without prompting or running tests.
    #[command(visible_alias = "s")]
    Scan {
        /// Project root to scan, overriding `project.root`.
        #[arg(long, value_name = "DIR")]
        root: Option<PathBuf>,

        /// Print findings as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Initialize precommit-gate configuration.
    #[command(visible_alias = "i")]
    Init {
        /// Use a preset configuration.
        #[arg(
            short,
            long,
            value_parser = clap::builder::PossibleValuesParser::new(crate::presets::available().iter().copied())
        )]
        preset: Option<String>,

        /// Overwrite existing configuration.
        #[arg(short, long)]
        force: bool,
    },

    /// Install the git pre-commit hook.
    Install {
        /// Overwrite existing hook.
        #[arg(short, long)]
        force: bool,
    },

    /// Remove the git pre-commit hook.
    Uninstall,

    /// Show configuration file location and contents.
    Config {
        /// Output raw TOML.
        #[arg(long)]
        raw: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Runs the CLI.
pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);
    setup_color(cli.color);

    let config = cli.config.as_deref();

    // If no subcommand, run the default action (same as `pcg run`)
    match cli.command {
        Some(Commands::Run(args)) => commands::run(config, &args),
        Some(Commands::Scan { root, json }) => commands::scan(config, root.as_deref(), json),
        Some(Commands::Init { preset, force }) => commands::init(preset.as_deref(), force),
        Some(Commands::Install { force }) => commands::install(force),
        Some(Commands::Uninstall) => commands::uninstall(),
        Some(Commands::Config { raw }) => commands::config(config, raw),
        Some(Commands::Completions { shell }) => {
            commands::completions(shell);
            Ok(ExitCode::SUCCESS)
        },
        None => commands::run(config, &RunArgs::default()),
    }
}

/// Sets up logging based on verbosity flags.
fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Sets up color output.
fn setup_color(choice: ColorChoice) {
    match choice {
        ColorChoice::Always => {
            console::set_colors_enabled(true);
            console::set_colors_enabled_stderr(true);
        },
        ColorChoice::Never => {
            console::set_colors_enabled(false);
            console::set_colors_enabled_stderr(false);
        },
        ColorChoice::Auto => {
            // Let console crate auto-detect
        },
    }
}
