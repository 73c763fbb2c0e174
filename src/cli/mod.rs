//! CLI module for `refine-gen`
//!
//! ## Commands
//!
//! - `generate` - Generate wrapper units for a source tree
//! - `inspect` - Print what the generator learned about each wrapper
//! - `emit <file>` - Print the generated units of a single file
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use crate::project::DriverConfig;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<crate::project::ProjectError> for CliError {
    fn from(err: crate::project::ProjectError) -> Self {
        CliError::failure(format!("Error: {err}"))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Compile-time generator for refined wrapper types
#[derive(Parser, Debug)]
#[command(name = "refine-gen")]
#[command(version = VERSION)]
#[command(about = "Generate refined wrapper types from #[refined] placeholders", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate one unit per wrapper into the output directory
    Generate {
        /// Source tree to scan
        #[arg(long = "src", value_name = "DIR", default_value = "src")]
        src: PathBuf,
        /// Directory for generated units
        #[arg(long = "out", value_name = "DIR", default_value = "src/generated")]
        out: PathBuf,
        /// Report stale or missing units without writing them
        #[arg(long)]
        check: bool,
        /// Number of render threads
        #[arg(short = 'j', long = "jobs", value_name = "N")]
        jobs: Option<usize>,
    },

    /// Print the descriptor of every wrapper
    Inspect {
        /// Source tree to scan
        #[arg(long = "src", value_name = "DIR", default_value = "src")]
        src: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print the generated units of a single file to stdout
    Emit {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
pub fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::Generate { src, out, check, jobs } => commands::generate(&DriverConfig {
            src_dir: src,
            out_dir: out,
            check,
            jobs,
        }),
        Command::Inspect { src, format } => commands::inspect(&src, format),
        Command::Emit { file } => commands::emit(&file),
    }
}

// ============================================================================
// Tests
// ============================================================================
