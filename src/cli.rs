//! CLI argument parsing via `clap`.

use crate::config::{CliOverrides, OutputFormat};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "mcp-devkit",
    version,
    about = "Validate and inspect .mcp project context documents",
    long_about = "mcp-devkit checks the markdown and JSON context documents kept under a project's .mcp/ directory.\n\nConfiguration precedence: CLI > mcp-devkit.toml > defaults.",
    after_help = "Examples:\n  mcp-devkit validate\n  mcp-devkit validate ./my-project --strict --format markdown\n  mcp-devkit validate --rules markdown --exclude '**/drafts/**'\n  mcp-devkit status --json",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[arg(long, short = 'v', global = true, help = "Enable debug logging on stderr")]
    pub verbose: bool,
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose", help = "Only log errors")]
    pub quiet: bool,
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current mcp-devkit version.")]
    Version,
    /// Validate context documents
    #[command(
        about = "Validate project documents",
        long_about = "Run the registered validation rules over files matched by the pattern (default .mcp/**/*.md). Errors always fail the run; with --strict any issue does.",
        after_help = "Examples:\n  mcp-devkit validate --format json\n  mcp-devkit validate --pattern 'docs/**/*.md' --no-parallel"
    )]
    Validate {
        #[arg(help = "Project root to validate (default: detected from current dir)")]
        path: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Treat warnings and other issues as failures")]
        strict: bool,
        #[arg(long, help = "Output format: table|json|markdown (default: table)")]
        format: Option<OutputFormat>,
        #[arg(long, value_delimiter = ',', help = "Only run these rules (name, plugin/name, or glob like mark*)")]
        rules: Option<Vec<String>>,
        #[arg(long, value_delimiter = ',', help = "Glob patterns of files to skip")]
        exclude: Option<Vec<String>>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Validate one file at a time")]
        no_parallel: bool,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Reserved; fixes are not applied yet")]
        fix: bool,
        #[arg(long, help = "File glob relative to the project root")]
        pattern: Option<String>,
    },
    /// List registered rules
    #[command(about = "List validation rules", long_about = "Print every registered rule key with its description.")]
    Rules,
    /// Report project progress
    #[command(
        about = "Check project status",
        long_about = "Inspect .mcp/ context documents and report phase, progress and next steps. With --verbose, document paths are listed too."
    )]
    Status {
        #[arg(default_value = ".", help = "Project directory to check")]
        directory: String,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Output status in JSON format")]
        json: bool,
    },
}

/// Map `validate` flags onto config overrides; unset flags stay `None`.
#[allow(clippy::too_many_arguments)]
pub fn validate_overrides(
    strict: bool,
    format: Option<OutputFormat>,
    rules: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
    no_parallel: bool,
    fix: bool,
    pattern: Option<String>,
) -> CliOverrides {
    CliOverrides {
        strict: strict.then_some(true),
        format,
        rules,
        exclude,
        parallel: no_parallel.then_some(false),
        fix: fix.then_some(true),
        pattern,
    }
}
