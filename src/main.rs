//! mcp-devkit CLI binary entry point.
//! Delegates to library modules for validation and status, prints results.

use clap::Parser;
use mcp_devkit::cli::{self, Cli, Commands};
use mcp_devkit::config::{self, Effective};
use mcp_devkit::error::DevkitError;
use mcp_devkit::{logging, output, status};
use mcp_devkit::{RuleRegistry, Validator};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing::{debug, info};

fn fail(code: i32, err: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", output::error_prefix(), err);
    process::exit(code);
}

fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn run_validate(eff: &Effective) -> Result<i32, DevkitError> {
    let registry = Arc::new(RuleRegistry::with_builtins(&eff.schema_dir)?);
    let validator = Validator::new(registry, eff.options.clone());
    info!(
        root = %eff.project_root.display(),
        pattern = %eff.pattern,
        "validating files"
    );
    let summary = validator.validate_files(&eff.pattern, &eff.project_root)?;
    output::print_summary(&summary, eff.format, eff.options.strict)?;
    Ok(output::exit_code(&summary, eff.options.strict))
}

fn main() {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose, cli.quiet);

    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Validate {
            path,
            strict,
            format,
            rules,
            exclude,
            no_parallel,
            fix,
            pattern,
        } => {
            // an explicit path is validated as given; otherwise detect upward
            let root = match path {
                Some(p) => {
                    let p = PathBuf::from(p);
                    if !p.exists() {
                        fail(1, DevkitError::MissingRoot(p));
                    }
                    p
                }
                None => config::detect_project_root(&current_dir()),
            };
            let overrides =
                cli::validate_overrides(strict, format, rules, exclude, no_parallel, fix, pattern);
            let eff = match config::resolve_effective(&root, overrides) {
                Ok(eff) => eff,
                Err(e) => fail(2, e),
            };
            match &eff.config_path {
                Some(p) => {
                    debug!(config = %p.display(), "loaded config");
                }
                None => {
                    debug!("no mcp-devkit config found; using defaults");
                }
            }
            match run_validate(&eff) {
                Ok(code) => process::exit(code),
                Err(e) => fail(1, e),
            }
        }
        Commands::Rules => {
            let root = config::detect_project_root(&current_dir());
            let eff = match config::resolve_effective(&root, Default::default()) {
                Ok(eff) => eff,
                Err(e) => fail(2, e),
            };
            let registry = match RuleRegistry::with_builtins(&eff.schema_dir) {
                Ok(r) => r,
                Err(e) => fail(1, e),
            };
            for entry in registry.entries() {
                println!("{:<20} {}", entry.key, entry.rule.description());
            }
        }
        Commands::Status { directory, json } => {
            let report = match status::check_project_status(&PathBuf::from(directory)) {
                Ok(r) => r,
                Err(e) => fail(1, e),
            };
            if let Err(e) = status::print_status(&report, json, cli.verbose) {
                fail(1, e);
            }
        }
    }
}
