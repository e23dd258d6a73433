//! mcp-devkit core library.
//!
//! This crate exposes programmatic APIs for validating the context documents
//! a project keeps under `.mcp/`: markdown structure checks, JSON Schema
//! checks, and a project status report.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `discovery`: Glob-based file discovery with exclude patterns.
//! - `error`: Error types shared by the library and binary.
//! - `logging`: Tracing subscriber setup.
//! - `models`: Issues, per-file reports, run summaries and rule context.
//! - `output`: Table/JSON/Markdown renderers and the exit-code contract.
//! - `registry`: Plugin registration and rule lookup.
//! - `rules`: Rule and plugin capabilities plus the built-in rules.
//! - `status`: Project progress report.
//! - `validator`: Runs selected rules over discovered files.
pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod logging;
pub mod models;
pub mod output;
pub mod registry;
pub mod rules;
pub mod status;
pub mod validator;

pub use error::{DevkitError, Result};
pub use registry::RuleRegistry;
pub use validator::{ValidationOptions, Validator};
