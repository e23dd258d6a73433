//! Output rendering for validation runs.
//!
//! Supports `table` (default), `json` and `markdown`. Every renderer has a
//! pure `compose_*` form returning a `String` so tests can assert on exact
//! text; `print_*` wrappers write to stdout.

use crate::config::OutputFormat;
use crate::error::Result;
use crate::models::{ValidationIssue, ValidationSeverity, ValidationSummary};
use owo_colors::OwoColorize;

/// Colors apply to terminal renderers only and honor `NO_COLOR`.
pub fn use_colors(format: OutputFormat) -> bool {
    format != OutputFormat::Json && std::env::var_os("NO_COLOR").is_none()
}

/// `error:` label for fatal messages on stderr.
pub fn error_prefix() -> String {
    if std::env::var_os("NO_COLOR").is_none() {
        "error:".red().bold().to_string()
    } else {
        "error:".to_string()
    }
}

/// Process exit code for a finished run.
///
/// 0 when there are no errors and, in strict mode, no issues at all.
pub fn exit_code(summary: &ValidationSummary, strict: bool) -> i32 {
    let errors = summary.issues_by_severity.error;
    if errors > 0 || (strict && summary.total_issues > 0) {
        1
    } else {
        0
    }
}

fn icon(severity: ValidationSeverity, color: bool) -> String {
    let raw = match severity {
        ValidationSeverity::Error => "✗",
        ValidationSeverity::Warning => "⚠",
        ValidationSeverity::Info => "ℹ",
        ValidationSeverity::Hint => "💡",
    };
    if !color {
        return raw.to_string();
    }
    match severity {
        ValidationSeverity::Error => raw.red().to_string(),
        ValidationSeverity::Warning => raw.yellow().to_string(),
        ValidationSeverity::Info => raw.blue().to_string(),
        ValidationSeverity::Hint => raw.bright_black().to_string(),
    }
}

fn issue_line(issue: &ValidationIssue, color: bool) -> String {
    let mut line = format!(
        "  {} {}{}",
        icon(issue.severity, color),
        issue.message,
        issue.location()
    );
    if let Some(fix) = &issue.fix {
        let hint = format!(" ({})", fix);
        if color {
            line.push_str(&hint.dimmed().to_string());
        } else {
            line.push_str(&hint);
        }
    }
    line
}

/// Per-file table: `✓ path` for a valid file, `✗ path` and its issues otherwise.
pub fn compose_table(summary: &ValidationSummary, color: bool) -> String {
    if summary.reports.is_empty() {
        return "No files found to validate\n".to_string();
    }
    let mut out = String::new();
    for report in &summary.reports {
        // non-blocking issues of a passing file only show up in the counts
        if report.valid {
            let mark = if color {
                "✓".green().to_string()
            } else {
                "✓".to_string()
            };
            out.push_str(&format!("{} {}\n", mark, report.file_path));
            continue;
        }
        if color {
            out.push_str(&format!("{} {}\n", "✗".red(), report.file_path.bold()));
        } else {
            out.push_str(&format!("✗ {}\n", report.file_path));
        }
        for issue in &report.issues {
            out.push_str(&issue_line(issue, color));
            out.push('\n');
        }
    }
    out
}

/// Summary serialized verbatim as pretty JSON.
pub fn compose_json(summary: &ValidationSummary) -> Result<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}

/// Markdown report: metrics table, then the issues of every invalid file.
pub fn compose_markdown(summary: &ValidationSummary) -> String {
    let sev = &summary.issues_by_severity;

    let mut out = String::from("# Validation Report\n\n## Summary\n\n");
    out.push_str("| Metric | Count |\n|--------|-------|\n");
    for (label, count) in [
        ("Total Files", summary.total_files),
        ("Valid Files", summary.valid_files),
        ("Invalid Files", summary.invalid_files),
        ("Total Issues", summary.total_issues),
        ("Errors", sev.error),
        ("Warnings", sev.warning),
        ("Info", sev.info),
        ("Hints", sev.hint),
    ] {
        out.push_str(&format!("| {} | {} |\n", label, count));
    }

    if summary.invalid_files > 0 {
        out.push_str("\n## Issues by File\n");
        for report in summary.reports.iter().filter(|r| !r.valid) {
            out.push_str(&format!("\n### {}\n\n", report.file_path));
            for issue in &report.issues {
                out.push_str(&format!(
                    "- **{}**{}: {}\n",
                    issue.severity.as_str().to_uppercase(),
                    issue.location(),
                    issue.message
                ));
                if let Some(fix) = &issue.fix {
                    out.push_str(&format!("  - *Suggested fix: {}*\n", fix));
                }
            }
        }
    }
    out
}

/// Counts, duration and the final verdict line.
pub fn compose_footer(summary: &ValidationSummary, strict: bool, color: bool) -> String {
    let title = if color {
        "Validation Summary".bold().to_string()
    } else {
        "Validation Summary".to_string()
    };
    let mut out = format!("\n{}\n{}\n", title, "─".repeat(40));
    out.push_str(&format!("Files processed: {}\n", summary.total_files));
    out.push_str(&format!("Valid files: {}\n", summary.valid_files));
    out.push_str(&format!("Invalid files: {}\n", summary.invalid_files));
    out.push_str(&format!("Total issues: {}\n", summary.total_issues));
    for severity in ValidationSeverity::ALL {
        let count = summary.issues_by_severity.get(severity);
        if count > 0 {
            out.push_str(&format!(
                "  {} {}: {}\n",
                icon(severity, color),
                severity,
                count
            ));
        }
    }
    out.push_str(&format!("Completed in {:.0}ms\n", summary.execution_time));

    let code = exit_code(summary, strict);
    let verdict = match (code == 0, color) {
        (true, true) => "PASS".green().bold().to_string(),
        (true, false) => "PASS".to_string(),
        (false, true) => "FAIL".red().bold().to_string(),
        (false, false) => "FAIL".to_string(),
    };
    out.push_str(&format!("Result: {} (exit {})\n", verdict, code));
    out
}

/// Print a run in the requested format; the footer follows non-JSON output.
pub fn print_summary(summary: &ValidationSummary, format: OutputFormat, strict: bool) -> Result<()> {
    let color = use_colors(format);
    match format {
        OutputFormat::Json => println!("{}", compose_json(summary)?),
        OutputFormat::Markdown => {
            print!("{}", compose_markdown(summary));
            print!("{}", compose_footer(summary, strict, false));
        }
        OutputFormat::Table => {
            print!("{}", compose_table(summary, color));
            print!("{}", compose_footer(summary, strict, color));
        }
    }
    Ok(())
}
