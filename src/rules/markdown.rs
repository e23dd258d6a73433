//! Structural markdown checks.
//!
//! Six line-based checks run in a fixed order over `.md` files: empty
//! sections, placeholder text, required sections, checkbox format, heading
//! hierarchy and link integrity. Only errors fail a file; the remaining
//! findings are warnings.

use super::ValidationRule;
use crate::error::RuleError;
use crate::models::{ValidationContext, ValidationIssue, ValidationResult};
use regex::Regex;
use std::sync::LazyLock;

pub const MARKDOWN_RULE: &str = "markdown";

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})(?:\s+(.*))?$").expect("heading regex"));
static CHECKBOX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)-\s*\[(.)\]\s*(.*)$").expect("checkbox regex"));
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\(([^)]+)\)").expect("link regex"));
static PLACEHOLDERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)TODO\s*:?\s*",
        r"(?i)FIXME\s*:?\s*",
        r"(?i)XXX\s*:?\s*",
        r"(?i)\[TODO\]",
        r"(?i)\[FIXME\]",
        r"\{\{[^}]+\}\}",
        r"\$\{[^}]+\}",
        r"<[A-Z_]+>",
        r"(?i)Your\s+(?:project|name|description|etc)",
        r"(?i)Replace\s+(?:this|with)",
        r"(?i)Enter\s+(?:your|the)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("placeholder regex"))
    .collect()
});

#[derive(Debug, Default)]
/// Structural checks for markdown context documents.
pub struct MarkdownRule;

impl MarkdownRule {
    pub fn new() -> Self {
        Self
    }
}

impl ValidationRule for MarkdownRule {
    fn name(&self) -> &str {
        MARKDOWN_RULE
    }

    fn description(&self) -> &str {
        "Validates markdown files for structure and content issues"
    }

    fn validate(&self, context: &ValidationContext) -> Result<ValidationResult, RuleError> {
        if !context.has_extension(".md") {
            return Ok(ValidationResult::pass());
        }
        let lines: Vec<&str> = context.content.split('\n').collect();
        let mut issues = Vec::new();
        issues.extend(check_empty_sections(&lines));
        issues.extend(check_placeholder_text(&lines));
        issues.extend(check_required_sections(
            &context.content,
            &context.file_name_lower(),
        ));
        issues.extend(check_checkbox_format(&lines));
        issues.extend(check_heading_structure(&lines));
        issues.extend(check_link_integrity(&lines));
        Ok(ValidationResult::from_issues(issues))
    }
}

/// Heading depth and text of a (trimmed) line, if it is an ATX heading.
fn parse_heading(line: &str) -> Option<(usize, &str)> {
    let caps = HEADING.captures(line.trim())?;
    let level = caps.get(1)?.as_str().len();
    let text = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");
    Some((level, text))
}

/// 1-based character column of a byte offset within `line`.
fn char_column(line: &str, byte_idx: usize) -> usize {
    line[..byte_idx].chars().count() + 1
}

pub fn check_empty_sections(lines: &[&str]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        let Some((level, text)) = parse_heading(line) else {
            continue;
        };
        if text.is_empty() {
            continue;
        }
        let mut has_content = false;
        for next in &lines[i + 1..] {
            if next.trim().is_empty() {
                continue;
            }
            if let Some((next_level, _)) = parse_heading(next) {
                if next_level <= level {
                    break;
                }
            }
            has_content = true;
            break;
        }
        if !has_content {
            issues.push(
                ValidationIssue::warning(
                    MARKDOWN_RULE,
                    format!("Empty section: \"{}\" has no content", text),
                )
                .at_line(i + 1)
                .with_fix("Add content to this section or remove the header"),
            );
        }
    }
    issues
}

pub fn check_placeholder_text(lines: &[&str]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        for re in PLACEHOLDERS.iter() {
            if let Some(m) = re.find(line) {
                issues.push(
                    ValidationIssue::warning(
                        MARKDOWN_RULE,
                        format!("Placeholder text found: \"{}\"", m.as_str().trim_end()),
                    )
                    .at_line(i + 1)
                    .at_column(char_column(line, m.start()))
                    .with_fix("Replace placeholder text with actual content"),
                );
            }
        }
    }
    issues
}

/// Sections a document must contain, inferred from its lower-cased file name.
pub fn required_sections_for(file_name: &str) -> &'static [&'static str] {
    if file_name == "readme.md" {
        &["# ", "## installation", "## usage"]
    } else if file_name.contains("prd") || file_name.contains("requirements") {
        &["# ", "## overview", "## requirements"]
    } else if file_name.contains("architecture") {
        &["# ", "## architecture", "## components"]
    } else if file_name.contains("task") || file_name.contains("todo") {
        &["# ", "## tasks"]
    } else {
        &[]
    }
}

pub fn check_required_sections(content: &str, file_name: &str) -> Vec<ValidationIssue> {
    let body = content.to_lowercase();
    required_sections_for(file_name)
        .iter()
        .filter(|section| !body.contains(*section))
        .map(|section| {
            ValidationIssue::error(
                MARKDOWN_RULE,
                format!("Missing required section: \"{}\"", section),
            )
            .with_fix(format!("Add a \"{}\" section to the document", section))
        })
        .collect()
}

pub fn check_checkbox_format(lines: &[&str]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        let Some(caps) = CHECKBOX.captures(line) else {
            continue;
        };
        let mark = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        let text = caps.get(3).map(|m| m.as_str()).unwrap_or("");
        if !matches!(mark, " " | "x" | "X") {
            let token = format!("[{}]", mark);
            let mut issue = ValidationIssue::error(
                MARKDOWN_RULE,
                format!(
                    "Invalid checkbox format: \"{}\" should be \"[ ]\" or \"[x]\"",
                    token
                ),
            )
            .at_line(i + 1)
            .with_fix(format!(
                "Replace \"{}\" with \"[ ]\" for unchecked or \"[x]\" for checked",
                token
            ));
            if let Some(pos) = line.find(&token) {
                issue = issue.at_column(char_column(line, pos));
            }
            issues.push(issue);
        }
        if text.trim().is_empty() {
            issues.push(
                ValidationIssue::warning(MARKDOWN_RULE, "Empty task: checkbox has no description")
                    .at_line(i + 1)
                    .with_fix("Add a description for this task"),
            );
        }
    }
    issues
}

pub fn check_heading_structure(lines: &[&str]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let mut last_level = 0usize;
    for (i, line) in lines.iter().enumerate() {
        let Some((level, text)) = parse_heading(line) else {
            continue;
        };
        if last_level > 0 && level > last_level + 1 {
            issues.push(
                ValidationIssue::warning(
                    MARKDOWN_RULE,
                    format!(
                        "Heading level jump: jumped from H{} to H{}",
                        last_level, level
                    ),
                )
                .at_line(i + 1)
                .with_fix(format!("Use H{} instead of H{}", last_level + 1, level)),
            );
        }
        if text.is_empty() {
            issues.push(
                ValidationIssue::error(MARKDOWN_RULE, "Empty heading: heading has no text")
                    .at_line(i + 1)
                    .at_column(level + 1)
                    .with_fix("Add text to the heading"),
            );
        }
        last_level = level;
    }
    issues
}

pub fn check_link_integrity(lines: &[&str]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        for caps in LINK.captures_iter(line) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let text = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            let url = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            let start = char_column(line, whole.start());
            // column of the url, just past "[text]("
            let url_col = start + text.chars().count() + 3;

            if text.trim().is_empty() {
                issues.push(
                    ValidationIssue::warning(MARKDOWN_RULE, "Empty link text")
                        .at_line(i + 1)
                        .at_column(start)
                        .with_fix("Add descriptive text for the link"),
                );
            }
            if url.contains("localhost") || url.contains("127.0.0.1") {
                issues.push(
                    ValidationIssue::warning(
                        MARKDOWN_RULE,
                        format!("Local URL in link: \"{}\"", url),
                    )
                    .at_line(i + 1)
                    .at_column(url_col)
                    .with_fix("Replace with a public URL or relative path"),
                );
            }
            if url.contains("example.com") || url == "#" || url == "TODO" {
                issues.push(
                    ValidationIssue::warning(MARKDOWN_RULE, format!("Placeholder URL: \"{}\"", url))
                        .at_line(i + 1)
                        .at_column(url_col)
                        .with_fix("Replace with the actual URL"),
                );
            }
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ValidationSeverity;

    fn run(path: &str, content: &str) -> ValidationResult {
        MarkdownRule::new()
            .validate(&ValidationContext::new(path, "/proj", content))
            .unwrap()
    }

    fn lines(s: &str) -> Vec<&str> {
        s.split('\n').collect()
    }

    #[test]
    fn test_clean_document_has_no_issues() {
        let res = run("notes.md", "Plain paragraph.\n\nAnother paragraph with words.\n");
        assert!(res.valid);
        assert!(res.issues.is_empty());
    }

    #[test]
    fn test_non_markdown_is_skipped() {
        let res = run("notes.txt", "## TODO\n- [?] nope\n");
        assert!(res.valid);
        assert!(res.issues.is_empty());
    }

    #[test]
    fn test_empty_section_between_siblings() {
        let issues = check_empty_sections(&lines("## Empty\n## Next\nbody text\n"));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, ValidationSeverity::Warning);
        assert!(issues[0].message.contains("Empty section"));
        assert!(issues[0].message.contains("Empty"));
        assert_eq!(issues[0].line, Some(1));
    }

    #[test]
    fn test_deeper_heading_counts_as_content() {
        let issues = check_empty_sections(&lines("# Top\n\n## Child\ntext\n"));
        assert!(issues.is_empty());
        let issues = check_empty_sections(&lines("# Last\n\n   \n"));
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_placeholder_todo_with_column() {
        let issues = check_placeholder_text(&lines("Some text TODO: fix this"));
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("TODO"));
        assert_eq!(issues[0].column, Some(11));
    }

    #[test]
    fn test_placeholder_patterns_each_reported() {
        let issues =
            check_placeholder_text(&lines("Hello {{name}} and ${PROJECT} at <HOST_NAME>"));
        assert_eq!(issues.len(), 3);
        let issues = check_placeholder_text(&lines("Enter your details. Replace this."));
        assert_eq!(issues.len(), 2);
        let issues = check_placeholder_text(&lines("Nothing to see here"));
        assert!(issues.is_empty());
    }

    #[test]
    fn test_required_sections_by_file_name() {
        let issues = check_required_sections("# Title\n## Usage\n", "readme.md");
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("## installation"));
        assert_eq!(issues[0].severity, ValidationSeverity::Error);
        assert!(issues[0].line.is_none());

        let issues = check_required_sections("# T\n## Tasks\n- [ ] a\n", "context_tasklist.md");
        assert!(issues.is_empty());
        let issues = check_required_sections("# T\n", "context_prd.md");
        assert_eq!(issues.len(), 2);
        assert!(check_required_sections("", "notes.md").is_empty());
    }

    #[test]
    fn test_invalid_checkbox_is_error() {
        let res = run("list.md", "- [?] do thing\n");
        let errors: Vec<_> = res
            .issues
            .iter()
            .filter(|i| i.severity == ValidationSeverity::Error)
            .collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("Invalid checkbox format"));
        assert_eq!(errors[0].column, Some(3));
        assert!(!res.valid);
    }

    #[test]
    fn test_empty_task_warning() {
        let issues = check_checkbox_format(&lines("  - [ ]   \n- [x] done\n- [X] ok"));
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.starts_with("Empty task"));
        assert_eq!(issues[0].line, Some(1));
    }

    #[test]
    fn test_heading_jump_and_empty_heading() {
        let issues = check_heading_structure(&lines("# A\n### C\n##\n"));
        assert_eq!(issues.len(), 2);
        assert!(issues[0].message.contains("H1 to H3"));
        assert_eq!(issues[0].fix.as_deref(), Some("Use H2 instead of H3"));
        assert_eq!(issues[1].severity, ValidationSeverity::Error);
        assert_eq!(issues[1].line, Some(3));
    }

    #[test]
    fn test_links_evaluated_independently() {
        let line = "See [](https://a.io) and [dev](http://localhost:3000) or [x](#)";
        let issues = check_link_integrity(&lines(line));
        assert_eq!(issues.len(), 3);
        assert_eq!(issues[0].message, "Empty link text");
        assert_eq!(issues[0].column, Some(5));
        assert!(issues[1].message.starts_with("Local URL"));
        assert_eq!(issues[1].column, Some(32));
        assert!(issues[2].message.starts_with("Placeholder URL"));
        assert_eq!(issues[2].column, Some(62));
    }

    #[test]
    fn test_only_errors_fail_the_file() {
        let res = run("doc.md", "# Title\n\nTODO: later\n");
        assert!(res.valid);
        assert!(!res.issues.is_empty());
    }
}
