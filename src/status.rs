//! Project status report.
//!
//! Read-only inspection of the `.mcp` context documents: which exist, how far
//! along the project is, and what to do next.

use crate::error::Result;
use crate::validator::METADATA_DIR;
use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::Value as Json;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
/// Presence of each tracked context document.
pub struct ContextFiles {
    pub prd: bool,
    pub architecture: bool,
    pub tasklist: bool,
    pub metadata: bool,
}

impl ContextFiles {
    fn entries(&self) -> [(&'static str, &'static str, bool); 4] {
        [
            ("Requirements (PRD)", ".mcp/context_prd.md", self.prd),
            ("Architecture", ".mcp/context_architecture.md", self.architecture),
            ("Task List", ".mcp/context_tasklist.md", self.tasklist),
            ("Metadata", ".mcp/metadata.json", self.metadata),
        ]
    }

    fn present(&self) -> usize {
        self.entries().iter().filter(|(_, _, ok)| *ok).count()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStatus {
    pub has_project: bool,
    pub project_path: PathBuf,
    pub phase: String,
    pub progress: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_task: Option<String>,
    pub next_steps: Vec<String>,
    pub files: ContextFiles,
}

fn steps(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn meta_str(metadata: &Json, key: &str) -> Option<String> {
    metadata.get(key).and_then(Json::as_str).map(str::to_string)
}

/// Phase, current task and next steps implied by the present documents.
fn phase_and_next_steps(files: &ContextFiles, metadata: &Json) -> (String, String, Vec<String>) {
    if !files.prd {
        return (
            "initialization".into(),
            "Complete project requirements".into(),
            steps(&[
                "Edit .mcp/context_prd.md to define project requirements",
                "Specify the problem your project solves",
                "Define target audience and key features",
            ]),
        );
    }
    if !files.architecture {
        return (
            "planning".into(),
            "Design system architecture".into(),
            steps(&[
                "Edit .mcp/context_architecture.md to define system design",
                "Choose technology stack",
                "Plan component structure and data flow",
            ]),
        );
    }
    if !files.tasklist {
        return (
            "planning".into(),
            "Break down development tasks".into(),
            steps(&[
                "Edit .mcp/context_tasklist.md to create task breakdown",
                "Prioritize features by importance",
                "Estimate time for each development phase",
            ]),
        );
    }
    (
        meta_str(metadata, "phase").unwrap_or_else(|| "implementation".into()),
        meta_str(metadata, "currentTask").unwrap_or_else(|| "Begin implementation".into()),
        steps(&[
            "Start implementing core features",
            "Follow the development plan in .mcp/context_tasklist.md",
            "Run `mcp-devkit validate` to check the context documents",
        ]),
    )
}

/// Inspect `directory` and build its status report.
pub fn check_project_status(directory: &Path) -> Result<ProjectStatus> {
    let project_path = fs::canonicalize(directory).unwrap_or_else(|_| directory.to_path_buf());
    let mcp = project_path.join(METADATA_DIR);
    if !mcp.is_dir() {
        return Ok(ProjectStatus {
            has_project: false,
            project_path,
            phase: "none".into(),
            progress: "0%".into(),
            last_updated: None,
            current_task: None,
            next_steps: steps(&["Create a .mcp directory with the project context documents"]),
            files: ContextFiles::default(),
        });
    }

    let files = ContextFiles {
        prd: mcp.join("context_prd.md").is_file(),
        architecture: mcp.join("context_architecture.md").is_file(),
        tasklist: mcp.join("context_tasklist.md").is_file(),
        metadata: mcp.join("metadata.json").is_file(),
    };

    // unreadable metadata counts as absent
    let metadata: Json = if files.metadata {
        let path = mcp.join("metadata.json");
        match fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|s| serde_json::from_str(&s).map_err(|e| e.to_string()))
        {
            Ok(v) => v,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "ignoring unreadable metadata");
                Json::Null
            }
        }
    } else {
        Json::Null
    };
    let last_updated = meta_str(&metadata, "lastUpdated").or_else(|| meta_str(&metadata, "created"));

    let total = files.entries().len();
    let pct = (files.present() as f64 / total as f64 * 100.0).round() as u32;
    let (phase, current_task, next_steps) = phase_and_next_steps(&files, &metadata);

    Ok(ProjectStatus {
        has_project: true,
        project_path,
        phase,
        progress: format!("{}%", pct),
        last_updated,
        current_task: Some(current_task),
        next_steps,
        files,
    })
}

fn phase_label(phase: &str) -> String {
    match phase {
        "none" => "Not initialized".into(),
        "initialization" => "🏗️  Initialization".into(),
        "planning" => "📋 Planning".into(),
        "implementation" => "⚡ Implementation".into(),
        "testing" => "🧪 Testing".into(),
        "deployment" => "🚀 Deployment".into(),
        "complete" => "✅ Complete".into(),
        other => other.to_string(),
    }
}

/// Human-readable status report.
pub fn compose_status(status: &ProjectStatus, verbose: bool, color: bool) -> String {
    let bold = |s: &str| if color { s.bold().to_string() } else { s.to_string() };
    let mut out = String::from("\n📊 Project Status Report\n\n");

    if !status.has_project {
        out.push_str("⚠️  No mcp-devkit project found\n");
        out.push_str(&format!("   Checked: {}\n", status.project_path.display()));
    } else {
        let name = status
            .project_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        out.push_str(&format!("{} {}\n", bold("Project:"), name));
        out.push_str(&format!("{} {}\n", bold("Phase:"), phase_label(&status.phase)));
        out.push_str(&format!("{} {}\n", bold("Progress:"), status.progress));
        if let Some(updated) = &status.last_updated {
            out.push_str(&format!("{} {}\n", bold("Last Updated:"), updated));
        }
        if let Some(task) = &status.current_task {
            out.push_str(&format!("\n{}\n  Task: {}\n", bold("📋 Current Status:"), task));
        }

        out.push_str(&format!("\n{}\n", bold("📁 Project Files:")));
        for (name, path, present) in status.files.entries() {
            let (icon, state) = match (present, color) {
                (true, true) => ("✓".green().to_string(), "Complete".green().to_string()),
                (true, false) => ("✓".to_string(), "Complete".to_string()),
                (false, true) => ("✗".red().to_string(), "Pending".yellow().to_string()),
                (false, false) => ("✗".to_string(), "Pending".to_string()),
            };
            out.push_str(&format!("  {} {}: {}\n", icon, name, state));
            if verbose {
                out.push_str(&format!("     {}\n", path));
            }
        }
    }

    out.push_str(&format!("\n{}\n", bold("🎯 Next Steps:")));
    for (i, step) in status.next_steps.iter().enumerate() {
        out.push_str(&format!("  {}. {}\n", i + 1, step));
    }
    out
}

pub fn print_status(status: &ProjectStatus, json: bool, verbose: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(status)?);
    } else {
        let color = std::env::var_os("NO_COLOR").is_none();
        print!("{}", compose_status(status, verbose, color));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(root: &Path, rel: &str, content: &str) {
        let p = root.join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, content).unwrap();
    }

    #[test]
    fn test_no_project() {
        let dir = tempdir().unwrap();
        let st = check_project_status(dir.path()).unwrap();
        assert!(!st.has_project);
        assert_eq!(st.phase, "none");
        assert_eq!(st.progress, "0%");
        assert_eq!(st.files, ContextFiles::default());
        assert!(compose_status(&st, false, false).contains("No mcp-devkit project found"));
    }

    #[test]
    fn test_initialization_without_prd() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".mcp")).unwrap();
        let st = check_project_status(dir.path()).unwrap();
        assert!(st.has_project);
        assert_eq!(st.phase, "initialization");
        assert_eq!(st.progress, "0%");
        assert_eq!(st.current_task.as_deref(), Some("Complete project requirements"));
    }

    #[test]
    fn test_planning_phases() {
        let dir = tempdir().unwrap();
        touch(dir.path(), ".mcp/context_prd.md", "# PRD");
        let st = check_project_status(dir.path()).unwrap();
        assert_eq!(st.phase, "planning");
        assert_eq!(st.progress, "25%");
        assert_eq!(st.current_task.as_deref(), Some("Design system architecture"));

        touch(dir.path(), ".mcp/context_architecture.md", "# Arch");
        let st = check_project_status(dir.path()).unwrap();
        assert_eq!(st.phase, "planning");
        assert_eq!(st.progress, "50%");
        assert_eq!(st.current_task.as_deref(), Some("Break down development tasks"));
    }

    #[test]
    fn test_metadata_phase_and_task() {
        let dir = tempdir().unwrap();
        for f in ["context_prd.md", "context_architecture.md", "context_tasklist.md"] {
            touch(dir.path(), &format!(".mcp/{}", f), "# Doc");
        }
        let st = check_project_status(dir.path()).unwrap();
        assert_eq!(st.phase, "implementation");
        assert_eq!(st.progress, "75%");

        touch(
            dir.path(),
            ".mcp/metadata.json",
            r#"{"phase": "testing", "currentTask": "Write e2e tests", "created": "2024-01-01"}"#,
        );
        let st = check_project_status(dir.path()).unwrap();
        assert_eq!(st.phase, "testing");
        assert_eq!(st.progress, "100%");
        assert_eq!(st.current_task.as_deref(), Some("Write e2e tests"));
        assert_eq!(st.last_updated.as_deref(), Some("2024-01-01"));

        let v = serde_json::to_value(&st).unwrap();
        assert_eq!(v["hasProject"], true);
        assert_eq!(v["files"]["tasklist"], true);

        let text = compose_status(&st, true, false);
        assert!(text.contains("🧪 Testing"));
        assert!(text.contains("  ✓ Metadata: Complete"));
        assert!(text.contains("     .mcp/metadata.json"));
    }

    #[test]
    fn test_malformed_metadata_is_ignored() {
        let dir = tempdir().unwrap();
        for f in ["context_prd.md", "context_architecture.md", "context_tasklist.md"] {
            touch(dir.path(), &format!(".mcp/{}", f), "# Doc");
        }
        touch(dir.path(), ".mcp/metadata.json", "{ not json");
        let st = check_project_status(dir.path()).unwrap();
        assert_eq!(st.phase, "implementation");
        assert!(st.files.metadata);
        assert!(st.last_updated.is_none());
    }
}
