//! File discovery by glob pattern.
//!
//! Relative patterns are resolved against the project root. Results are
//! files only, sorted by path, so the same tree always yields the same
//! sequence regardless of how the walk visited it.

use crate::error::{DevkitError, Result};
use glob::{glob_with, MatchOptions, Pattern};
use std::path::{Path, PathBuf};

fn match_options() -> MatchOptions {
    MatchOptions {
        case_sensitive: true,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    }
}

fn compile_excludes(exclude: &[String]) -> Result<Vec<Pattern>> {
    exclude
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|source| DevkitError::Pattern {
                pattern: p.clone(),
                source,
            })
        })
        .collect()
}

fn is_excluded(path: &Path, root: &Path, excludes: &[Pattern]) -> bool {
    if excludes.is_empty() {
        return false;
    }
    let rel = pathdiff::diff_paths(path, root).unwrap_or_else(|| path.to_path_buf());
    let opts = match_options();
    excludes
        .iter()
        .any(|p| p.matches_path_with(&rel, opts) || p.matches_path_with(path, opts))
}

/// Absolute paths of files matching `pattern` under `root`, minus `exclude`.
pub fn discover(pattern: &str, root: &Path, exclude: &[String]) -> Result<Vec<PathBuf>> {
    // the root is a literal path; only the caller's pattern carries glob syntax
    let abs_pattern = if Path::new(pattern).is_absolute() {
        pattern.to_string()
    } else {
        let escaped_root = PathBuf::from(Pattern::escape(&root.to_string_lossy()));
        escaped_root.join(pattern).to_string_lossy().to_string()
    };
    let excludes = compile_excludes(exclude)?;

    let entries = glob_with(&abs_pattern, match_options()).map_err(|source| {
        DevkitError::Pattern {
            pattern: abs_pattern.clone(),
            source,
        }
    })?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry?;
        if !path.is_file() || is_excluded(&path, root, &excludes) {
            continue;
        }
        files.push(path);
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(root: &Path, rel: &str) {
        let p = root.join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, "x").unwrap();
    }

    fn rels(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_recursive_match_sorted_files_only() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(root, ".mcp/b.md");
        touch(root, ".mcp/a.md");
        touch(root, ".mcp/nested/c.md");
        touch(root, ".mcp/notes.txt");
        fs::create_dir_all(root.join(".mcp/dir.md")).unwrap();
        let files = discover(".mcp/**/*.md", root, &[]).unwrap();
        assert_eq!(
            rels(root, &files),
            vec![".mcp/a.md", ".mcp/b.md", ".mcp/nested/c.md"]
        );
        assert!(files.iter().all(|f| f.is_absolute()));
    }

    #[test]
    fn test_exclude_patterns() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(root, ".mcp/keep.md");
        touch(root, ".mcp/drafts/skip.md");
        let files = discover(".mcp/**/*.md", root, &["**/drafts/**".to_string()]).unwrap();
        assert_eq!(rels(root, &files), vec![".mcp/keep.md"]);
    }

    #[test]
    fn test_root_with_glob_metacharacters() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("proj[1]");
        touch(&root, ".mcp/a.md");
        touch(&root, ".mcp/drafts/b.md");
        let files = discover(".mcp/**/*.md", &root, &[]).unwrap();
        assert_eq!(rels(&root, &files), vec![".mcp/a.md", ".mcp/drafts/b.md"]);

        let files = discover(".mcp/**/*.md", &root, &["**/drafts/**".to_string()]).unwrap();
        assert_eq!(rels(&root, &files), vec![".mcp/a.md"]);
    }

    #[test]
    fn test_no_match_is_empty() {
        let dir = tempdir().unwrap();
        let files = discover(".mcp/**/*.md", dir.path(), &[]).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_bad_pattern_errors() {
        let dir = tempdir().unwrap();
        assert!(discover("[", dir.path(), &[]).is_err());
        assert!(discover("*.md", dir.path(), &["[".to_string()]).is_err());
    }
}
