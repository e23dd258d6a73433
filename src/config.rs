//! Configuration discovery and effective settings resolution.
//!
//! mcp-devkit reads `mcp-devkit.toml|yaml|yml` from the project root (or the
//! closest ancestor) and merges its `[validate]` section with CLI flags to
//! produce an `Effective` config.
//! Defaults:
//! - `format`: `table`
//! - `pattern`: `.mcp/**/*.md`
//! - `schemas`: `.mcp/schemas`
//! - `strict|fix`: false, `parallel`: true
//! - `rules`: all, `exclude`: none
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::error::{DevkitError, Result};
use crate::validator::{ValidationOptions, METADATA_DIR, PROJECT_PATTERN};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const CONFIG_FILES: [&str; 3] = ["mcp-devkit.toml", "mcp-devkit.yaml", "mcp-devkit.yml"];
const DEFAULT_SCHEMAS: &str = ".mcp/schemas";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Report renderer selection.
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Markdown,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
            OutputFormat::Markdown => "markdown",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!(
                "unknown format '{}' (expected table|json|markdown)",
                other
            )),
        }
    }
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Validation section under `[validate]`.
pub struct ValidateCfg {
    pub strict: Option<bool>,
    pub format: Option<String>,
    pub rules: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
    pub parallel: Option<bool>,
    pub fix: Option<bool>,
    pub pattern: Option<String>,
    /// Schema directory, relative to the project root.
    pub schemas: Option<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `mcp-devkit.toml|yaml`.
pub struct DevkitConfig {
    #[serde(default)]
    pub validate: Option<ValidateCfg>,
}

/// CLI-provided values; `None` means "not given on the command line".
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub strict: Option<bool>,
    pub format: Option<OutputFormat>,
    pub rules: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
    pub parallel: Option<bool>,
    pub fix: Option<bool>,
    pub pattern: Option<String>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by `validate` after applying precedence.
pub struct Effective {
    pub project_root: PathBuf,
    pub config_path: Option<PathBuf>,
    pub format: OutputFormat,
    pub pattern: String,
    pub schema_dir: PathBuf,
    pub options: ValidationOptions,
}

/// Config file present directly in `dir`, in lookup order.
pub fn config_file_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
}

/// Walk upward from `start` to detect the project root.
///
/// Stops at the first directory holding a config file, a `.mcp` directory
/// or `.git`; falls back to `start`.
pub fn detect_project_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if config_file_in(cur).is_some()
            || cur.join(METADATA_DIR).is_dir()
            || cur.join(".git").exists()
        {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `DevkitConfig` from `root`, if a config file is present.
///
/// A present but unreadable or malformed file is an error.
pub fn load_config(root: &Path) -> Result<Option<(PathBuf, DevkitConfig)>> {
    let Some(path) = config_file_in(root) else {
        return Ok(None);
    };
    let text = fs::read_to_string(&path).map_err(|e| DevkitError::io(&path, e))?;
    let fail = |message: String| DevkitError::Config {
        path: path.clone(),
        message,
    };
    let is_toml = path.extension().and_then(|e| e.to_str()) == Some("toml");
    let cfg: DevkitConfig = if is_toml {
        toml::from_str(&text).map_err(|e| fail(e.to_string()))?
    } else {
        serde_yaml::from_str(&text).map_err(|e| fail(e.to_string()))?
    };
    Ok(Some((path, cfg)))
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
///
/// `project_root` is validated as given; config is looked up by walking
/// upward from it.
pub fn resolve_effective(project_root: &Path, cli: CliOverrides) -> Result<Effective> {
    let config_root = detect_project_root(project_root);
    let loaded = load_config(&config_root)?;
    let (config_path, cfg) = match loaded {
        Some((p, c)) => (Some(p), c.validate.unwrap_or_default()),
        None => (None, ValidateCfg::default()),
    };

    let format = match cli.format {
        Some(f) => f,
        None => match cfg.format.as_deref() {
            Some(s) => s.parse().map_err(|message| DevkitError::Config {
                path: config_path.clone().unwrap_or_default(),
                message,
            })?,
            None => OutputFormat::default(),
        },
    };

    let pattern = cli
        .pattern
        .or(cfg.pattern)
        .unwrap_or_else(|| PROJECT_PATTERN.to_string());

    let schemas = cfg.schemas.unwrap_or_else(|| DEFAULT_SCHEMAS.to_string());
    let schema_dir = if Path::new(&schemas).is_absolute() {
        PathBuf::from(schemas)
    } else {
        config_root.join(schemas)
    };

    let defaults = ValidationOptions::default();
    let rules = cli.rules.filter(|r| !r.is_empty()).or(cfg.rules);
    let options = ValidationOptions {
        strict: cli.strict.or(cfg.strict).unwrap_or(defaults.strict),
        rules,
        exclude: cli.exclude.or(cfg.exclude).unwrap_or(defaults.exclude),
        parallel: cli.parallel.or(cfg.parallel).unwrap_or(defaults.parallel),
        fix: cli.fix.or(cfg.fix).unwrap_or(defaults.fix),
    };

    Ok(Effective {
        project_root: project_root.to_path_buf(),
        config_path,
        format,
        pattern,
        schema_dir,
        options,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_detect_root_stops_at_mcp_dir() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join(".mcp")).unwrap();
        let nested = root.join("src/deep");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(detect_project_root(&nested), root.to_path_buf());
    }

    #[test]
    fn test_detect_root_prefers_nearest_config() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join(".git")).unwrap();
        let pkg = root.join("pkg");
        fs::create_dir_all(&pkg).unwrap();
        fs::write(pkg.join("mcp-devkit.toml"), "").unwrap();
        assert_eq!(detect_project_root(&pkg), pkg);
        assert_eq!(detect_project_root(root), root.to_path_buf());
    }

    #[test]
    fn test_defaults_without_config() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".git")).unwrap();
        let eff = resolve_effective(dir.path(), CliOverrides::default()).unwrap();
        assert!(eff.config_path.is_none());
        assert_eq!(eff.format, OutputFormat::Table);
        assert_eq!(eff.pattern, ".mcp/**/*.md");
        assert_eq!(eff.schema_dir, dir.path().join(".mcp/schemas"));
        assert!(!eff.options.strict);
        assert!(eff.options.parallel);
        assert!(eff.options.rules.is_none());
    }

    #[test]
    fn test_toml_config_and_cli_precedence() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("mcp-devkit.toml"),
            r#"
[validate]
strict = true
format = "markdown"
rules = ["markdown"]
exclude = ["**/drafts/**"]
parallel = false
pattern = "docs/**/*.md"
schemas = "schemas"
"#,
        )
        .unwrap();

        let eff = resolve_effective(dir.path(), CliOverrides::default()).unwrap();
        assert_eq!(eff.format, OutputFormat::Markdown);
        assert!(eff.options.strict);
        assert!(!eff.options.parallel);
        assert_eq!(eff.options.rules.as_deref(), Some(&["markdown".to_string()][..]));
        assert_eq!(eff.options.exclude, vec!["**/drafts/**"]);
        assert_eq!(eff.pattern, "docs/**/*.md");
        assert_eq!(eff.schema_dir, dir.path().join("schemas"));

        let eff = resolve_effective(
            dir.path(),
            CliOverrides {
                format: Some(OutputFormat::Json),
                strict: Some(false),
                rules: Some(vec!["schema".into()]),
                pattern: Some("*.md".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(eff.format, OutputFormat::Json);
        assert!(!eff.options.strict);
        assert_eq!(eff.options.rules.as_deref(), Some(&["schema".to_string()][..]));
        assert_eq!(eff.pattern, "*.md");
        // untouched by the CLI, still from config
        assert!(!eff.options.parallel);
    }

    #[test]
    fn test_yaml_config() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("mcp-devkit.yaml"),
            "validate:\n  format: json\n  fix: true\n",
        )
        .unwrap();
        let eff = resolve_effective(dir.path(), CliOverrides::default()).unwrap();
        assert_eq!(eff.format, OutputFormat::Json);
        assert!(eff.options.fix);
    }

    #[test]
    fn test_malformed_config_is_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("mcp-devkit.toml"), "[validate\nstrict = ").unwrap();
        let err = resolve_effective(dir.path(), CliOverrides::default()).unwrap_err();
        assert!(matches!(err, DevkitError::Config { .. }));

        fs::write(
            dir.path().join("mcp-devkit.toml"),
            "[validate]\nformat = \"xml\"\n",
        )
        .unwrap();
        let err = resolve_effective(dir.path(), CliOverrides::default()).unwrap_err();
        assert!(err.to_string().contains("unknown format"));
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
