//! Tool configuration (`cargen.toml`).
//!
//! Every field is optional. Command-line flags override whatever the file
//! sets; the file overrides the built-in defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::merge::DEFAULT_RADIUS;
use crate::model::{FormatRevision, Game};

/// File name looked up in the current directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "cargen.toml";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level configuration.
///
/// Missing file → all defaults (no error).
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolConfig {
    /// Game whose savedata is being edited.
    #[serde(default)]
    pub game: Game,

    /// Aux-field layout of the car-generator records.
    #[serde(default)]
    pub revision: FormatRevision,

    /// Defaults for the `merge` command.
    #[serde(default)]
    pub merge: MergeSection,
}

// ---------------------------------------------------------------------------
// MergeSection
// ---------------------------------------------------------------------------

/// `[merge]` table.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergeSection {
    /// Collision radius in world units (default: 10.0).
    #[serde(default = "default_radius")]
    pub radius: f32,

    /// Discard every replacement when the pass hits a collision.
    #[serde(default)]
    pub atomic: bool,

    /// Priority list applied when `--priority-list` is not given.
    #[serde(default)]
    pub priority_list: Option<PathBuf>,

    /// Title stamped on the merged save.
    #[serde(default)]
    pub title: Option<String>,
}

impl Default for MergeSection {
    fn default() -> Self {
        Self {
            radius: default_radius(),
            atomic: false,
            priority_list: None,
            title: None,
        }
    }
}

const fn default_radius() -> f32 {
    DEFAULT_RADIUS
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Error loading a configuration file.
#[derive(Debug, Error)]
#[error("{}", display_config_error(.path.as_deref(), .message))]
pub struct ConfigError {
    /// The path that was being loaded (if available).
    pub path: Option<PathBuf>,
    /// Human-readable message with line-level detail when possible.
    pub message: String,
}

fn display_config_error(path: Option<&Path>, message: &str) -> String {
    match path {
        Some(p) => format!("{}: {message}", p.display()),
        None => format!("config error: {message}"),
    }
}

impl ToolConfig {
    /// Load configuration from a TOML file.
    ///
    /// A missing file yields the defaults. Invalid TOML or an unknown key is
    /// a [`ConfigError`] naming the offending line.
    ///
    /// # Errors
    /// Returns `ConfigError` on I/O errors (other than not-found) or parse errors.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::read(path, false)
    }

    /// Load a configuration file the user named explicitly.
    ///
    /// Same as [`ToolConfig::load`], except that a missing file is an error.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file is missing, unreadable or invalid.
    pub fn load_required(path: &Path) -> Result<Self, ConfigError> {
        Self::read(path, true)
    }

    fn read(path: &Path, required: bool) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError {
                    path: Some(path.to_owned()),
                    message: "file not found".to_owned(),
                });
            }
            Err(e) => {
                return Err(ConfigError {
                    path: Some(path.to_owned()),
                    message: format!("could not read file: {e}"),
                });
            }
        };
        Self::parse(&contents).map_err(|mut e| {
            e.path = Some(path.to_owned());
            e
        })
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `ConfigError` on invalid TOML or unknown fields.
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| {
            let mut message = e.message().to_owned();
            if let Some(span) = e.span() {
                let line = toml_str[..span.start]
                    .chars()
                    .filter(|&c| c == '\n')
                    .count()
                    + 1;
                message = format!("line {line}: {message}");
            }
            ConfigError {
                path: None,
                message,
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_all_fields() {
        let cfg = ToolConfig::default();
        assert_eq!(cfg.game, Game::Gta3);
        assert_eq!(cfg.revision, FormatRevision::Colors);
        assert!((cfg.merge.radius - 10.0).abs() < f32::EPSILON);
        assert!(!cfg.merge.atomic);
        assert_eq!(cfg.merge.priority_list, None);
        assert_eq!(cfg.merge.title, None);
    }

    #[test]
    fn parse_empty_string() {
        assert_eq!(ToolConfig::parse("").unwrap(), ToolConfig::default());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
game = "vc"
revision = "chances"

[merge]
radius = 2.5
atomic = true
priority_list = "priority.csv"
title = "Merged"
"#;
        let cfg = ToolConfig::parse(toml).unwrap();
        assert_eq!(cfg.game, Game::Vc);
        assert_eq!(cfg.revision, FormatRevision::Chances);
        assert!((cfg.merge.radius - 2.5).abs() < f32::EPSILON);
        assert!(cfg.merge.atomic);
        assert_eq!(
            cfg.merge.priority_list.as_deref(),
            Some(Path::new("priority.csv"))
        );
        assert_eq!(cfg.merge.title.as_deref(), Some("Merged"));
    }

    #[test]
    fn parse_partial_merge_table_uses_defaults() {
        let cfg = ToolConfig::parse("[merge]\natomic = true\n").unwrap();
        assert!(cfg.merge.atomic);
        assert!((cfg.merge.radius - DEFAULT_RADIUS).abs() < f32::EPSILON);
        assert_eq!(cfg.game, Game::Gta3);
    }

    #[test]
    fn parse_rejects_unknown_top_level_field() {
        let err = ToolConfig::parse("platform = \"pc\"\n").unwrap_err();
        assert!(err.message.contains("platform"), "{}", err.message);
    }

    #[test]
    fn parse_rejects_unknown_merge_field() {
        let err = ToolConfig::parse("[merge]\nradious = 3.0\n").unwrap_err();
        assert!(err.message.contains("radious"), "{}", err.message);
    }

    #[test]
    fn parse_rejects_unknown_game() {
        assert!(ToolConfig::parse("game = \"sa\"\n").is_err());
    }

    #[test]
    fn parse_includes_line_number_on_error() {
        let toml = "game = \"gta3\"\n[merge]\nradius = \"far\"\n";
        let err = ToolConfig::parse(toml).unwrap_err();
        assert!(err.message.contains("line 3"), "{}", err.message);
    }

    #[test]
    fn load_missing_file_returns_defaults() {
        let cfg = ToolConfig::load(Path::new("/nonexistent/cargen.toml")).unwrap();
        assert_eq!(cfg, ToolConfig::default());
    }

    #[test]
    fn load_required_rejects_missing_file() {
        let path = Path::new("/nonexistent/custom.toml");
        let err = ToolConfig::load_required(path).unwrap_err();
        assert_eq!(err.path.as_deref(), Some(path));
        assert_eq!(err.to_string(), "/nonexistent/custom.toml: file not found");
    }

    #[test]
    fn load_required_reads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "game = \"vc\"\n").unwrap();
        let cfg = ToolConfig::load_required(&path).unwrap();
        assert_eq!(cfg.game, Game::Vc);
    }

    #[test]
    fn load_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cargen.toml");
        std::fs::write(&path, "[merge]\ntitle = \"Portland\"\n").unwrap();
        let cfg = ToolConfig::load(&path).unwrap();
        assert_eq!(cfg.merge.title.as_deref(), Some("Portland"));
    }

    #[test]
    fn load_invalid_file_shows_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "not valid [[[toml").unwrap();
        let err = ToolConfig::load(&path).unwrap_err();
        assert_eq!(err.path.as_deref(), Some(path.as_path()));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn config_error_display_without_path() {
        let err = ConfigError {
            path: None,
            message: "parse error".to_owned(),
        };
        assert_eq!(err.to_string(), "config error: parse error");
    }
}
