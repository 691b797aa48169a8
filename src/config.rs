//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/btedit/btedit.toml`
//! 3. Local config: `<dir>/.btedit.toml` (working directory by default)
//! 4. Environment variables: `BTEDIT_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::{ApplicationError, Format};
use crate::domain::TidyLayout;

/// Spacing used by the default tree layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    /// Horizontal distance between neighbouring leaves
    pub sibling_spacing: f64,
    /// Vertical distance between tree levels
    pub level_spacing: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let tidy = TidyLayout::default();
        Self {
            sibling_spacing: tidy.sibling_spacing,
            level_spacing: tidy.level_spacing,
        }
    }
}

impl From<&LayoutConfig> for TidyLayout {
    fn from(cfg: &LayoutConfig) -> Self {
        Self {
            sibling_spacing: cfg.sibling_spacing,
            level_spacing: cfg.level_spacing,
        }
    }
}

/// Raw layout config for intermediate parsing (None = not specified).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawLayoutConfig {
    pub sibling_spacing: Option<f64>,
    pub level_spacing: Option<f64>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub format: Option<Format>,
    pub default_file: Option<PathBuf>,
    pub layout: RawLayoutConfig,
}

/// Unified configuration for btedit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Codec used when neither the command line nor the file extension decide
    pub format: Format,
    /// Tree document used when no file is given on the command line
    pub default_file: Option<PathBuf>,
    /// Layout spacing
    pub layout: LayoutConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            format: Format::Json,
            default_file: None,
            layout: LayoutConfig::default(),
        }
    }
}

/// Get the XDG config directory for btedit.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "btedit").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("btedit.toml"))
}

/// Get the path to the local config file in `dir`.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".btedit.toml")
}

/// Expand `~`, `$VAR` and `${VAR}`; leaves the input alone if expansion fails.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins where it specifies a value, otherwise keep self.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            format: overlay.format.unwrap_or(self.format),
            default_file: overlay
                .default_file
                .clone()
                .or_else(|| self.default_file.clone()),
            layout: LayoutConfig {
                sibling_spacing: overlay
                    .layout
                    .sibling_spacing
                    .unwrap_or(self.layout.sibling_spacing),
                level_spacing: overlay
                    .layout
                    .level_spacing
                    .unwrap_or(self.layout.level_spacing),
            },
        }
    }

    fn expand_paths(&mut self) {
        self.default_file = self.default_file.as_deref().map(expand_path);
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Directory holding `.btedit.toml`; the working directory if None
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/btedit/btedit.toml`
    /// 3. Local config: `<local_dir>/.btedit.toml`
    /// 4. Environment variables: `BTEDIT_*` prefix, `__` separates sections
    ///    (`BTEDIT_LAYOUT__LEVEL_SPACING=100`)
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("global config: {}", global_path.display());
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        let local_dir = match local_dir {
            Some(dir) => Some(dir.to_path_buf()),
            None => std::env::current_dir().ok(),
        };
        if let Some(dir) = local_dir {
            let local_path = local_config_path(&dir);
            if local_path.exists() {
                debug!("local config: {}", local_path.display());
                current = current.merge_with(&load_raw_settings(&local_path)?);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();
        Ok(current)
    }

    /// Apply BTEDIT_* environment variables as explicit overrides.
    ///
    /// A single `_` follows the prefix, nested keys use `__`.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("BTEDIT")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("format") {
            settings.format = val
                .parse()
                .map_err(|message| ApplicationError::Config { message })?;
        }
        if let Ok(val) = config.get_string("default_file") {
            settings.default_file = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_float("layout.sibling_spacing") {
            settings.layout.sibling_spacing = val;
        }
        if let Ok(val) = config.get_float("layout.level_spacing") {
            settings.layout.level_spacing = val;
        }
        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# btedit configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/btedit/btedit.toml
#   Local:  ./.btedit.toml
#   Env:    BTEDIT_* environment variables (BTEDIT_LAYOUT__LEVEL_SPACING=100)

# Document format when the file extension does not tell: "json" or "toml"
# format = "json"

# Tree document used when --file is not given
# default_file = "~/behaviors/main.json"

[layout]
# Horizontal distance between neighbouring leaves
# sibling_spacing = 120.0

# Vertical distance between tree levels
# level_spacing = 80.0
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_defaults_then_json_and_tidy_spacing() {
        let settings = Settings::default();
        assert_eq!(settings.format, Format::Json);
        assert_eq!(settings.default_file, None);
        assert_eq!(TidyLayout::from(&settings.layout), TidyLayout::default());
    }

    #[test]
    fn given_partial_overlay_when_merging_then_only_given_fields_change() {
        let overlay: RawSettings = toml::from_str(
            r#"
format = "toml"
[layout]
level_spacing = 42.0
"#,
        )
        .unwrap();
        let merged = Settings::default().merge_with(&overlay);
        assert_eq!(merged.format, Format::Toml);
        assert_eq!(merged.layout.level_spacing, 42.0);
        assert_eq!(merged.layout.sibling_spacing, 120.0);
    }

    #[test]
    fn given_tilde_in_default_file_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            default_file: Some(PathBuf::from("~/trees/main.json")),
            ..Settings::default()
        };
        settings.expand_paths();
        let home = std::env::var("HOME").expect("HOME should be set");
        let path = settings.default_file.unwrap();
        assert!(
            path.to_string_lossy().starts_with(&home),
            "default_file should start with home dir: {}",
            path.display()
        );
    }

    #[test]
    fn given_template_then_parses_as_empty_overlay() {
        let raw: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert!(raw.format.is_none());
        assert!(raw.layout.level_spacing.is_none());
    }

    #[test]
    fn given_settings_then_toml_round_trips() {
        let settings = Settings::default();
        let text = settings.to_toml().unwrap();
        let back: Settings = toml::from_str(&text).unwrap();
        assert_eq!(back, settings);
    }
}
