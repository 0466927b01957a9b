use screenplay_engine::{AnchorSettings, BlockType, PlacementSettings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid value for {field} in config file at {config_path}: {value}")]
    ConfigValueError {
        config_path: PathBuf,
        field: &'static str,
        value: f64,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub editor: EditorConfig,
    pub popup: PopupConfig,
    pub anchor: AnchorConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Type of the first block of a new document
    pub opening_block: BlockType,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            opening_block: BlockType::SceneHeading,
        }
    }
}

/// Popup size estimate and placement margins, in surface units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopupConfig {
    pub gap: f64,
    pub viewport_inset: f64,
    pub row_height: f64,
    pub width: f64,
}

impl Default for PopupConfig {
    fn default() -> Self {
        let placement = PlacementSettings::default();
        Self {
            gap: placement.gap,
            viewport_inset: placement.viewport_inset,
            row_height: 26.0,
            width: 220.0,
        }
    }
}

impl PopupConfig {
    pub fn placement(&self) -> PlacementSettings {
        PlacementSettings {
            gap: self.gap,
            viewport_inset: self.viewport_inset,
        }
    }

    /// Estimated popup height for `rows` options
    pub fn height_for(&self, rows: usize) -> f64 {
        self.row_height * rows as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
    pub tolerance: f64,
    pub line_height: f64,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        let settings = AnchorSettings::default();
        Self {
            tolerance: settings.tolerance,
            line_height: settings.line_height,
        }
    }
}

impl AnchorConfig {
    pub fn settings(&self) -> AnchorSettings {
        AnchorSettings {
            tolerance: self.tolerance,
            line_height: self.line_height,
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        if let Some((field, value)) = config.non_finite_value() {
            return Err(ConfigError::ConfigValueError {
                config_path: config_path.to_path_buf(),
                field,
                value,
            });
        }

        Ok(Some(config))
    }

    /// First geometry setting that is NaN or infinite
    fn non_finite_value(&self) -> Option<(&'static str, f64)> {
        [
            ("popup.gap", self.popup.gap),
            ("popup.viewport_inset", self.popup.viewport_inset),
            ("popup.row_height", self.popup.row_height),
            ("popup.width", self.popup.width),
            ("anchor.tolerance", self.anchor.tolerance),
            ("anchor.line_height", self.anchor.line_height),
        ]
        .into_iter()
        .find(|(_, value)| !value.is_finite())
    }

    /// Load from `config_path`, or the default location when `None`. A
    /// missing file yields the defaults.
    pub fn load_or_default(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match config_path {
            Some(path) => Self::expand_path(path).unwrap_or_else(|| path.to_path_buf()),
            None => Self::config_path(),
        };
        Ok(Self::load_from_path(&config_path)?.unwrap_or_default())
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/screenplay-editor");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Expand `~` and environment variables in a user-supplied path
    pub fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
