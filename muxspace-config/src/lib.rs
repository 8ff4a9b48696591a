//! Configuration system for the muxspace workspace core.
//!
//! A pure data crate: no knowledge of panels, panes, or the split tree.
//! Provides the [`Config`] struct with YAML persistence, semantic
//! validation, and the tuning constants the core falls back to.

pub mod constants;
mod error;

pub use error::ConfigError;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Workspace-core configuration.
///
/// All fields have serde defaults so a partial (or empty) config file loads
/// cleanly; unknown fields are ignored to stay forward compatible.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Whether closing a surface with a running job / dirty state prompts
    /// for confirmation.
    pub confirm_close_running: bool,

    /// Grace window in milliseconds before refocusing the same panel may
    /// clear its manual-unread badge.
    pub unread_clear_grace_ms: u64,

    /// Number of scheduler turns to re-assert focus after a non-focusing
    /// split.
    pub focus_reassert_turns: u8,

    /// Iteration cap for selection / controller-event drain loops.
    pub selection_drain_cap: u8,

    /// Tolerance in points between a font-size lineage root and the live
    /// runtime value before a manual zoom re-roots the lineage.
    pub font_root_tolerance: f32,

    /// Default terminal font size used when no inheritance source resolves.
    pub default_font_size: f32,

    /// Maximum number of surfaces per workspace. 0 means unlimited.
    pub max_surfaces: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            confirm_close_running: true,
            unread_clear_grace_ms: constants::DEFAULT_UNREAD_CLEAR_GRACE_MS,
            focus_reassert_turns: constants::DEFAULT_FOCUS_REASSERT_TURNS,
            selection_drain_cap: constants::DEFAULT_SELECTION_DRAIN_CAP,
            font_root_tolerance: constants::DEFAULT_FONT_ROOT_TOLERANCE,
            default_font_size: constants::DEFAULT_FONT_SIZE,
            max_surfaces: 0,
        }
    }
}

impl Config {
    /// Default config file path: `<config_dir>/muxspace/config.yaml`.
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join("muxspace").join("config.yaml"))
    }

    /// Load configuration from the default path, falling back to defaults
    /// if the file does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load configuration from an explicit path.
    ///
    /// A missing file is not an error: defaults are returned so first-run
    /// hosts work without any on-disk state.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("no config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path).map_err(ConfigError::Io)?;
        let config: Self = serde_yaml_ng::from_str(&text).map_err(ConfigError::Parse)?;
        config.validate()?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Save configuration to an explicit path, creating parent directories
    /// as needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        let text = serde_yaml_ng::to_string(self).map_err(ConfigError::Parse)?;
        fs::write(path, text).map_err(ConfigError::Io)?;
        Ok(())
    }

    /// Semantic validation of field values.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.selection_drain_cap == 0 {
            return Err(ConfigError::Validation(
                "selection_drain_cap must be at least 1".into(),
            ));
        }
        if self.focus_reassert_turns == 0 {
            return Err(ConfigError::Validation(
                "focus_reassert_turns must be at least 1".into(),
            ));
        }
        if !self.font_root_tolerance.is_finite() || self.font_root_tolerance < 0.0 {
            return Err(ConfigError::Validation(
                "font_root_tolerance must be a non-negative finite value".into(),
            ));
        }
        if !self.default_font_size.is_finite() || self.default_font_size <= 0.0 {
            return Err(ConfigError::Validation(
                "default_font_size must be a positive finite value".into(),
            ));
        }
        Ok(())
    }
}
