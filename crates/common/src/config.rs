//! Editor configuration: history depth, section and duplicate defaults, autosave timing.

use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::types::AspectRatio;

/// Shortest duration a freshly added section may get, in seconds.
pub const MIN_DEFAULT_SECTION_SECS: f64 = 1.0;

/// Editor session configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Maximum entries on each history stack. Oldest undo entries are evicted first.
    pub history_limit: usize,
    /// Duration given to new sections (seconds). Floored at one second.
    pub default_section_duration: f64,
    /// Offset applied to duplicated elements, in canvas percent on both axes.
    pub duplicate_offset: f32,
    /// How often a dirty template becomes due for autosave.
    pub autosave_interval_secs: u32,
    /// Aspect ratio given to new templates.
    pub default_aspect_ratio: AspectRatio,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: 50,
            default_section_duration: 5.0,
            duplicate_offset: 5.0,
            autosave_interval_secs: 60,
            default_aspect_ratio: AspectRatio::Portrait,
        }
    }
}

impl EditorConfig {
    /// Parse a JSON config. Missing keys keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    /// Load a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        debug!(path = %path.display(), ?config, "Editor config loaded");
        Ok(config)
    }

    /// Apply `TRENDZO_*` environment overrides. Unparseable values are ignored.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(limit) = parse_var(&lookup, "TRENDZO_HISTORY_LIMIT") {
            self.history_limit = limit;
        }
        if let Some(secs) = parse_var(&lookup, "TRENDZO_SECTION_DURATION") {
            self.default_section_duration = secs;
        }
        if let Some(secs) = parse_var(&lookup, "TRENDZO_AUTOSAVE_SECS") {
            self.autosave_interval_secs = secs;
        }
        self.sanitized()
    }

    /// Section duration actually used for new sections.
    pub fn section_duration(&self) -> f64 {
        if self.default_section_duration.is_finite() {
            self.default_section_duration.max(MIN_DEFAULT_SECTION_SECS)
        } else {
            MIN_DEFAULT_SECTION_SECS
        }
    }

    fn sanitized(mut self) -> Self {
        self.default_section_duration = self.section_duration();
        if !self.duplicate_offset.is_finite() {
            self.duplicate_offset = 0.0;
        }
        self
    }
}

fn parse_var<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparseable config override");
            None
        }
    }
}
