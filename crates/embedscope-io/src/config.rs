use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How the engine decides between overview and labelled detail.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum LodRule {
    /// Detail once at most `label_threshold` points are visible.
    PointCount { label_threshold: usize },
    /// Detail once the zoom factor passes `zoom_start_threshold`. The visible
    /// count is unbounded here; `max_detail_labels` caps what is fetched.
    ZoomFactor { zoom_start_threshold: f64 },
}

impl Default for LodRule {
    fn default() -> Self {
        LodRule::PointCount {
            label_threshold: 15,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tunables of the explorer. Every field has a default, so a partial JSON
/// file only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    pub api_base_url: String,
    pub point_size: f32,
    pub lod_rule: LodRule,
    /// Characters kept from a label before it is cut with an ellipsis.
    pub label_char_budget: usize,
    pub label_debounce_ms: u64,
    /// Quiet period before the camera is written to the location.
    pub persist_debounce_ms: u64,
    pub resize_debounce_ms: u64,
    pub error_dismiss_ms: u64,
    pub transition_duration_ms: u64,
    pub zoom_padding: f64,
    /// Point opacity while labels are shown.
    pub detail_point_opacity: f32,
    /// Most points labelled at once in detail mode, lowest indices first.
    pub max_detail_labels: usize,
    pub cluster_count: usize,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000/api".to_string(),
            point_size: 3.0,
            lod_rule: LodRule::default(),
            label_char_budget: 100,
            label_debounce_ms: 200,
            persist_debounce_ms: 1000,
            resize_debounce_ms: 100,
            error_dismiss_ms: 5000,
            transition_duration_ms: 1000,
            zoom_padding: 0.2,
            detail_point_opacity: 0.0,
            max_detail_labels: 200,
            cluster_count: 8,
        }
    }
}

impl ExplorerConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        log::info!("Loaded explorer config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.lod_rule {
            LodRule::PointCount { label_threshold: 0 } => {
                return Err(ConfigError::Invalid("label_threshold must be at least 1".into()));
            }
            LodRule::ZoomFactor {
                zoom_start_threshold,
            } if !(zoom_start_threshold.is_finite() && zoom_start_threshold > 0.0) => {
                return Err(ConfigError::Invalid(format!(
                    "zoom_start_threshold must be positive, got {zoom_start_threshold}"
                )));
            }
            _ => {}
        }
        if !(self.point_size.is_finite() && self.point_size > 0.0) {
            return Err(ConfigError::Invalid("point_size must be positive".into()));
        }
        if self.label_char_budget == 0 {
            return Err(ConfigError::Invalid("label_char_budget must be at least 1".into()));
        }
        if self.error_dismiss_ms == 0 {
            return Err(ConfigError::Invalid("error_dismiss_ms must be positive".into()));
        }
        if !(self.zoom_padding.is_finite() && self.zoom_padding >= 0.0) {
            return Err(ConfigError::Invalid("zoom_padding must be non-negative".into()));
        }
        if !(0.0..=1.0).contains(&self.detail_point_opacity) {
            return Err(ConfigError::Invalid("detail_point_opacity must be in [0, 1]".into()));
        }
        if self.max_detail_labels == 0 {
            return Err(ConfigError::Invalid("max_detail_labels must be at least 1".into()));
        }
        if self.cluster_count == 0 {
            return Err(ConfigError::Invalid("cluster_count must be at least 1".into()));
        }
        Ok(())
    }
}
