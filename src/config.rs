//! Engine tuning, loaded from TOML.
//!
//! Every field has a default, so an empty document (or a missing file) gives
//! the stock behaviour.

use crate::error::{CadenceError, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub gesture: GestureConfig,
    pub auto_scroll: AutoScrollConfig,
    pub placement: PlacementConfig,
}

/// Drag gesture recognition
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Hold time before a press turns into a drag
    pub long_press_ms: u64,
    /// Travel allowed for a press to still count as a tap
    pub tap_max_distance: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            long_press_ms: 500,
            tap_max_distance: 8.0,
        }
    }
}

impl GestureConfig {
    pub fn long_press(&self) -> Duration {
        Duration::from_millis(self.long_press_ms)
    }
}

/// Edge-triggered scrolling while dragging
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AutoScrollConfig {
    pub horizontal_edge_threshold: f32,
    pub vertical_edge_threshold: f32,
    /// Pixels per tick at full intensity
    pub scroll_speed: f32,
    /// Minimum time between two scroll commands on one axis
    pub scroll_interval_ms: u64,
    /// Half the dragged card's width; horizontal edges trigger on the card's edge
    pub overlay_half_width: f32,
}

impl Default for AutoScrollConfig {
    fn default() -> Self {
        Self {
            horizontal_edge_threshold: 80.0,
            vertical_edge_threshold: 60.0,
            scroll_speed: 24.0,
            scroll_interval_ms: 16,
            overlay_half_width: 160.0,
        }
    }
}

impl AutoScrollConfig {
    pub fn scroll_interval(&self) -> Duration {
        Duration::from_millis(self.scroll_interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Project that receives quick-created tasks
    pub default_project_name: String,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            default_project_name: "General".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).map_err(|e| CadenceError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads the config file, falling back to defaults when it does not exist
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let contents = tokio::fs::read_to_string(path).await?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        let scroll = &self.auto_scroll;
        if scroll.horizontal_edge_threshold <= 0.0 || scroll.vertical_edge_threshold <= 0.0 {
            return Err(CadenceError::ConfigError(
                "auto_scroll edge thresholds must be positive".to_string(),
            ));
        }
        if scroll.scroll_interval_ms == 0 {
            return Err(CadenceError::ConfigError(
                "auto_scroll.scroll_interval_ms must be positive".to_string(),
            ));
        }
        if scroll.scroll_speed < 0.0 || scroll.overlay_half_width < 0.0 {
            return Err(CadenceError::ConfigError(
                "auto_scroll speed and overlay width cannot be negative".to_string(),
            ));
        }
        if self.gesture.long_press_ms == 0 {
            return Err(CadenceError::ConfigError(
                "gesture.long_press_ms must be positive".to_string(),
            ));
        }
        if self.placement.default_project_name.trim().is_empty() {
            return Err(CadenceError::ConfigError(
                "placement.default_project_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.gesture.long_press(), Duration::from_millis(500));
        assert_eq!(config.placement.default_project_name, "General");
    }

    #[test]
    fn test_partial_override() {
        let config = EngineConfig::from_toml_str(
            r#"
            [auto_scroll]
            scroll_speed = 40.0

            [placement]
            default_project_name = "Inbox"
            "#,
        )
        .unwrap();
        assert_eq!(config.auto_scroll.scroll_speed, 40.0);
        assert_eq!(config.auto_scroll.horizontal_edge_threshold, 80.0);
        assert_eq!(config.placement.default_project_name, "Inbox");
    }

    #[test]
    fn test_zero_interval_rejected() {
        let err = EngineConfig::from_toml_str("[auto_scroll]\nscroll_interval_ms = 0\n").unwrap_err();
        assert!(matches!(err, CadenceError::ConfigError(_)));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        assert!(EngineConfig::from_toml_str("[gesture\nlong_press_ms = ").is_err());
    }

    #[tokio::test]
    async fn test_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = EngineConfig::load(temp_dir.path().join("cadence.toml"))
            .await
            .unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cadence.toml");
        tokio::fs::write(&path, "[gesture]\nlong_press_ms = 350\n")
            .await
            .unwrap();
        let config = EngineConfig::load(&path).await.unwrap();
        assert_eq!(config.gesture.long_press_ms, 350);
    }
}
