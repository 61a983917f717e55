use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Result, TimelineError};

/// Top-level configuration structure for the editor engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub zoom: ZoomConfig,
    pub ruler: RulerConfig,
    pub history: HistoryConfig,
    pub render: RenderConfig,
}

impl EditorConfig {
    /// Reads a JSON config file. Missing sections fall back to defaults.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        tracing::debug!(?path, "loaded editor config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let zoom = &self.zoom;
        if !(zoom.min > 0.0 && zoom.max.is_finite() && zoom.min <= zoom.max) {
            return Err(TimelineError::InvalidInput(
                "zoom bounds must satisfy 0 < min <= max",
            ));
        }
        if !(zoom.min..=zoom.max).contains(&zoom.default) {
            return Err(TimelineError::InvalidInput(
                "default zoom must lie within the zoom bounds",
            ));
        }
        if !(zoom.pixels_per_second > 0.0 && zoom.pixels_per_second.is_finite()) {
            return Err(TimelineError::InvalidInput(
                "pixels per second must be positive",
            ));
        }
        let ruler = &self.ruler;
        if ![ruler.show_10s, ruler.show_5s, ruler.show_1s, ruler.show_frames]
            .iter()
            .all(|threshold| threshold.is_finite())
        {
            return Err(TimelineError::InvalidInput(
                "ruler thresholds must be finite",
            ));
        }
        if self.ruler.frame_rate == 0 || self.render.frame_rate == 0 {
            return Err(TimelineError::InvalidInput("frame rate must be non-zero"));
        }
        if self.history.max_snapshots == 0 {
            return Err(TimelineError::InvalidInput(
                "history must keep at least one snapshot",
            ));
        }
        Ok(())
    }
}

/// Zoom bounds and the pixel scale at zoom 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub pixels_per_second: f64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min: 0.1,
            max: 20.0,
            default: 1.0,
            pixels_per_second: 100.0,
        }
    }
}

/// Tick tier thresholds and generation limits for the time ruler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulerConfig {
    pub frame_rate: u32,
    pub show_10s: f64,
    pub show_5s: f64,
    pub show_1s: f64,
    pub show_frames: f64,
    pub max_ticks_per_tier: usize,
    /// Extra intervals generated on each side of the viewport for culled tiers.
    pub overscan_intervals: u32,
}

impl Default for RulerConfig {
    fn default() -> Self {
        Self {
            frame_rate: 30,
            show_10s: 1.0,
            show_5s: 2.5,
            show_1s: 5.0,
            show_frames: 10.0,
            max_ticks_per_tier: 10_000,
            overscan_intervals: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Size of the undo window.
    pub max_snapshots: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_snapshots: 100 }
    }
}

/// Output settings written into the render manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            frame_rate: 30,
        }
    }
}
