//! Zoom-adaptive time ruler.
//!
//! Tiers are cumulative: every tier whose threshold is at or below the
//! current zoom is generated, the 30 second tier always. Ticks landing on a
//! multiple of 30 seconds belong to the 30 second tier only.

use serde::{Deserialize, Serialize};

use crate::config::RulerConfig;

const MAJOR_INTERVAL: f64 = 30.0;
const MAJOR_TOLERANCE: f64 = 0.001;
const EDGE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickTier {
    ThirtySeconds,
    TenSeconds,
    FiveSeconds,
    OneSecond,
    Frame,
}

impl TickTier {
    pub const ALL: [TickTier; 5] = [
        TickTier::ThirtySeconds,
        TickTier::TenSeconds,
        TickTier::FiveSeconds,
        TickTier::OneSecond,
        TickTier::Frame,
    ];

    pub fn interval(&self, frame_rate: u32) -> f64 {
        match self {
            Self::ThirtySeconds => MAJOR_INTERVAL,
            Self::TenSeconds => 10.0,
            Self::FiveSeconds => 5.0,
            Self::OneSecond => 1.0,
            Self::Frame => 1.0 / f64::from(frame_rate.max(1)),
        }
    }

    /// Lowest zoom at which the tier is shown.
    pub fn threshold(&self, config: &RulerConfig) -> f64 {
        match self {
            Self::ThirtySeconds => 0.0,
            Self::TenSeconds => config.show_10s,
            Self::FiveSeconds => config.show_5s,
            Self::OneSecond => config.show_1s,
            Self::Frame => config.show_frames,
        }
    }

    /// Only major ticks carry time labels.
    pub fn is_labeled(&self) -> bool {
        matches!(self, Self::ThirtySeconds)
    }
}

/// Visible horizontal window of the timeline, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub scroll_left: f64,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierTicks {
    pub tier: TickTier,
    pub ticks: Vec<Tick>,
    /// Set when the per-tier cap cut generation short.
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ruler {
    pub zoom: f64,
    pub tiers: Vec<TierTicks>,
}

impl Ruler {
    pub fn tier(&self, tier: TickTier) -> Option<&TierTicks> {
        self.tiers.iter().find(|ticks| ticks.tier == tier)
    }

    pub fn shows(&self, tier: TickTier) -> bool {
        self.tier(tier).is_some()
    }
}

/// Formats seconds as `mm:ss`.
pub fn format_time_label(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let minutes = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    format!("{minutes:02}:{secs:02}")
}

fn is_major(time: f64) -> bool {
    let remainder = time.rem_euclid(MAJOR_INTERVAL);
    remainder < MAJOR_TOLERANCE || MAJOR_INTERVAL - remainder < MAJOR_TOLERANCE
}

/// Derives tick marks from duration and zoom. Holds no timeline state.
#[derive(Debug, Clone)]
pub struct RulerGenerator {
    config: RulerConfig,
    pixels_per_second: f64,
}

impl RulerGenerator {
    /// `pixels_per_second` is the scale at zoom 1.0.
    pub fn new(config: RulerConfig, pixels_per_second: f64) -> Self {
        Self {
            config,
            pixels_per_second,
        }
    }

    pub fn config(&self) -> &RulerConfig {
        &self.config
    }

    pub fn visible_tiers(&self, zoom: f64) -> Vec<TickTier> {
        TickTier::ALL
            .into_iter()
            .filter(|tier| zoom >= tier.threshold(&self.config))
            .collect()
    }

    pub fn generate(&self, duration: f64, zoom: f64, viewport: Option<Viewport>) -> Ruler {
        let tiers = self
            .visible_tiers(zoom)
            .into_iter()
            .map(|tier| self.generate_tier(tier, duration, zoom, viewport))
            .collect();
        Ruler { zoom, tiers }
    }

    fn round_to_frame(&self, time: f64) -> f64 {
        let frame_rate = f64::from(self.config.frame_rate.max(1));
        (time * frame_rate).round() / frame_rate
    }

    /// Time window to cover for `interval`. Sub-second tiers are limited to
    /// the viewport plus an overscan margin when one is given.
    fn window(&self, interval: f64, duration: f64, zoom: f64, viewport: Option<Viewport>) -> (f64, f64) {
        let full = (0.0, duration);
        if interval >= 1.0 {
            return full;
        }
        let Some(viewport) = viewport else {
            return full;
        };
        let pixels_per_second = zoom * self.pixels_per_second;
        if !(pixels_per_second > 0.0) || !viewport.scroll_left.is_finite() || !viewport.width.is_finite() {
            return full;
        }

        let margin = interval * f64::from(self.config.overscan_intervals);
        let start = viewport.scroll_left / pixels_per_second - margin;
        let end = (viewport.scroll_left + viewport.width) / pixels_per_second + margin;
        (start.max(0.0), end.min(duration))
    }

    fn generate_tier(
        &self,
        tier: TickTier,
        duration: f64,
        zoom: f64,
        viewport: Option<Viewport>,
    ) -> TierTicks {
        let interval = tier.interval(self.config.frame_rate);
        let mut result = TierTicks {
            tier,
            ticks: Vec::new(),
            truncated: false,
        };
        if !(interval > 0.0 && interval.is_finite()) || !(duration >= 0.0) {
            tracing::warn!(?tier, interval, duration, "invalid tick interval");
            return result;
        }

        let (start, end) = self.window(interval, duration, zoom, viewport);
        let first_index = (start / interval).floor().max(0.0) as u64;

        for index in first_index.. {
            let raw = index as f64 * interval;
            if raw > end + EDGE_EPSILON {
                break;
            }
            if result.ticks.len() >= self.config.max_ticks_per_tier {
                result.truncated = true;
                tracing::warn!(
                    ?tier,
                    limit = self.config.max_ticks_per_tier,
                    "tick limit reached, some ticks are omitted"
                );
                break;
            }

            let time = self.round_to_frame(raw);
            let major = is_major(time);
            if tier != TickTier::ThirtySeconds && major {
                continue;
            }

            let label = (tier.is_labeled() && major).then(|| format_time_label(time));
            result.ticks.push(Tick { time, label });
        }

        tracing::trace!(?tier, ticks = result.ticks.len(), "generated tick tier");
        result
    }
}
