//! Core value types with newtype pattern for type safety.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// Playback position or duration in seconds (f64 precision).
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeCode(pub f64);

impl TimeCode {
    pub const ZERO: Self = Self(0.0);

    pub fn from_secs(secs: f64) -> Self {
        Self(secs)
    }

    pub fn as_secs(self) -> f64 {
        self.0
    }

    pub fn as_millis(self) -> f64 {
        self.0 * 1000.0
    }

    /// Clamp into `[min, max]`. NaN collapses to `min`.
    pub fn clamp(self, min: TimeCode, max: TimeCode) -> Self {
        if self.0.is_nan() {
            return min;
        }
        Self(self.0.clamp(min.0, max.0.max(min.0)))
    }
}

impl Add for TimeCode {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for TimeCode {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl fmt::Display for TimeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.0.max(0.0);
        let mins = (total / 60.0) as u32;
        let secs = (total % 60.0) as u32;
        let tenths = ((total % 1.0) * 10.0) as u32;
        write!(f, "{mins:02}:{secs:02}.{tenths}")
    }
}

/// Canvas resolution in pixels.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect_ratio(self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Convert a horizontal pixel length into a percentage of the canvas width.
    pub fn width_percent(self, px: f64) -> f64 {
        px / self.width as f64 * 100.0
    }

    /// Convert a vertical pixel length into a percentage of the canvas height.
    pub fn height_percent(self, px: f64) -> f64 {
        px / self.height as f64 * 100.0
    }

    /// Resolve a horizontal percentage into pixels.
    pub fn width_px(self, percent: f64) -> f64 {
        percent / 100.0 * self.width as f64
    }

    /// Resolve a vertical percentage into pixels.
    pub fn height_px(self, percent: f64) -> f64 {
        percent / 100.0 * self.height as f64
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Canvas aspect ratio of a template. Serialized as the ratio string (`"9:16"`).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectRatio {
    /// Vertical short-form video (Reels, Shorts, TikTok).
    #[default]
    #[serde(rename = "9:16")]
    Portrait,
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "4:5")]
    Feed,
    #[serde(rename = "16:9")]
    Landscape,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 4] = [
        AspectRatio::Portrait,
        AspectRatio::Square,
        AspectRatio::Feed,
        AspectRatio::Landscape,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AspectRatio::Portrait => "9:16",
            AspectRatio::Square => "1:1",
            AspectRatio::Feed => "4:5",
            AspectRatio::Landscape => "16:9",
        }
    }

    /// Reference canvas used to resolve percentage geometry into pixels.
    pub fn canvas_size(self) -> Resolution {
        match self {
            AspectRatio::Portrait => Resolution::new(1080, 1920),
            AspectRatio::Square => Resolution::new(1080, 1080),
            AspectRatio::Feed => Resolution::new(1080, 1350),
            AspectRatio::Landscape => Resolution::new(1920, 1080),
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AspectRatio::ALL
            .into_iter()
            .find(|r| r.as_str() == s.trim())
            .ok_or_else(|| format!("unknown aspect ratio: {s}"))
    }
}
