//! Screen stimulus colors.
//!
//! The host cycles a colored full-screen stimulus (RED → BLUE → GREEN →
//! WHITE) while frames are captured. The engine uses the current color two
//! ways: chroma verification of the reflected light, and cross-correlation
//! of the stimulus timeline against facial luminance.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Displayed stimulus color for the current frame.
///
/// Parsing is case-insensitive; anything unrecognized is treated as WHITE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreenColor {
    #[serde(rename = "RED")]
    Red,
    #[serde(rename = "GREEN")]
    Green,
    #[serde(rename = "BLUE")]
    Blue,
    #[serde(rename = "WHITE")]
    White,
}

impl ScreenColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScreenColor::Red => "RED",
            ScreenColor::Green => "GREEN",
            ScreenColor::Blue => "BLUE",
            ScreenColor::White => "WHITE",
        }
    }

    /// Unit RGB emitted by the screen for this color.
    pub fn unit_rgb(&self) -> (f64, f64, f64) {
        match self {
            ScreenColor::Red => (1.0, 0.0, 0.0),
            ScreenColor::Green => (0.0, 1.0, 0.0),
            ScreenColor::Blue => (0.0, 0.0, 1.0),
            ScreenColor::White => (1.0, 1.0, 1.0),
        }
    }

    /// Total emitted intensity, used as the stimulus sample in the
    /// cross-correlation probe (WHITE drives all three channels).
    pub fn intensity(&self) -> f64 {
        let (r, g, b) = self.unit_rgb();
        r + g + b
    }
}

impl FromStr for ScreenColor {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_uppercase().as_str() {
            "RED" => ScreenColor::Red,
            "GREEN" => ScreenColor::Green,
            "BLUE" => ScreenColor::Blue,
            _ => ScreenColor::White,
        })
    }
}
