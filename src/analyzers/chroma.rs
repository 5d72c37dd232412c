//! Chroma response check against the current stimulus.
//!
//! Skin lit by a colored screen reflects that color dominantly, with a
//! softer rule for blue (skin absorbs it). WHITE and unknown stimuli
//! have no expectation and pass.

use crate::frame::BgrFrame;
use crate::stimulus::ScreenColor;

#[derive(Debug, Clone, Copy, Default)]
pub struct ChromaResult {
    pub passed: bool,
}

/// Tests the mean channel ratios of the face against the stimulus color.
pub fn check(face: &BgrFrame, color: ScreenColor, sensitivity: f64) -> ChromaResult {
    if face.is_empty() {
        return ChromaResult { passed: false };
    }
    let (b, g, r) = face.bgr_means();
    let passed = match color {
        ScreenColor::Red => r > sensitivity * b,
        // Skin absorbs blue; a looser fixed ratio applies.
        ScreenColor::Blue => b > 0.8 * r,
        ScreenColor::Green => g > 0.9 * r && g > 0.9 * b,
        ScreenColor::White => true,
    };
    ChromaResult { passed }
}
