//! Subsurface-scattering sharpness probe.
//!
//! Red light penetrates living skin and diffuses; blue reflects off the
//! epidermis and keeps its detail. The blue/red ratio of
//! Laplacian-variance sharpness therefore separates skin (ratio well
//! above 1) from screens and prints, which are equally sharp in both
//! channels.

use crate::dsp::imageops::{gaussian3, laplacian_variance};
use crate::frame::{BgrFrame, CH_BLUE, CH_RED};

/// Floor for the red-channel sharpness divisor.
const MIN_RED_VARIANCE: f64 = 0.001;

#[derive(Debug, Clone, Copy, Default)]
pub struct SssResult {
    /// Blue/red sharpness ratio.
    pub ratio: f64,
    pub passed: bool,
}

/// Computes the sharpness ratio; an empty face yields the zero record.
pub fn analyze(face: &BgrFrame, ratio_threshold: f64) -> SssResult {
    if face.is_empty() {
        return SssResult::default();
    }
    let (w, h) = (face.width(), face.height());
    let blue = gaussian3(&face.channel_plane(CH_BLUE), w, h);
    let red = gaussian3(&face.channel_plane(CH_RED), w, h);

    let var_b = laplacian_variance(&blue, w, h);
    let var_r = laplacian_variance(&red, w, h).max(MIN_RED_VARIANCE);
    let ratio = var_b / var_r;

    SssResult {
        ratio,
        passed: ratio > ratio_threshold,
    }
}
