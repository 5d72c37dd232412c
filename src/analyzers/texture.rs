//! Local-texture uniformity probe.
//!
//! Skin carries pores, micro-shadows and edges that keep the local
//! standard deviation up; an LCD or a glossy print viewed through a
//! camera averages out to an unnaturally uniform micro-texture.

use crate::dsp::imageops::box_filter;
use crate::dsp::stats::mean;
use crate::frame::BgrFrame;

/// Box-filter kernel size for the local moments.
const WINDOW: usize = 5;

/// Mean local std below this reads as a screen-like surface.
const UNIFORMITY_THRESHOLD: f64 = 7.5;

#[derive(Debug, Clone, Copy, Default)]
pub struct TextureResult {
    /// Mean local standard deviation over the gray face.
    pub score: f64,
    pub screen_like: bool,
}

/// Computes local std via box-filtered first and second moments.
pub fn analyze(face: &BgrFrame) -> TextureResult {
    if face.is_empty() {
        return TextureResult::default();
    }
    let (w, h) = (face.width(), face.height());
    let gray = face.gray();
    let mu = box_filter(&gray, w, h, WINDOW);
    let gray_sq: Vec<f64> = gray.iter().map(|v| v * v).collect();
    let mu2 = box_filter(&gray_sq, w, h, WINDOW);

    let local_std: Vec<f64> = mu
        .iter()
        .zip(&mu2)
        .map(|(m, m2)| (m2 - m * m).max(0.0).sqrt())
        .collect();
    let score = mean(&local_std);

    TextureResult {
        score,
        screen_like: score < UNIFORMITY_THRESHOLD,
    }
}
