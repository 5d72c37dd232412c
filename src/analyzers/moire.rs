//! Moire interference probe.
//!
//! Imaging a pixel grid through another pixel grid folds the display's
//! dot pitch into strong isolated peaks in the 2-D spectrum. Skin has a
//! smooth, rapidly-decaying spectrum instead. The statistic is the peak
//! to mean ratio of the log-compressed magnitude with the DC
//! neighbourhood removed.

use crate::dsp::spectrum::fft2_centered_magnitude;
use crate::frame::BgrFrame;

/// Half-size of the square zeroed around DC (a 20x20 box in total),
/// regardless of image size.
const DC_BOX_HALF: usize = 10;

/// Spectra with no energy beyond this are treated as inert.
const MIN_SPECTRUM_MAX: f64 = 1e-10;

#[derive(Debug, Clone, Copy, Default)]
pub struct MoireResult {
    /// Peak-to-mean ratio of the masked log spectrum.
    pub score: f64,
    pub detected: bool,
    /// False when the face was empty or the spectrum inert; the fusion
    /// stage only grants the no-moire bonus when an analysis ran.
    pub analyzed: bool,
}

/// Scores the face for grid interference. `threshold` is used inverted:
/// a screen is flagged when `score > 1 / threshold`.
pub fn analyze(face: &BgrFrame, threshold: f64) -> MoireResult {
    if face.is_empty() || threshold <= 0.0 {
        return MoireResult::default();
    }
    let (w, h) = (face.width(), face.height());
    let mut mag = fft2_centered_magnitude(&face.gray(), w, h);

    for v in mag.iter_mut() {
        *v = v.ln_1p();
    }
    let max = mag.iter().cloned().fold(0.0f64, f64::max);
    if max <= MIN_SPECTRUM_MAX {
        return MoireResult::default();
    }
    for v in mag.iter_mut() {
        *v /= max;
    }

    // Zero out DC and its low-frequency neighbourhood.
    let (cy, cx) = (h / 2, w / 2);
    for y in cy.saturating_sub(DC_BOX_HALF)..(cy + DC_BOX_HALF).min(h) {
        for x in cx.saturating_sub(DC_BOX_HALF)..(cx + DC_BOX_HALF).min(w) {
            mag[y * w + x] = 0.0;
        }
    }

    let peak = mag.iter().cloned().fold(0.0f64, f64::max);
    let positive: Vec<f64> = mag.iter().cloned().filter(|&v| v > 0.0).collect();
    if positive.is_empty() {
        return MoireResult::default();
    }
    let score = peak / (positive.iter().sum::<f64>() / positive.len() as f64);

    MoireResult {
        score,
        detected: score > 1.0 / threshold,
        analyzed: true,
    }
}
