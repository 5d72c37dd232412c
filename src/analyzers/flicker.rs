//! High-frequency flicker probe over the green signal.
//!
//! Display refresh beating against the camera shutter injects energy
//! well above any plausible pulse band. Compares >5 Hz spectral mass
//! against the rPPG band.

use crate::dsp::spectrum::real_fft_magnitudes;
use crate::dsp::stats::mean;

/// Samples of green history required (2 s at 30 fps).
const WINDOW: usize = 60;

/// rPPG band in Hz.
const RPPG_LOW_HZ: f64 = 0.75;
const RPPG_HIGH_HZ: f64 = 3.0;

/// Everything above this is display territory.
const HIGH_BAND_HZ: f64 = 5.0;

/// High/rPPG power ratio above which flicker is declared.
const FLICKER_RATIO_THRESHOLD: f64 = 1.5;

const EPS: f64 = 1e-6;

#[derive(Debug, Clone, Copy, Default)]
pub struct FlickerResult {
    /// High-band to pulse-band magnitude ratio.
    pub ratio: f64,
    pub detected: bool,
}

/// Runs the probe over the last [`WINDOW`] samples of the green buffer.
pub fn analyze(green: &[f64], fps: f64) -> FlickerResult {
    if green.len() < WINDOW || fps <= 0.0 {
        return FlickerResult::default();
    }
    let tail = &green[green.len() - WINDOW..];
    let m = mean(tail);
    let centered: Vec<f64> = tail.iter().map(|v| v - m).collect();
    let mags = real_fft_magnitudes(&centered);

    let df = fps / WINDOW as f64;
    let mut p_rppg = 0.0;
    let mut p_high = 0.0;
    for (k, &mag) in mags.iter().enumerate() {
        let f = k as f64 * df;
        if (RPPG_LOW_HZ..=RPPG_HIGH_HZ).contains(&f) {
            p_rppg += mag;
        } else if f > HIGH_BAND_HZ {
            p_high += mag;
        }
    }
    let ratio = p_high / (p_rppg + EPS);

    FlickerResult {
        ratio,
        detected: ratio > FLICKER_RATIO_THRESHOLD,
    }
}
