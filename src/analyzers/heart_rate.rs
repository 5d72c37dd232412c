//! Heart-rate estimation from the pulse buffers.
//!
//! detrend → z-score → zero-phase Butterworth bandpass → Welch PSD →
//! in-band peak → SNR-derived quality → quality-weighted smoothing.
//! Anything short of a warm, long-enough buffer returns the zero record.

use crate::analyzers::bvp;
use crate::buffers::SignalBuffers;
use crate::config::{LivenessConfig, RppgMethod};
use crate::dsp::stats::{detrend_linear, mean, zscore};
use crate::dsp::{filtfilt, welch, Bandpass};

/// rPPG passband in Hz (45-180 BPM).
pub const BAND_LOW_HZ: f64 = 0.75;
pub const BAND_HIGH_HZ: f64 = 3.0;

/// Butterworth order of the bandpass.
const FILTER_ORDER: usize = 3;

/// Welch segment cap.
const MAX_NPERSEG: usize = 128;

/// Bins skipped on each side of the spectral peak when estimating the
/// noise floor.
const SNR_GUARD_BINS: usize = 2;

#[derive(Debug, Clone, Default)]
pub struct HeartRateEstimate {
    /// Peak frequency of this window, in BPM.
    pub bpm_raw: f64,
    /// Quality-weighted smoothing over recent estimates.
    pub bpm_smoothed: f64,
    /// min(1, SNR/10) of the spectral peak.
    pub signal_quality: f64,
    /// Smoothed BPM in range and quality above the floor.
    pub is_valid: bool,
    /// Filtered BVP, handed on to the HRV extractor.
    pub filtered: Vec<f64>,
}

/// Runs the estimator once. Appends to the BPM histories only when a
/// spectral estimate was actually produced.
pub fn estimate(buffers: &mut SignalBuffers, config: &LivenessConfig) -> HeartRateEstimate {
    let warm = match config.rppg_method {
        RppgMethod::Green => buffers.green.len() == buffers.capacity(),
        _ => buffers.rgb.len() == buffers.capacity(),
    };
    if !warm {
        return HeartRateEstimate::default();
    }
    let window = buffers.rgb_rows();
    let fps = config.fps as f64;
    if window.len() as f64 / fps < config.rppg_min_window_seconds {
        return HeartRateEstimate::default();
    }

    let mut signal = bvp::extract(&window, config.rppg_method);
    detrend_linear(&mut signal);
    if !zscore(&mut signal) {
        // Flat window: nothing to estimate.
        return HeartRateEstimate::default();
    }

    let nyquist = fps / 2.0;
    let low = (BAND_LOW_HZ / nyquist).clamp(0.01, 0.99);
    let high = (BAND_HIGH_HZ / nyquist).clamp(0.01, 0.99);
    let filter = match Bandpass::design(FILTER_ORDER, low, high) {
        Some(f) => f,
        None => return HeartRateEstimate::default(),
    };
    let filtered = match filtfilt(&filter, &signal) {
        Some(f) => f,
        None => return HeartRateEstimate::default(),
    };

    let psd = welch(&filtered, fps, filtered.len().min(MAX_NPERSEG));
    let band: Vec<(f64, f64)> = psd
        .freqs
        .iter()
        .zip(&psd.power)
        .filter(|(&f, _)| (BAND_LOW_HZ..=BAND_HIGH_HZ).contains(&f))
        .map(|(&f, &p)| (f, p))
        .collect();
    if band.is_empty() {
        return HeartRateEstimate::default();
    }

    let (peak_pos, &(peak_freq, peak_power)) = band
        .iter()
        .enumerate()
        .max_by(|a, b| a.1 .1.total_cmp(&b.1 .1))
        .expect("band is non-empty");

    let noise: Vec<f64> = band
        .iter()
        .enumerate()
        .filter(|(i, _)| i.abs_diff(peak_pos) > SNR_GUARD_BINS)
        .map(|(_, &(_, p))| p)
        .collect();
    let signal_quality = if noise.is_empty() {
        1.0
    } else {
        let floor = mean(&noise);
        if floor <= 0.0 {
            if peak_power > 0.0 {
                1.0
            } else {
                0.0
            }
        } else {
            (peak_power / floor / 10.0).min(1.0)
        }
    };

    let bpm_raw = peak_freq * 60.0;
    buffers.push_bpm(bpm_raw, signal_quality);
    let weight_sum: f64 = buffers.bpm_history.iter().map(|(_, q)| q).sum();
    let bpm_smoothed = if weight_sum > 1e-12 {
        buffers
            .bpm_history
            .iter()
            .map(|(b, q)| b * q)
            .sum::<f64>()
            / weight_sum
    } else {
        bpm_raw
    };
    buffers.push_raw_bpm(bpm_raw);

    let is_valid = (config.min_bpm..=config.max_bpm).contains(&bpm_smoothed)
        && signal_quality >= config.min_signal_quality;

    HeartRateEstimate {
        bpm_raw,
        bpm_smoothed,
        signal_quality,
        is_valid,
        filtered,
    }
}
