//! Heart-rate variability over the filtered pulse waveform.
//!
//! Beat-to-beat intervals come from peak picking on the bandpassed BVP;
//! a real cardiovascular system shows measurable beat jitter (RMSSD) and
//! a spread-out interval distribution (entropy), while replayed or
//! synthetic pulses collapse to near-identical intervals.

use crate::config::LivenessConfig;
use crate::dsp::find_peaks;
use crate::dsp::stats::{diff, histogram_entropy, mean, std_dev};

/// Minimum filtered-signal length before peaks are searched.
const MIN_SIGNAL_LEN: usize = 30;

/// Minimum peak count for interval statistics.
const MIN_PEAKS: usize = 3;

/// Physiological RR-interval window in milliseconds (40-180 BPM).
const RR_MIN_MS: f64 = 333.0;
const RR_MAX_MS: f64 = 1500.0;

/// Histogram bins behind the entropy statistic.
const ENTROPY_BINS: usize = 10;

#[derive(Debug, Clone, Copy, Default)]
pub struct HrvEstimate {
    /// Root-mean-square of successive RR differences, ms.
    pub rmssd: f64,
    /// Standard deviation of RR intervals, ms.
    pub sdnn: f64,
    /// Shannon entropy of the RR histogram.
    pub entropy: f64,
    pub is_biologically_valid: bool,
}

/// Extracts HRV statistics from the filtered BVP.
pub fn estimate(filtered: &[f64], config: &LivenessConfig) -> HrvEstimate {
    if filtered.len() < MIN_SIGNAL_LEN {
        return HrvEstimate::default();
    }
    let fps = config.fps as f64;
    let distance = (0.4 * fps).ceil() as usize;
    let prominence = 0.3 * std_dev(filtered);
    let peaks = find_peaks(filtered, distance, prominence);
    if peaks.len() < MIN_PEAKS {
        return HrvEstimate::default();
    }

    let rr: Vec<f64> = peaks
        .windows(2)
        .map(|w| (w[1] - w[0]) as f64 * 1000.0 / fps)
        .filter(|&ms| ms > RR_MIN_MS && ms < RR_MAX_MS)
        .collect();
    if rr.len() < 2 {
        return HrvEstimate::default();
    }

    let rr_diff = diff(&rr);
    let rmssd = mean(&rr_diff.iter().map(|d| d * d).collect::<Vec<_>>()).sqrt();
    let sdnn = std_dev(&rr);
    let entropy = histogram_entropy(&rr, ENTROPY_BINS);

    HrvEstimate {
        rmssd,
        sdnn,
        entropy,
        is_biologically_valid: rmssd >= config.hrv_min_rmssd
            && entropy >= config.hrv_entropy_threshold,
    }
}
