//! Stimulus-response probes.
//!
//! Two independent looks at whether facial luminance actually follows
//! the colored screen: a latency probe around the most recent color
//! switch, and a lag-scanning normalized cross-correlation between the
//! emitted stimulus timeline and the observed luminance.

use crate::buffers::{LuminanceSample, TemporalSample};
use crate::config::LivenessConfig;
use crate::dsp::stats::{mean, std_dev};
use std::collections::VecDeque;

/// Samples needed in the luminance buffer before the latency probe runs.
const LATENCY_MIN_SAMPLES: usize = 30;

/// Pre/post samples required around the flash.
const LATENCY_MIN_SIDE: usize = 5;

/// Relative luminance deviation that counts as a response.
const LATENCY_DEVIATION: f64 = 0.05;

/// Samples needed in the temporal buffer before cross-correlation runs.
const XCORR_MIN_SAMPLES: usize = 45;

/// Minimum paired samples per evaluated lag.
const XCORR_MIN_PAIRS: usize = 10;

#[derive(Debug, Clone, Copy, Default)]
pub struct LatencyResult {
    pub response_detected: bool,
    pub delay_ms: f64,
    /// Delay falls inside the configured biological window.
    pub is_biological: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct XcorrResult {
    /// Best normalized correlation across the lag scan.
    pub strength: f64,
    pub delay_ms: f64,
    pub passed: bool,
}

/// Looks for the first luminance deviation after the last color switch.
pub fn latency_probe(
    luminance: &VecDeque<LuminanceSample>,
    change_time: Option<f64>,
    config: &LivenessConfig,
) -> LatencyResult {
    let change = match change_time {
        Some(t) if luminance.len() >= LATENCY_MIN_SAMPLES => t,
        _ => return LatencyResult::default(),
    };
    let pre: Vec<&LuminanceSample> = luminance.iter().filter(|s| s.t_ms < change).collect();
    let post: Vec<&LuminanceSample> = luminance.iter().filter(|s| s.t_ms >= change).collect();
    if pre.len() < LATENCY_MIN_SIDE || post.len() < LATENCY_MIN_SIDE {
        return LatencyResult::default();
    }

    let baseline_window: Vec<f64> = pre[pre.len() - LATENCY_MIN_SIDE..]
        .iter()
        .map(|s| s.luminance)
        .collect();
    let baseline = mean(&baseline_window);

    for s in post {
        if (s.luminance - baseline).abs() > LATENCY_DEVIATION * baseline {
            let delay_ms = s.t_ms - change;
            return LatencyResult {
                response_detected: true,
                delay_ms,
                is_biological: delay_ms >= config.temporal_delay_min_ms
                    && delay_ms <= config.temporal_delay_max_ms,
            };
        }
    }
    LatencyResult::default()
}

/// Scans lags for the strongest stimulus→luminance correlation.
pub fn xcorr_probe(temporal: &VecDeque<TemporalSample>, config: &LivenessConfig) -> XcorrResult {
    if !config.enable_temporal_xcorr || temporal.len() < XCORR_MIN_SAMPLES || config.fps == 0 {
        return XcorrResult::default();
    }
    let mut stim: Vec<f64> = temporal.iter().map(|s| s.stimulus_intensity).collect();
    let mut resp: Vec<f64> = temporal.iter().map(|s| s.luminance).collect();
    for series in [&mut stim, &mut resp] {
        let m = mean(series);
        let sd = std_dev(series);
        if sd <= 1e-6 {
            return XcorrResult::default();
        }
        for v in series.iter_mut() {
            *v = (*v - m) / sd;
        }
    }

    let n = resp.len();
    let dt_ms = 1000.0 / config.fps as f64;
    let min_lag = (config.temporal_xcorr_min_lag_ms / dt_ms).floor() as usize;
    let mut max_lag = (config.temporal_xcorr_max_lag_ms / dt_ms).floor() as usize;
    if max_lag < min_lag + 1 {
        max_lag = min_lag + 1;
    }
    // A short buffer silently narrows the scan window.
    max_lag = max_lag.min(n - 1);

    let mut best: Option<(f64, usize)> = None;
    for lag in min_lag..=max_lag {
        if n - lag < XCORR_MIN_PAIRS {
            break;
        }
        let pairs = n - lag;
        let corr = stim[..pairs]
            .iter()
            .zip(&resp[lag..])
            .map(|(s, r)| s * r)
            .sum::<f64>()
            / pairs as f64;
        if best.map_or(true, |(b, _)| corr > b) {
            best = Some((corr, lag));
        }
    }

    match best {
        Some((strength, lag)) => {
            let delay_ms = lag as f64 * dt_ms;
            XcorrResult {
                strength,
                delay_ms,
                passed: strength >= config.temporal_xcorr_min_corr
                    && delay_ms >= config.temporal_xcorr_min_lag_ms
                    && delay_ms <= config.temporal_xcorr_max_lag_ms,
            }
        }
        None => XcorrResult::default(),
    }
}
