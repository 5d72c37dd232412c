//! Engine configuration.
//!
//! A plain record, immutable after construction. Serde round-trips let the
//! host keep tuned profiles on disk; missing fields fall back to the
//! defaults below. `validate()` catches contradictory settings before an
//! engine is built - per-frame processing itself never fails.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// BVP extraction mode: which linear RGB combination recovers the pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RppgMethod {
    /// Normalized green channel only.
    #[serde(rename = "GREEN")]
    Green,
    /// de Haan & Jeanne chrominance combination.
    #[serde(rename = "CHROM")]
    Chrom,
    /// Wang et al. plane-orthogonal-to-skin projection.
    #[serde(rename = "POS")]
    Pos,
}

impl RppgMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RppgMethod::Green => "GREEN",
            RppgMethod::Chrom => "CHROM",
            RppgMethod::Pos => "POS",
        }
    }
}

/// Rejected configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("fps must be positive, got {0}")]
    BadFps(u32),
    #[error("buffer_size must be at least 2, got {0}")]
    BadBufferSize(usize),
    #[error("bpm range is empty: min {min} >= max {max}")]
    EmptyBpmRange { min: f64, max: f64 },
    #[error("xcorr lag window is empty: min {min_ms} ms >= max {max_ms} ms")]
    EmptyLagWindow { min_ms: f64, max_ms: f64 },
    #[error("{name} must be within [0, 1], got {value}")]
    OutOfUnitRange { name: &'static str, value: f64 },
}

/// All tunables of the liveness engine. See field docs for semantics;
/// thresholds marked (gate) only apply while their feature is enabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LivenessConfig {
    /// Assumed sample rate of the incoming frame stream.
    pub fps: u32,
    /// Capacity of the green/RGB signal buffers; HR is computed only once
    /// they are full.
    pub buffer_size: usize,
    pub rppg_method: RppgMethod,
    /// Minimum buffer duration (seconds) before HR is attempted.
    pub rppg_min_window_seconds: f64,

    /// ROI admission gate toggle and thresholds (gate).
    pub enable_quality_gate: bool,
    pub max_motion_score: f64,
    pub min_blur_var_laplacian: f64,
    pub max_exposure_clip_pct: f64,
    pub min_roi_size: usize,

    /// Stimulus cross-correlation probe toggle and window.
    pub enable_temporal_xcorr: bool,
    pub temporal_xcorr_min_corr: f64,
    pub temporal_xcorr_min_lag_ms: f64,
    pub temporal_xcorr_max_lag_ms: f64,

    pub min_bpm: f64,
    pub max_bpm: f64,
    pub min_signal_quality: f64,

    /// Blue/red sharpness ratio above which skin is assumed.
    pub sss_ratio_threshold: f64,
    pub chroma_sensitivity: f64,

    /// Acceptable luminance-response latency window for a biological face.
    pub temporal_delay_min_ms: f64,
    pub temporal_delay_max_ms: f64,

    pub hrv_min_rmssd: f64,
    pub hrv_entropy_threshold: f64,

    /// Used inverted: a moire peak score above 1/threshold flags a screen.
    pub moire_threshold: f64,

    /// Raw-BPM spread above which the stability penalty engages.
    pub bpm_stability_threshold: f64,
    /// Percent variance of the green signal below which it is static.
    pub min_signal_variance: f64,

    // Fusion weights.
    pub weight_physics_sss: f64,
    pub weight_chroma: f64,
    pub weight_rppg: f64,
    pub weight_hrv: f64,
    pub weight_temporal: f64,
    pub weight_moire: f64,
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            fps: 30,
            buffer_size: 90,
            rppg_method: RppgMethod::Green,
            rppg_min_window_seconds: 3.0,

            enable_quality_gate: true,
            max_motion_score: 15.0,
            min_blur_var_laplacian: 25.0,
            max_exposure_clip_pct: 0.25,
            min_roi_size: 20,

            enable_temporal_xcorr: true,
            temporal_xcorr_min_corr: 0.25,
            temporal_xcorr_min_lag_ms: 50.0,
            temporal_xcorr_max_lag_ms: 500.0,

            min_bpm: 45.0,
            max_bpm: 180.0,
            min_signal_quality: 0.3,

            sss_ratio_threshold: 1.1,
            chroma_sensitivity: 1.15,

            temporal_delay_min_ms: 80.0,
            temporal_delay_max_ms: 600.0,

            hrv_min_rmssd: 10.0,
            hrv_entropy_threshold: 0.6,

            moire_threshold: 0.15,

            bpm_stability_threshold: 12.0,
            min_signal_variance: 0.4,

            weight_physics_sss: 20.0,
            weight_chroma: 10.0,
            weight_rppg: 25.0,
            weight_hrv: 15.0,
            weight_temporal: 15.0,
            weight_moire: 5.0,
        }
    }
}

impl LivenessConfig {
    /// Rejects settings the pipeline cannot operate under.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fps == 0 {
            return Err(ConfigError::BadFps(self.fps));
        }
        if self.buffer_size < 2 {
            return Err(ConfigError::BadBufferSize(self.buffer_size));
        }
        if self.min_bpm >= self.max_bpm {
            return Err(ConfigError::EmptyBpmRange {
                min: self.min_bpm,
                max: self.max_bpm,
            });
        }
        if self.temporal_xcorr_min_lag_ms >= self.temporal_xcorr_max_lag_ms {
            return Err(ConfigError::EmptyLagWindow {
                min_ms: self.temporal_xcorr_min_lag_ms,
                max_ms: self.temporal_xcorr_max_lag_ms,
            });
        }
        for (name, value) in [
            ("min_signal_quality", self.min_signal_quality),
            ("max_exposure_clip_pct", self.max_exposure_clip_pct),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfUnitRange { name, value });
            }
        }
        Ok(())
    }
}
