//! ROI quality gate.
//!
//! Scores the forehead crop on blur, exposure clipping, inter-frame
//! motion and size, and decides whether the frame is admitted into the
//! pulse buffers. A bad crop must never poison ninety frames of signal.

use crate::config::LivenessConfig;
use crate::dsp::imageops;
use crate::frame::{BgrFrame, CH_BLUE, CH_GREEN, CH_RED};

/// Gate-fail reason strings surfaced in `quality_gate_reason`.
pub const REASON_ROI_MISSING: &str = "roi_missing";
pub const REASON_ROI_ERROR: &str = "roi_error";
pub const REASON_ROI_TOO_SMALL: &str = "roi_too_small";
pub const REASON_BLUR_TOO_LOW: &str = "blur_too_low";
pub const REASON_EXPOSURE_CLIPPED: &str = "exposure_clipped";
pub const REASON_MOTION_TOO_HIGH: &str = "motion_too_high";

/// Grayscale plane kept across frames for the motion statistic.
#[derive(Debug, Clone)]
pub struct GrayPlane {
    pub data: Vec<f64>,
    pub width: usize,
    pub height: usize,
}

/// Per-frame ROI features plus the admission verdict.
#[derive(Debug, Clone, Default)]
pub struct GateOutcome {
    pub passed: bool,
    /// Empty when the gate passed.
    pub reason: &'static str,
    pub blur_var: f64,
    pub exposure_clip_pct: f64,
    pub motion_score: f64,
    pub roi_min_dim: usize,
    pub green_mean: f64,
    /// Channel means in RGB order, ready for the pulse buffers.
    pub rgb_mean: [f64; 3],
    /// Current grayscale plane; the engine stores it for the next frame.
    pub gray: Option<GrayPlane>,
}

/// Evaluates the gate. The grayscale plane is produced even on failure so
/// the motion reference always tracks the latest crop.
pub fn evaluate(
    roi: &BgrFrame,
    prev_gray: Option<&GrayPlane>,
    config: &LivenessConfig,
) -> GateOutcome {
    if roi.is_empty() {
        return GateOutcome {
            passed: false,
            reason: REASON_ROI_MISSING,
            ..Default::default()
        };
    }

    let (w, h) = (roi.width(), roi.height());
    let gray = roi.gray();

    let blur_var = imageops::laplacian_variance(&gray, w, h);
    let clipped = gray
        .iter()
        .filter(|&&v| v <= 5.0 || v >= 250.0)
        .count();
    let exposure_clip_pct = clipped as f64 / gray.len() as f64;
    let motion_score = match prev_gray {
        Some(prev) if prev.width == w && prev.height == h => {
            imageops::mean_abs_diff(&gray, &prev.data).unwrap_or(0.0)
        }
        // First frame or shape change: no motion evidence.
        _ => 0.0,
    };
    let roi_min_dim = roi.min_dim();

    let green_mean = roi.channel_mean(CH_GREEN);
    let rgb_mean = [
        roi.channel_mean(CH_RED),
        green_mean,
        roi.channel_mean(CH_BLUE),
    ];

    let mut outcome = GateOutcome {
        passed: true,
        reason: "",
        blur_var,
        exposure_clip_pct,
        motion_score,
        roi_min_dim,
        green_mean,
        rgb_mean,
        gray: Some(GrayPlane {
            data: gray,
            width: w,
            height: h,
        }),
    };

    if !blur_var.is_finite() || !exposure_clip_pct.is_finite() || !motion_score.is_finite() {
        outcome.passed = false;
        outcome.reason = REASON_ROI_ERROR;
        return outcome;
    }

    if !config.enable_quality_gate {
        return outcome;
    }

    let reason = if roi_min_dim < config.min_roi_size {
        REASON_ROI_TOO_SMALL
    } else if blur_var < config.min_blur_var_laplacian {
        REASON_BLUR_TOO_LOW
    } else if exposure_clip_pct > config.max_exposure_clip_pct {
        REASON_EXPOSURE_CLIPPED
    } else if motion_score > config.max_motion_score {
        REASON_MOTION_TOO_HIGH
    } else {
        ""
    };
    if !reason.is_empty() {
        outcome.passed = false;
        outcome.reason = reason;
    }
    outcome
}
