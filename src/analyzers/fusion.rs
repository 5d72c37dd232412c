//! Multi-signal fusion scoring.
//!
//! Folds every analyzer verdict into a 0-100 confidence with fixed
//! ordering, then applies hard override gates that no weighted sum may
//! outvote. All contribution magnitudes land in the diagnostics map.

use crate::analyzers::chroma::ChromaResult;
use crate::analyzers::flicker::FlickerResult;
use crate::analyzers::heart_rate::HeartRateEstimate;
use crate::analyzers::hrv::HrvEstimate;
use crate::analyzers::moire::MoireResult;
use crate::analyzers::sss::SssResult;
use crate::analyzers::static_signal::StaticSignalResult;
use crate::analyzers::temporal::{LatencyResult, XcorrResult};
use crate::analyzers::texture::TextureResult;
use crate::config::LivenessConfig;
use crate::dsp::stats::std_dev;
use crate::report::{round1, Details, DetailsExt};

/// Confidence at or above this reads as human (before hard gates).
pub const HUMAN_THRESHOLD: f64 = 40.0;

/// Forced-false reasons.
pub const REASON_STATIC: &str = "static_image_low_variance";
pub const REASON_SCREEN_TEXTURE: &str = "screen_texture_detected";

/// rPPG warmup credit while the buffer fills.
const WARMUP_BONUS: f64 = 5.0;
const WARMUP_MIN_SAMPLES: usize = 30;

/// Partial-credit window below the SSS threshold.
const SSS_PARTIAL_WINDOW: f64 = 0.15;
const SSS_PARTIAL_FACTOR: f64 = 0.3;
const SSS_CONFIDENCE_FLOOR: f64 = 0.5;

/// Cross-correlation strength bonus shaping.
const XCORR_BONUS_CAP: f64 = 10.0;
const XCORR_BONUS_SLOPE: f64 = 15.0;

/// Moire penalty multiplier on the weight.
const MOIRE_PENALTY_FACTOR: f64 = 3.0;

/// BPM stability penalty shaping.
const STABILITY_MIN_HISTORY: usize = 15;
const STABILITY_PENALTY_CAP: f64 = 30.0;
const STABILITY_PENALTY_SLOPE: f64 = 1.5;

const LIGHTING_PENALTY: f64 = 10.0;
const STATIC_PENALTY: f64 = 50.0;
const ALIVE_BONUS: f64 = 15.0;
const TEXTURE_PENALTY: f64 = 60.0;
const FLICKER_PENALTY: f64 = 40.0;

/// Buffer fill required before a hard gate may fire.
const STATIC_GATE_MIN_SAMPLES: usize = 60;
const TEXTURE_GATE_MIN_SAMPLES: usize = 30;

/// Everything the scorer reads, gathered by the engine.
pub struct FusionInputs<'a> {
    pub hr: &'a HeartRateEstimate,
    pub hrv: &'a HrvEstimate,
    pub sss: &'a SssResult,
    pub chroma: &'a ChromaResult,
    pub latency: &'a LatencyResult,
    pub xcorr: &'a XcorrResult,
    pub moire: &'a MoireResult,
    pub stat: &'a StaticSignalResult,
    pub texture: &'a TextureResult,
    pub flicker: &'a FlickerResult,
    pub green_len: usize,
    pub rgb_len: usize,
    pub raw_bpm_history: &'a [f64],
    /// A face image was available this frame (texture/moire actually ran).
    pub face_present: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct FusionOutcome {
    /// Clamped to [0, 100], one decimal.
    pub confidence: f64,
    pub is_human: bool,
    pub forced_false_reason: Option<&'static str>,
}

/// Runs the eleven scoring steps in order, then the hard gates.
pub fn fuse(
    inputs: &FusionInputs<'_>,
    config: &LivenessConfig,
    details: &mut Details,
) -> FusionOutcome {
    let mut score = 0.0f64;

    // 1. rPPG evidence, or a small credit while still warming up.
    if inputs.hr.is_valid {
        let c = config.weight_rppg * inputs.hr.signal_quality;
        score += c;
        details.put_float("score_rppg", c);
    } else if inputs.rgb_len > WARMUP_MIN_SAMPLES {
        score += WARMUP_BONUS;
        details.put_float("rppg_warmup_bonus", WARMUP_BONUS);
    }

    // 2. Heart-rate variability.
    if inputs.hrv.is_biologically_valid {
        score += config.weight_hrv;
        details.put_float("score_hrv", config.weight_hrv);
    }

    // 3. Subsurface scattering, with partial credit just under the bar.
    if inputs.sss.passed {
        let c = ((inputs.sss.ratio - config.sss_ratio_threshold) / SSS_PARTIAL_WINDOW)
            .clamp(0.0, 1.0)
            .max(SSS_CONFIDENCE_FLOOR);
        let contribution = config.weight_physics_sss * c;
        score += contribution;
        details.put_float("score_sss", contribution);
    } else if inputs.sss.ratio > config.sss_ratio_threshold - SSS_PARTIAL_WINDOW {
        let contribution = SSS_PARTIAL_FACTOR * config.weight_physics_sss;
        score += contribution;
        details.put_float("score_sss", contribution);
    }

    // 4. Chroma response.
    if inputs.chroma.passed {
        score += config.weight_chroma;
        details.put_float("score_chroma", config.weight_chroma);
    }

    // 5. Temporal response: either probe suffices; correlation strength
    //    earns an extra bonus.
    let temporal_passed = (inputs.latency.response_detected && inputs.latency.is_biological)
        || inputs.xcorr.passed;
    if temporal_passed {
        let bonus = (XCORR_BONUS_SLOPE * inputs.xcorr.strength).min(XCORR_BONUS_CAP);
        score += config.weight_temporal + bonus;
        details.put_float("score_temporal", config.weight_temporal);
        details.put_float("temporal_bonus", bonus);
    }
    details.put_bool("temporal_passed", temporal_passed);

    // 6. Moire: a detected grid is heavily negative; a clean spectrum
    //    from an actual analysis earns the weight.
    if inputs.moire.detected {
        score -= MOIRE_PENALTY_FACTOR * config.weight_moire;
        details.put_float("score_moire", -MOIRE_PENALTY_FACTOR * config.weight_moire);
    } else if inputs.moire.analyzed {
        score += config.weight_moire;
        details.put_float("score_moire", config.weight_moire);
    }

    // 7. Anti-photo BPM stability: a spectral peak that never wanders is
    //    a replay tell.
    if inputs.raw_bpm_history.len() >= STABILITY_MIN_HISTORY {
        let sigma = std_dev(inputs.raw_bpm_history);
        details.put_float("bpm_stability_std", sigma);
        if sigma > config.bpm_stability_threshold {
            let penalty = (STABILITY_PENALTY_SLOPE * (sigma - config.bpm_stability_threshold))
                .min(STABILITY_PENALTY_CAP);
            score -= penalty;
            details.put_float("bpm_stability_penalty", penalty);
        }
    }

    // 8. Unstable lighting erodes trust in everything above.
    if inputs.stat.lighting_unstable {
        score -= LIGHTING_PENALTY;
        details.put_float("lighting_penalty", LIGHTING_PENALTY);
    }

    // 9. Static signal kills, a live one helps.
    if inputs.stat.is_static {
        score -= STATIC_PENALTY;
        details.put_float("static_penalty", STATIC_PENALTY);
    } else if inputs.stat.alive {
        score += ALIVE_BONUS;
        details.put_float("alive_bonus", ALIVE_BONUS);
    }

    // 10. Screen texture.
    if inputs.face_present && inputs.texture.screen_like {
        score -= TEXTURE_PENALTY;
        details.put_float("texture_penalty", TEXTURE_PENALTY);
    }

    // 11. Screen flicker.
    if inputs.flicker.detected {
        score -= FLICKER_PENALTY;
        details.put_float("flicker_penalty", FLICKER_PENALTY);
    }

    let confidence = round1(score.clamp(0.0, 100.0));
    let mut is_human = confidence >= HUMAN_THRESHOLD;

    // Hard override gates: no weighted sum outvotes a physically
    // impossible signal.
    let mut forced_false_reason = None;
    if inputs.stat.is_static && inputs.green_len >= STATIC_GATE_MIN_SAMPLES {
        is_human = false;
        forced_false_reason = Some(REASON_STATIC);
    } else if inputs.texture.screen_like
        && inputs.face_present
        && inputs.green_len >= TEXTURE_GATE_MIN_SAMPLES
    {
        is_human = false;
        forced_false_reason = Some(REASON_SCREEN_TEXTURE);
    }

    FusionOutcome {
        confidence,
        is_human,
        forced_false_reason,
    }
}
