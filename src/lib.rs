//! Physics-based face liveness detection engine.
//!
//! Consumes a stream of camera frames plus a synchronized colored-screen
//! stimulus and decides, per frame, whether the observed face is a live
//! human or a spoof (printed photo, screen replay, generated still).
//!
//! The pipeline is single-threaded and stateful: every
//! [`LivenessEngine::process_frame`] call updates bounded signal buffers,
//! fans out to independent analyzers (rPPG heart rate, HRV, subsurface
//! scattering, moire, texture, flicker, stimulus response, chroma), and
//! fuses the verdicts into a scored [`LivenessResult`].
//!
//! ```no_run
//! use prism_liveness::{BgrFrame, LivenessConfig, LivenessEngine, ScreenColor};
//!
//! let mut engine = LivenessEngine::new(LivenessConfig::default());
//! let roi = BgrFrame::solid(40, 30, 90, 100, 150);
//! let face = BgrFrame::solid(120, 120, 90, 100, 150);
//! let result = engine.process_frame(&roi, &face, ScreenColor::Red, Some(0.0));
//! println!("human={} confidence={}", result.is_human, result.confidence);
//! ```
//!
//! One engine serves one session; allocate one per parallel session and
//! call [`LivenessEngine::reset`] between subjects. `process_frame`
//! never fails: hostile or warming-up inputs yield degraded results with
//! the cause recorded in [`LivenessResult::details`].

pub mod analyzers;
pub mod buffers;
pub mod config;
pub mod dsp;
pub mod frame;
pub mod report;
pub mod stimulus;

use crate::analyzers::quality::GrayPlane;
use crate::analyzers::{
    chroma, flicker, fusion, heart_rate, hrv, moire, quality, sss, static_signal, temporal,
    texture, FusionInputs, HeartRateEstimate, HrvEstimate,
};
use crate::buffers::{LuminanceSample, SignalBuffers, TemporalSample};
use crate::report::{round3, DetailsExt};

pub use crate::config::{ConfigError, LivenessConfig, RppgMethod};
pub use crate::frame::BgrFrame;
pub use crate::report::{DetailValue, Details, LivenessResult};
pub use crate::stimulus::ScreenColor;

/// Stateful liveness engine for one capture session.
pub struct LivenessEngine {
    config: LivenessConfig,
    buffers: SignalBuffers,
    last_screen_color: Option<ScreenColor>,
    last_color_change_time: Option<f64>,
    last_timestamp_ms: Option<f64>,
    last_bpm: f64,
    prev_roi_gray: Option<GrayPlane>,
    last_face: BgrFrame,
}

impl LivenessEngine {
    /// Builds an engine around an immutable configuration. Validate the
    /// config first if it comes from an untrusted source.
    pub fn new(config: LivenessConfig) -> Self {
        let buffers = SignalBuffers::new(config.buffer_size);
        Self {
            config,
            buffers,
            last_screen_color: None,
            last_color_change_time: None,
            last_timestamp_ms: None,
            last_bpm: 0.0,
            prev_roi_gray: None,
            last_face: BgrFrame::empty(),
        }
    }

    pub fn config(&self) -> &LivenessConfig {
        &self.config
    }

    /// Current fill of the green pulse buffer (warmup introspection).
    pub fn green_buffer_len(&self) -> usize {
        self.buffers.green.len()
    }

    /// Frames required before heart-rate estimation starts.
    pub fn buffer_size(&self) -> usize {
        self.config.buffer_size
    }

    /// Last smoothed BPM, 0.0 before the first estimate.
    pub fn last_bpm(&self) -> f64 {
        self.last_bpm
    }

    /// Clears all signal history and timing state; the configuration is
    /// retained. The engine is observationally a fresh one afterwards.
    pub fn reset(&mut self) {
        log::debug!("liveness engine reset");
        self.buffers.clear();
        self.last_screen_color = None;
        self.last_color_change_time = None;
        self.last_timestamp_ms = None;
        self.last_bpm = 0.0;
        self.prev_roi_gray = None;
        self.last_face = BgrFrame::empty();
    }

    /// Processes one frame and returns its liveness decision.
    ///
    /// `forehead_roi` feeds the pulse buffers, `face_img` the spoof
    /// analyzers; either may be empty. `timestamp_ms` must be
    /// non-decreasing within a session; `None` substitutes wall clock.
    pub fn process_frame(
        &mut self,
        forehead_roi: &BgrFrame,
        face_img: &BgrFrame,
        screen_color: ScreenColor,
        timestamp_ms: Option<f64>,
    ) -> LivenessResult {
        let t_ms = timestamp_ms.unwrap_or_else(wall_clock_ms);
        if let Some(prev) = self.last_timestamp_ms {
            if t_ms < prev {
                log::warn!("timestamp went backwards: {t_ms} < {prev}");
            }
        }
        self.last_timestamp_ms = Some(t_ms);
        self.last_face = face_img.clone();

        // Stimulus bookkeeping: record color switches for the latency probe.
        if let Some(prev_color) = self.last_screen_color {
            if prev_color != screen_color {
                self.buffers.push_color_change(screen_color, t_ms);
                self.last_color_change_time = Some(t_ms);
            }
        }
        self.last_screen_color = Some(screen_color);

        // Quality gate; the motion reference always tracks the newest crop.
        let gate = quality::evaluate(forehead_roi, self.prev_roi_gray.as_ref(), &self.config);
        self.prev_roi_gray = gate.gray.clone();
        if gate.passed {
            self.buffers
                .push_pulse_sample(gate.green_mean, gate.rgb_mean);
        }

        // Temporal buffers advance with every non-empty face frame.
        if !face_img.is_empty() {
            let luminance = face_img.luminance();
            self.buffers.push_temporal(TemporalSample {
                t_ms,
                luminance,
                stimulus_intensity: screen_color.intensity(),
            });
            self.buffers.push_luminance(LuminanceSample {
                t_ms,
                luminance,
                color: screen_color,
            });
        }

        // Vital signs only run on gate-admitted frames.
        let (hr, hrv_est) = if gate.passed {
            let hr = heart_rate::estimate(&mut self.buffers, &self.config);
            let hrv_est = hrv::estimate(&hr.filtered, &self.config);
            (hr, hrv_est)
        } else {
            (HeartRateEstimate::default(), HrvEstimate::default())
        };
        if hr.bpm_smoothed > 0.0 {
            self.last_bpm = hr.bpm_smoothed;
        }

        // Spoof analyzers run regardless, degrading on empty inputs.
        let green = self.buffers.green_vec();
        let sss_res = sss::analyze(face_img, self.config.sss_ratio_threshold);
        let moire_res = moire::analyze(face_img, self.config.moire_threshold);
        let chroma_res = chroma::check(face_img, screen_color, self.config.chroma_sensitivity);
        let texture_res = texture::analyze(&self.last_face);
        let flicker_res = flicker::analyze(&green, self.config.fps as f64);
        let static_res = static_signal::analyze(&green, self.config.min_signal_variance);
        let latency_res = temporal::latency_probe(
            &self.buffers.luminance,
            self.last_color_change_time,
            &self.config,
        );
        let xcorr_res = temporal::xcorr_probe(&self.buffers.temporal, &self.config);

        let mut details = Details::new();
        let raw_bpm: Vec<f64> = self.buffers.raw_bpm_history.iter().copied().collect();
        let inputs = FusionInputs {
            hr: &hr,
            hrv: &hrv_est,
            sss: &sss_res,
            chroma: &chroma_res,
            latency: &latency_res,
            xcorr: &xcorr_res,
            moire: &moire_res,
            stat: &static_res,
            texture: &texture_res,
            flicker: &flicker_res,
            green_len: self.buffers.green.len(),
            rgb_len: self.buffers.rgb.len(),
            raw_bpm_history: &raw_bpm,
            face_present: !self.last_face.is_empty(),
        };
        let outcome = fusion::fuse(&inputs, &self.config, &mut details);

        // Reported BPM stays inside the configured range or reads zero.
        let bpm = if (self.config.min_bpm..=self.config.max_bpm).contains(&hr.bpm_smoothed) {
            hr.bpm_smoothed.round() as u32
        } else {
            0
        };

        details.put_int("bpm", bpm as i64);
        details.put_float("bpm_signal_quality", round3(hr.signal_quality));
        details.put_float("hrv_rmssd", hrv_est.rmssd);
        details.put_float("hrv_sdnn", hrv_est.sdnn);
        details.put_float("hrv_entropy", hrv_est.entropy);
        details.put_bool("physics_passed", sss_res.passed);
        details.put_float("sss_ratio", sss_res.ratio);
        details.put_bool("chroma_passed", chroma_res.passed);
        details.put_bool("temporal_response_detected", latency_res.response_detected);
        details.put_float("temporal_delay_ms", latency_res.delay_ms);
        details.put_bool("temporal_biological", latency_res.is_biological);
        details.put_float("temporal_xcorr_delay_ms", xcorr_res.delay_ms);
        details.put_float("temporal_xcorr_strength", xcorr_res.strength);
        details.put_bool("temporal_xcorr_passed", xcorr_res.passed);
        details.put_bool("moire_detected", moire_res.detected);
        details.put_float("moire_score", moire_res.score);
        details.put_float("signal_variance", static_res.variance_pct);
        details.put_bool("is_static_image", static_res.is_static);
        details.put_bool("lighting_unstable", static_res.lighting_unstable);
        details.put_float("texture_uniformity", texture_res.score);
        details.put_bool("screen_texture_detected", texture_res.screen_like);
        details.put_bool("screen_flicker_detected", flicker_res.detected);
        details.put_float("screen_flicker_ratio", flicker_res.ratio);
        details.put_text("rppg_method", self.config.rppg_method.as_str());
        details.put_bool("quality_gate", gate.passed);
        details.put_text("quality_gate_reason", gate.reason);
        details.put_float("roi_blur_var", gate.blur_var);
        details.put_float("roi_exposure_clip_pct", gate.exposure_clip_pct);
        details.put_float("roi_motion_score", gate.motion_score);
        details.put_int("roi_min_dim", gate.roi_min_dim as i64);
        if let Some(reason) = outcome.forced_false_reason {
            details.put_text("forced_false_reason", reason);
        }

        LivenessResult {
            is_human: outcome.is_human,
            confidence: outcome.confidence,
            bpm,
            hrv_score: hrv_est.entropy,
            signal_quality: round3(hr.signal_quality),
            details,
        }
    }
}

/// Milliseconds of wall clock, used only when the caller omits timestamps.
fn wall_clock_ms() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}
