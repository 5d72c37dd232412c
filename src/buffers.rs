//! Bounded signal history shared by the analyzers.
//!
//! Every FIFO here is a ring: pushing at capacity evicts the oldest
//! entry, so memory stays bounded for arbitrarily long sessions. The
//! green/RGB buffers advance in lockstep with gate-admitted frames; the
//! temporal/luminance buffers advance with every non-empty face frame.

use crate::stimulus::ScreenColor;
use std::collections::VecDeque;

/// Capacity of the stimulus/luminance cross-correlation buffer.
pub const TEMPORAL_CAPACITY: usize = 120;

/// Capacity of the flash-latency luminance buffer.
pub const LUMINANCE_CAPACITY: usize = 60;

/// Smoothing window of (bpm, quality) estimates.
pub const BPM_HISTORY_CAPACITY: usize = 10;

/// Raw-BPM window behind the anti-photo stability penalty.
pub const RAW_BPM_CAPACITY: usize = 30;

/// Recorded stimulus color switches.
pub const COLOR_CHANGE_CAPACITY: usize = 10;

/// One cross-correlation sample: when, how bright, how much light we emitted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemporalSample {
    pub t_ms: f64,
    pub luminance: f64,
    pub stimulus_intensity: f64,
}

/// One latency-probe sample tagged with the stimulus color shown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LuminanceSample {
    pub t_ms: f64,
    pub luminance: f64,
    pub color: ScreenColor,
}

fn push_bounded<T>(buf: &mut VecDeque<T>, capacity: usize, value: T) {
    if buf.len() == capacity {
        buf.pop_front();
    }
    buf.push_back(value);
}

/// All ring buffers of one session.
#[derive(Debug)]
pub struct SignalBuffers {
    capacity: usize,
    pub green: VecDeque<f64>,
    pub rgb: VecDeque<[f64; 3]>,
    pub temporal: VecDeque<TemporalSample>,
    pub luminance: VecDeque<LuminanceSample>,
    pub bpm_history: VecDeque<(f64, f64)>,
    pub raw_bpm_history: VecDeque<f64>,
    pub color_changes: VecDeque<(ScreenColor, f64)>,
}

impl SignalBuffers {
    /// `capacity` is the green/RGB buffer size (`buffer_size`).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            green: VecDeque::with_capacity(capacity),
            rgb: VecDeque::with_capacity(capacity),
            temporal: VecDeque::with_capacity(TEMPORAL_CAPACITY),
            luminance: VecDeque::with_capacity(LUMINANCE_CAPACITY),
            bpm_history: VecDeque::with_capacity(BPM_HISTORY_CAPACITY),
            raw_bpm_history: VecDeque::with_capacity(RAW_BPM_CAPACITY),
            color_changes: VecDeque::with_capacity(COLOR_CHANGE_CAPACITY),
        }
    }

    /// Admits one gate-passed frame into both pulse buffers at once;
    /// they must never drift apart.
    pub fn push_pulse_sample(&mut self, green_mean: f64, rgb_mean: [f64; 3]) {
        push_bounded(&mut self.green, self.capacity, green_mean);
        push_bounded(&mut self.rgb, self.capacity, rgb_mean);
    }

    pub fn push_temporal(&mut self, sample: TemporalSample) {
        push_bounded(&mut self.temporal, TEMPORAL_CAPACITY, sample);
    }

    pub fn push_luminance(&mut self, sample: LuminanceSample) {
        push_bounded(&mut self.luminance, LUMINANCE_CAPACITY, sample);
    }

    pub fn push_bpm(&mut self, bpm: f64, quality: f64) {
        push_bounded(&mut self.bpm_history, BPM_HISTORY_CAPACITY, (bpm, quality));
    }

    pub fn push_raw_bpm(&mut self, bpm: f64) {
        push_bounded(&mut self.raw_bpm_history, RAW_BPM_CAPACITY, bpm);
    }

    pub fn push_color_change(&mut self, color: ScreenColor, t_ms: f64) {
        push_bounded(&mut self.color_changes, COLOR_CHANGE_CAPACITY, (color, t_ms));
    }

    /// Green history as a contiguous slice-friendly vector.
    pub fn green_vec(&self) -> Vec<f64> {
        self.green.iter().copied().collect()
    }

    /// RGB history as rows of [r, g, b].
    pub fn rgb_rows(&self) -> Vec<[f64; 3]> {
        self.rgb.iter().copied().collect()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops all history; capacities are retained.
    pub fn clear(&mut self) {
        self.green.clear();
        self.rgb.clear();
        self.temporal.clear();
        self.luminance.clear();
        self.bpm_history.clear();
        self.raw_bpm_history.clear();
        self.color_changes.clear();
    }
}
