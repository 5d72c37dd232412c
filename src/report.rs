//! Per-frame decision record and its diagnostics bag.
//!
//! Every `process_frame` call produces one `LivenessResult`; nothing is
//! retained inside the engine. The diagnostics map is the only failure
//! channel - degraded analyzers report their defaults there instead of
//! propagating errors.

use serde::Serialize;
use std::collections::BTreeMap;

/// Heterogeneous diagnostic value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DetailValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl DetailValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DetailValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DetailValue::Float(v) => Some(*v),
            DetailValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DetailValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DetailValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

/// Ordered diagnostics map; keys are stable analyzer output names.
pub type Details = BTreeMap<String, DetailValue>;

/// Convenience inserters keeping call sites terse.
pub trait DetailsExt {
    fn put_bool(&mut self, key: &str, value: bool);
    fn put_int(&mut self, key: &str, value: i64);
    fn put_float(&mut self, key: &str, value: f64);
    fn put_text(&mut self, key: &str, value: &str);
}

impl DetailsExt for Details {
    fn put_bool(&mut self, key: &str, value: bool) {
        self.insert(key.to_string(), DetailValue::Bool(value));
    }

    fn put_int(&mut self, key: &str, value: i64) {
        self.insert(key.to_string(), DetailValue::Int(value));
    }

    fn put_float(&mut self, key: &str, value: f64) {
        self.insert(key.to_string(), DetailValue::Float(value));
    }

    fn put_text(&mut self, key: &str, value: &str) {
        self.insert(key.to_string(), DetailValue::Text(value.to_string()));
    }
}

/// Decision for one processed frame.
#[derive(Debug, Clone, Serialize)]
pub struct LivenessResult {
    /// Final live/spoof call after fusion and hard gates.
    pub is_human: bool,
    /// Fused confidence in [0, 100], one decimal.
    pub confidence: f64,
    /// Smoothed heart rate, 0 while warming up or invalid.
    pub bpm: u32,
    /// HRV Shannon entropy of the RR-interval distribution.
    pub hrv_score: f64,
    /// rPPG spectral quality in [0, 1], three decimals.
    pub signal_quality: f64,
    /// Open diagnostics from every analyzer that ran.
    pub details: Details,
}

impl LivenessResult {
    /// Degraded result carrying only diagnostics (warmup, hostile input).
    pub fn rejected(details: Details) -> Self {
        Self {
            is_human: false,
            confidence: 0.0,
            bpm: 0,
            hrv_score: 0.0,
            signal_quality: 0.0,
            details,
        }
    }
}

/// Rounds to one decimal (reported confidence resolution).
pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Rounds to three decimals (reported quality resolution).
pub fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}
