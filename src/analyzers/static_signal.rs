//! Static-signal probe: is the green channel alive at all?
//!
//! A printed photo or frozen frame has essentially zero temporal
//! variance; real skin under a breathing subject never does. Extreme
//! variance the other way marks unstable lighting.

use crate::dsp::stats::{mean, std_dev};

/// Samples required before the probe speaks.
const MIN_SAMPLES: usize = 60;

/// Probe window over the newest samples.
const WINDOW: usize = 90;

/// Percent variance above which lighting is considered unstable.
const LIGHTING_UNSTABLE_PCT: f64 = 25.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct StaticSignalResult {
    /// Coefficient of variation, percent.
    pub variance_pct: f64,
    pub is_static: bool,
    pub lighting_unstable: bool,
    /// True when the probe ran and the signal moves like a live one.
    pub alive: bool,
}

/// Evaluates the last [`WINDOW`] green samples. Below [`MIN_SAMPLES`]
/// the zero record is returned.
pub fn analyze(green: &[f64], min_signal_variance: f64) -> StaticSignalResult {
    if green.len() < MIN_SAMPLES {
        return StaticSignalResult::default();
    }
    let tail = &green[green.len().saturating_sub(WINDOW)..];
    let variance_pct = 100.0 * std_dev(tail) / mean(tail).max(1.0);
    let is_static = variance_pct < min_signal_variance;

    StaticSignalResult {
        variance_pct,
        is_static,
        lighting_unstable: variance_pct > LIGHTING_UNSTABLE_PCT,
        alive: !is_static,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn cold_buffer_is_neither_static_nor_alive() {
        let r = analyze(&vec![100.0; 59], 0.4);
        assert!(!r.is_static);
        assert!(!r.alive);
        assert_eq!(r.variance_pct, 0.0);
    }

    #[test]
    fn frozen_signal_is_static() {
        let r = analyze(&vec![120.0; 90], 0.4);
        assert!(r.is_static);
        assert!(!r.alive);
        assert!(r.variance_pct < 0.4);
    }

    #[test]
    fn pulsatile_signal_is_alive() {
        let x: Vec<f64> = (0..90)
            .map(|i| 95.0 + 4.0 * (2.0 * PI * 1.3 * i as f64 / 30.0).sin())
            .collect();
        let r = analyze(&x, 0.4);
        assert!(!r.is_static);
        assert!(r.alive);
        assert!(!r.lighting_unstable);
    }

    #[test]
    fn wild_swings_flag_lighting() {
        let x: Vec<f64> = (0..90)
            .map(|i| if i % 2 == 0 { 20.0 } else { 220.0 })
            .collect();
        let r = analyze(&x, 0.4);
        assert!(r.lighting_unstable);
    }

    #[test]
    fn only_the_newest_window_counts() {
        // 120 samples: a dead first half must not mask a live tail.
        let mut x = vec![100.0; 30];
        x.extend((0..90).map(|i| 95.0 + 4.0 * (2.0 * PI * 1.3 * i as f64 / 30.0).sin()));
        let r = analyze(&x, 0.4);
        assert!(r.alive);
    }
}
