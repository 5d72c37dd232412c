//! Synthetic frame builders for the end-to-end scenarios.
//!
//! Models the camera as base skin color + weak pulsatile component +
//! stimulus crosstalk, with deterministic hash-noise texture standing in
//! for skin micro-detail.

use prism_liveness::{BgrFrame, ScreenColor};
use std::f64::consts::PI;

/// Stimulus rotation used by the live harness.
pub const CYCLE: [ScreenColor; 4] = [
    ScreenColor::Red,
    ScreenColor::Blue,
    ScreenColor::Green,
    ScreenColor::White,
];

/// Color shown at `frame` with abrupt switches every `hold` frames.
pub fn color_at(frame: usize, hold: usize) -> ScreenColor {
    CYCLE[(frame / hold) % CYCLE.len()]
}

fn clip_u8(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Solid-color forehead ROI with a sinusoidal pulse (green-dominant, as
/// skin perfusion reads on camera) plus `crosstalk`-scaled stimulus
/// light.
pub fn pulsatile_roi(
    frame: usize,
    fps: f64,
    bpm: f64,
    stimulus: ScreenColor,
    crosstalk: f64,
) -> BgrFrame {
    let t = frame as f64 / fps;
    let pulse = (2.0 * PI * (bpm / 60.0) * t).sin();
    let (sr, sg, sb) = stimulus.unit_rgb();
    let r = 120.0 + 1.4 * pulse + crosstalk * sr;
    let g = 95.0 + 4.0 * pulse + crosstalk * sg;
    let b = 85.0 + 1.0 * pulse + crosstalk * sb;
    BgrFrame::solid(40, 30, clip_u8(b), clip_u8(g), clip_u8(r))
}

/// Face crop with non-periodic hash-noise texture (keeps the texture and
/// moire analyzers quiet) and stimulus crosstalk at strength 18, like a
/// face actually lit by the screen.
pub fn textured_face(stimulus: ScreenColor) -> BgrFrame {
    face_with_base(stimulus, 120.0, 95.0, 85.0)
}

/// Same texture with a strongly red-reflecting base, standing in for a
/// skin photo under a red screen.
pub fn reddish_face(stimulus: ScreenColor) -> BgrFrame {
    face_with_base(stimulus, 170.0, 95.0, 75.0)
}

fn face_with_base(stimulus: ScreenColor, r0: f64, g0: f64, b0: f64) -> BgrFrame {
    let (w, h) = (64usize, 64usize);
    let (sr, sg, sb) = stimulus.unit_rgb();
    let mut f = BgrFrame::solid(w, h, 0, 0, 0);
    for y in 0..h {
        for x in 0..w {
            let noise = ((x.wrapping_mul(2654435761) ^ y.wrapping_mul(40503)) >> 4) % 80;
            let n = noise as f64;
            f.set(y, x, 0, clip_u8(b0 + n + 18.0 * sb));
            f.set(y, x, 1, clip_u8(g0 + n + 18.0 * sg));
            f.set(y, x, 2, clip_u8(r0 + n + 18.0 * sr));
        }
    }
    f
}

/// Flat LCD-like face: a gentle gradient with almost no micro-texture.
pub fn flat_screen_face() -> BgrFrame {
    let (w, h) = (64usize, 64usize);
    let mut f = BgrFrame::solid(w, h, 0, 0, 0);
    for y in 0..h {
        for x in 0..w {
            let v = clip_u8(100.0 + x as f64 / 8.0);
            f.set(y, x, 0, v);
            f.set(y, x, 1, v);
            f.set(y, x, 2, v);
        }
    }
    f
}
