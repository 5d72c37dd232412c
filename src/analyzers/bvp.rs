//! Blood-volume-pulse extraction from windowed RGB means.
//!
//! All three classical projections start from the same per-channel mean
//! normalization, which makes the extracted pulse invariant to
//! per-channel affine rescaling of the window.

use crate::config::RppgMethod;
use crate::dsp::stats::std_dev;

const EPS: f64 = 1e-9;

/// Per-channel mean normalization: `c = v / mean - 1`, means clamped
/// away from zero.
fn normalize(window: &[[f64; 3]]) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let n = window.len() as f64;
    let mut means = [0.0f64; 3];
    for row in window {
        for c in 0..3 {
            means[c] += row[c];
        }
    }
    for m in means.iter_mut() {
        *m = (*m / n).max(1e-6);
    }
    let mut r = Vec::with_capacity(window.len());
    let mut g = Vec::with_capacity(window.len());
    let mut b = Vec::with_capacity(window.len());
    for row in window {
        r.push(row[0] / means[0] - 1.0);
        g.push(row[1] / means[1] - 1.0);
        b.push(row[2] / means[2] - 1.0);
    }
    (r, g, b)
}

/// Extracts the 1-D BVP from a window of [r, g, b] rows.
pub fn extract(window: &[[f64; 3]], method: RppgMethod) -> Vec<f64> {
    if window.is_empty() {
        return Vec::new();
    }
    let (r, g, b) = normalize(window);
    match method {
        RppgMethod::Green => g,
        RppgMethod::Chrom => {
            // de Haan & Jeanne: x = 3r - 2g, y = 1.5r + g - 1.5b.
            let x: Vec<f64> = r.iter().zip(&g).map(|(r, g)| 3.0 * r - 2.0 * g).collect();
            let y: Vec<f64> = r
                .iter()
                .zip(&g)
                .zip(&b)
                .map(|((r, g), b)| 1.5 * r + g - 1.5 * b)
                .collect();
            let sy = std_dev(&y);
            let alpha = if sy > 0.0 { std_dev(&x) / (sy + EPS) } else { 1.0 };
            x.iter().zip(&y).map(|(x, y)| x - alpha * y).collect()
        }
        RppgMethod::Pos => {
            // Wang et al.: x = g - b, y = -2r + g + b.
            let x: Vec<f64> = g.iter().zip(&b).map(|(g, b)| g - b).collect();
            let y: Vec<f64> = r
                .iter()
                .zip(&g)
                .zip(&b)
                .map(|((r, g), b)| -2.0 * r + g + b)
                .collect();
            let alpha = std_dev(&x) / (std_dev(&y) + EPS);
            x.iter().zip(&y).map(|(x, y)| x + alpha * y).collect()
        }
    }
}
