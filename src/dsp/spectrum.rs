//! FFT magnitude helpers: one-sided real spectra and centered 2-D spectra.

use rustfft::num_complex::Complex64;
use rustfft::FftPlanner;

/// One-sided magnitude spectrum |X_k| for k in 0..=N/2.
pub fn real_fft_magnitudes(x: &[f64]) -> Vec<f64> {
    if x.is_empty() {
        return Vec::new();
    }
    let n = x.len();
    let mut buf: Vec<Complex64> = x.iter().map(|&v| Complex64::new(v, 0.0)).collect();
    FftPlanner::<f64>::new().plan_fft_forward(n).process(&mut buf);
    buf.iter().take(n / 2 + 1).map(|c| c.norm()).collect()
}

/// 2-D FFT magnitude with the zero-frequency bin shifted to the center
/// (row h/2, column w/2). Returns a row-major plane of the input shape.
pub fn fft2_centered_magnitude(plane: &[f64], w: usize, h: usize) -> Vec<f64> {
    if w == 0 || h == 0 {
        return Vec::new();
    }
    let mut planner = FftPlanner::<f64>::new();
    let row_fft = planner.plan_fft_forward(w);
    let col_fft = planner.plan_fft_forward(h);

    let mut grid: Vec<Complex64> = plane.iter().map(|&v| Complex64::new(v, 0.0)).collect();

    for row in grid.chunks_exact_mut(w) {
        row_fft.process(row);
    }
    let mut col = vec![Complex64::new(0.0, 0.0); h];
    for x in 0..w {
        for y in 0..h {
            col[y] = grid[y * w + x];
        }
        col_fft.process(&mut col);
        for y in 0..h {
            grid[y * w + x] = col[y];
        }
    }

    // fftshift: move DC to (h/2, w/2).
    let mut out = vec![0.0f64; w * h];
    for y in 0..h {
        let sy = (y + h / 2) % h;
        for x in 0..w {
            let sx = (x + w / 2) % w;
            out[sy * w + sx] = grid[y * w + x].norm();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn real_fft_single_tone_bin() {
        let n = 64;
        let k0 = 5;
        let x: Vec<f64> = (0..n)
            .map(|i| (2.0 * PI * k0 as f64 * i as f64 / n as f64).cos())
            .collect();
        let mags = real_fft_magnitudes(&x);
        let peak = mags
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, k0);
        // A unit cosine concentrates N/2 magnitude in its bin.
        assert!((mags[k0] - n as f64 / 2.0).abs() < 1e-6);
    }

    #[test]
    fn fft2_dc_lands_in_the_center() {
        let (w, h) = (8, 6);
        let plane = vec![1.0; w * h];
        let mag = fft2_centered_magnitude(&plane, w, h);
        let center = (h / 2) * w + w / 2;
        assert!((mag[center] - (w * h) as f64).abs() < 1e-9);
        let off_center: f64 = mag
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != center)
            .map(|(_, v)| *v)
            .sum();
        assert!(off_center < 1e-6);
    }

    #[test]
    fn fft2_grid_pattern_produces_side_peaks() {
        // Vertical stripes with period 4 put energy off the DC bin.
        let (w, h) = (32, 32);
        let plane: Vec<f64> = (0..w * h)
            .map(|i| if (i % w) % 4 < 2 { 255.0 } else { 0.0 })
            .collect();
        let mag = fft2_centered_magnitude(&plane, w, h);
        let center = (h / 2) * w + w / 2;
        let side = (h / 2) * w + (w / 2 + w / 4);
        assert!(mag[side] > 0.1 * mag[center]);
    }
}
