//! Butterworth bandpass design and zero-phase filtering.
//!
//! Design follows the classical analog-prototype route: Butterworth pole
//! placement, lowpass→bandpass transform, bilinear mapping with frequency
//! pre-warping, then expansion to transfer-function coefficients. The
//! zero-phase pass runs the filter forward and backward over an
//! odd-extended signal with steady-state initial conditions, so filter
//! transients do not leak into the analysis window.

use rustfft::num_complex::Complex64;
use std::f64::consts::PI;

/// Digital bandpass transfer function, `b` over `a`, with `a[0] == 1`.
#[derive(Debug, Clone)]
pub struct Bandpass {
    pub b: Vec<f64>,
    pub a: Vec<f64>,
}

impl Bandpass {
    /// Designs an order-`order` Butterworth bandpass. `low` and `high`
    /// are normalized to Nyquist and must satisfy 0 < low < high < 1.
    pub fn design(order: usize, low: f64, high: f64) -> Option<Self> {
        if order == 0 || !(low > 0.0 && low < high && high < 1.0) {
            return None;
        }

        // Pre-warp the band edges (bilinear sampling rate fs = 2).
        let warped_lo = 4.0 * (PI * low / 2.0).tan();
        let warped_hi = 4.0 * (PI * high / 2.0).tan();
        let bw = warped_hi - warped_lo;
        let wo = (warped_lo * warped_hi).sqrt();

        // Analog lowpass prototype: poles on the unit left half-circle.
        let n = order as i32;
        let mut proto = Vec::with_capacity(order);
        for k in 0..order {
            let m = (-(n - 1) + 2 * k as i32) as f64;
            let theta = PI * m / (2.0 * n as f64);
            proto.push(-Complex64::new(theta.cos(), theta.sin()));
        }

        // Lowpass → bandpass: each pole splits into a conjugate pair,
        // `order` zeros appear at s = 0, gain scales by bw^order.
        let half_bw = Complex64::new(bw / 2.0, 0.0);
        let wo2 = Complex64::new(wo * wo, 0.0);
        let mut poles = Vec::with_capacity(2 * order);
        for p in &proto {
            let scaled = p * half_bw;
            let disc = (scaled * scaled - wo2).sqrt();
            poles.push(scaled + disc);
            poles.push(scaled - disc);
        }
        let zeros = vec![Complex64::new(0.0, 0.0); order];
        let gain = bw.powi(n);

        // Bilinear transform at fs = 2 (fs2 = 4).
        let fs2 = Complex64::new(4.0, 0.0);
        let z_digital: Vec<Complex64> = zeros.iter().map(|z| (fs2 + z) / (fs2 - z)).collect();
        let p_digital: Vec<Complex64> = poles.iter().map(|p| (fs2 + p) / (fs2 - p)).collect();
        let mut num = Complex64::new(1.0, 0.0);
        for z in &zeros {
            num *= fs2 - z;
        }
        let mut den = Complex64::new(1.0, 0.0);
        for p in &poles {
            den *= fs2 - p;
        }
        let k_digital = gain * (num / den).re;

        // Degree deficit maps the remaining zeros to z = -1.
        let mut z_all = z_digital;
        z_all.resize(p_digital.len(), Complex64::new(-1.0, 0.0));

        let mut b = poly_real(&z_all);
        for c in b.iter_mut() {
            *c *= k_digital;
        }
        let a = poly_real(&p_digital);
        Some(Self { b, a })
    }
}

/// Expands a monic polynomial from its roots; conjugate-paired roots
/// leave only real coefficients.
fn poly_real(roots: &[Complex64]) -> Vec<f64> {
    let mut coeffs = vec![Complex64::new(1.0, 0.0)];
    for r in roots {
        coeffs.push(Complex64::new(0.0, 0.0));
        for i in (1..coeffs.len()).rev() {
            let prev = coeffs[i - 1];
            coeffs[i] -= r * prev;
        }
    }
    coeffs.into_iter().map(|c| c.re).collect()
}

/// Direct-form II transposed filter with explicit initial state.
/// Returns the output; the state slice is left at its final value.
fn lfilter(b: &[f64], a: &[f64], x: &[f64], state: &mut [f64]) -> Vec<f64> {
    let n = state.len();
    let mut y = Vec::with_capacity(x.len());
    for &xv in x {
        let yv = b[0] * xv + state[0];
        for i in 0..n {
            let next = if i + 1 < n { state[i + 1] } else { 0.0 };
            let bc = if i + 1 < b.len() { b[i + 1] } else { 0.0 };
            let ac = if i + 1 < a.len() { a[i + 1] } else { 0.0 };
            state[i] = bc * xv + next - ac * yv;
        }
        y.push(yv);
    }
    y
}

/// Steady-state initial filter conditions for a unit step, so the
/// forward and backward passes start transient-free.
fn lfilter_zi(b: &[f64], a: &[f64]) -> Vec<f64> {
    let n = a.len().max(b.len());
    let dim = n - 1;
    // (I - C^T) zi = b[1:] - a[1:] * b[0], C the companion matrix of a.
    let mut m = vec![vec![0.0; dim]; dim];
    for i in 0..dim {
        m[i][i] = 1.0;
        m[i][0] += a.get(i + 1).copied().unwrap_or(0.0);
        if i + 1 < dim {
            m[i][i + 1] -= 1.0;
        }
    }
    let mut rhs: Vec<f64> = (0..dim)
        .map(|i| {
            b.get(i + 1).copied().unwrap_or(0.0) - a.get(i + 1).copied().unwrap_or(0.0) * b[0]
        })
        .collect();
    solve_dense(&mut m, &mut rhs);
    rhs
}

/// Gaussian elimination with partial pivoting; overwrites `rhs` with the
/// solution. Singular systems (which the companion form does not produce
/// for a stable filter) fall back to a zero state.
fn solve_dense(m: &mut [Vec<f64>], rhs: &mut [f64]) {
    let n = rhs.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| m[i][col].abs().total_cmp(&m[j][col].abs()))
            .unwrap_or(col);
        if m[pivot][col].abs() < 1e-300 {
            rhs.iter_mut().for_each(|v| *v = 0.0);
            return;
        }
        m.swap(col, pivot);
        rhs.swap(col, pivot);
        for row in col + 1..n {
            let f = m[row][col] / m[col][col];
            for k in col..n {
                m[row][k] -= f * m[col][k];
            }
            rhs[row] -= f * rhs[col];
        }
    }
    for col in (0..n).rev() {
        let mut acc = rhs[col];
        for k in col + 1..n {
            acc -= m[col][k] * rhs[k];
        }
        rhs[col] = acc / m[col][col];
    }
}

/// Zero-phase forward-backward filtering with odd-extension padding.
/// Returns `None` when the signal is too short to pad (fewer than two
/// samples).
pub fn filtfilt(filter: &Bandpass, x: &[f64]) -> Option<Vec<f64>> {
    let (b, a) = (&filter.b, &filter.a);
    if x.len() < 2 {
        return None;
    }
    let ntaps = a.len().max(b.len());
    let padlen = (3 * ntaps).min(x.len() - 1);

    // Odd extension around both endpoints.
    let n = x.len();
    let mut ext = Vec::with_capacity(n + 2 * padlen);
    for j in (1..=padlen).rev() {
        ext.push(2.0 * x[0] - x[j]);
    }
    ext.extend_from_slice(x);
    for j in 1..=padlen {
        ext.push(2.0 * x[n - 1] - x[n - 1 - j]);
    }

    let zi = lfilter_zi(b, a);

    // Forward pass.
    let mut state: Vec<f64> = zi.iter().map(|z| z * ext[0]).collect();
    let fwd = lfilter(b, a, &ext, &mut state);

    // Backward pass over the reversed forward output.
    let rev: Vec<f64> = fwd.iter().rev().cloned().collect();
    let mut state: Vec<f64> = zi.iter().map(|z| z * rev[0]).collect();
    let bwd = lfilter(b, a, &rev, &mut state);

    let mut out: Vec<f64> = bwd.into_iter().rev().collect();
    out.drain(..padlen);
    out.truncate(n);
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn design_rppg() -> Bandpass {
        // 0.75-3.0 Hz at 30 fps, normalized to the 15 Hz Nyquist.
        Bandpass::design(3, 0.05, 0.2).unwrap()
    }

    #[test]
    fn design_shape_and_normalization() {
        let f = design_rppg();
        assert_eq!(f.b.len(), 7);
        assert_eq!(f.a.len(), 7);
        assert!((f.a[0] - 1.0).abs() < 1e-9);
        // Bandpass numerator is k*(z^2 - 1)^3: odd taps vanish.
        assert!(f.b[1].abs() < 1e-9);
        assert!(f.b[3].abs() < 1e-9);
        assert!(f.b[5].abs() < 1e-9);
        assert!((f.b[2] + 3.0 * f.b[0]).abs() < 1e-9);
    }

    #[test]
    fn design_rejects_bad_bands() {
        assert!(Bandpass::design(3, 0.2, 0.05).is_none());
        assert!(Bandpass::design(3, 0.0, 0.5).is_none());
        assert!(Bandpass::design(3, 0.1, 1.0).is_none());
    }

    #[test]
    fn filtfilt_rejects_dc() {
        let f = design_rppg();
        let x = vec![5.0; 120];
        let y = filtfilt(&f, &x).unwrap();
        assert_eq!(y.len(), x.len());
        assert!(y.iter().all(|v| v.abs() < 1e-6));
    }

    #[test]
    fn filtfilt_passes_inband_sine_without_phase_shift() {
        let f = design_rppg();
        // 1.3 Hz at 30 fps sits inside the 0.75-3.0 Hz passband.
        let x: Vec<f64> = (0..300)
            .map(|i| (2.0 * PI * 1.3 * i as f64 / 30.0).sin())
            .collect();
        let y = filtfilt(&f, &x).unwrap();
        // Compare away from the ends where padding effects live.
        let mut dot = 0.0;
        let mut ex = 0.0;
        let mut ey = 0.0;
        for i in 60..240 {
            dot += x[i] * y[i];
            ex += x[i] * x[i];
            ey += y[i] * y[i];
        }
        let corr = dot / (ex * ey).sqrt();
        assert!(corr > 0.99, "zero-phase correlation was {corr}");
        let gain = (ey / ex).sqrt();
        assert!((gain - 1.0).abs() < 0.15, "passband gain was {gain}");
    }

    #[test]
    fn filtfilt_attenuates_out_of_band_sine() {
        let f = design_rppg();
        // 6 Hz is well above the 3 Hz upper edge.
        let x: Vec<f64> = (0..300)
            .map(|i| (2.0 * PI * 6.0 * i as f64 / 30.0).sin())
            .collect();
        let y = filtfilt(&f, &x).unwrap();
        let peak = y[60..240].iter().fold(0.0f64, |m, v| m.max(v.abs()));
        assert!(peak < 0.1, "stopband leakage was {peak}");
    }
}
