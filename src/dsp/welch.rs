//! Welch power spectral density estimation.
//!
//! Averaged periodograms over 50%-overlapped, Hamming-windowed, mean-
//! detrended segments, with one-sided density scaling. Segment length is
//! chosen by the caller (the HR estimator uses min(N, 128)).

use rustfft::num_complex::Complex64;
use rustfft::FftPlanner;
use std::f64::consts::PI;

/// One-sided PSD estimate: `freqs[k]` in Hz against `power[k]`.
#[derive(Debug, Clone, Default)]
pub struct Psd {
    pub freqs: Vec<f64>,
    pub power: Vec<f64>,
}

/// Symmetric Hamming window of length `m`.
fn hamming(m: usize) -> Vec<f64> {
    if m == 1 {
        return vec![1.0];
    }
    (0..m)
        .map(|n| 0.54 - 0.46 * (2.0 * PI * n as f64 / (m - 1) as f64).cos())
        .collect()
}

/// Welch estimate with `nperseg`-sample segments and 50% overlap.
/// Returns an empty `Psd` when the signal is shorter than one segment.
pub fn welch(x: &[f64], fs: f64, nperseg: usize) -> Psd {
    let nperseg = nperseg.min(x.len());
    if nperseg < 2 || fs <= 0.0 {
        return Psd::default();
    }
    let noverlap = nperseg / 2;
    let step = nperseg - noverlap;
    let win = hamming(nperseg);
    let win_sq: f64 = win.iter().map(|w| w * w).sum();
    let scale = 1.0 / (fs * win_sq);

    let fft = FftPlanner::<f64>::new().plan_fft_forward(nperseg);
    let n_bins = nperseg / 2 + 1;
    let mut acc = vec![0.0f64; n_bins];
    let mut segments = 0usize;
    let mut buf = vec![Complex64::new(0.0, 0.0); nperseg];

    let mut start = 0;
    while start + nperseg <= x.len() {
        let seg = &x[start..start + nperseg];
        let seg_mean = seg.iter().sum::<f64>() / nperseg as f64;
        for (i, (&s, &w)) in seg.iter().zip(&win).enumerate() {
            buf[i] = Complex64::new((s - seg_mean) * w, 0.0);
        }
        fft.process(&mut buf);
        for (k, slot) in acc.iter_mut().enumerate() {
            let mut p = buf[k].norm_sqr() * scale;
            // One-sided: double everything except DC and Nyquist.
            if k != 0 && !(nperseg % 2 == 0 && k == nperseg / 2) {
                p *= 2.0;
            }
            *slot += p;
        }
        segments += 1;
        start += step;
    }
    if segments == 0 {
        return Psd::default();
    }

    let inv = 1.0 / segments as f64;
    Psd {
        freqs: (0..n_bins).map(|k| k as f64 * fs / nperseg as f64).collect(),
        power: acc.into_iter().map(|p| p * inv).collect(),
    }
}
