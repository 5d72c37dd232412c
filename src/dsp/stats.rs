//! Shared scalar statistics for the signal chain.

/// Arithmetic mean, 0.0 on empty input.
pub fn mean(x: &[f64]) -> f64 {
    if x.is_empty() {
        return 0.0;
    }
    x.iter().sum::<f64>() / x.len() as f64
}

/// Population variance, 0.0 on empty input.
pub fn variance(x: &[f64]) -> f64 {
    if x.is_empty() {
        return 0.0;
    }
    let m = mean(x);
    x.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / x.len() as f64
}

/// Population standard deviation.
pub fn std_dev(x: &[f64]) -> f64 {
    variance(x).sqrt()
}

/// Removes the least-squares line from the signal in place.
pub fn detrend_linear(x: &mut [f64]) {
    let n = x.len();
    if n < 2 {
        return;
    }
    // Closed-form fit against t = 0..n-1.
    let nf = n as f64;
    let t_mean = (nf - 1.0) * 0.5;
    let x_mean = mean(x);
    let mut num = 0.0;
    let mut den = 0.0;
    for (i, v) in x.iter().enumerate() {
        let dt = i as f64 - t_mean;
        num += dt * (v - x_mean);
        den += dt * dt;
    }
    let slope = if den > 0.0 { num / den } else { 0.0 };
    let intercept = x_mean - slope * t_mean;
    for (i, v) in x.iter_mut().enumerate() {
        *v -= intercept + slope * i as f64;
    }
}

/// Z-scores the signal in place. Returns false (leaving the input
/// untouched) when the standard deviation is zero.
pub fn zscore(x: &mut [f64]) -> bool {
    let m = mean(x);
    let s = std_dev(x);
    if s <= 0.0 {
        return false;
    }
    for v in x.iter_mut() {
        *v = (*v - m) / s;
    }
    true
}

/// Shannon entropy (nats) of a 10-bin histogram of the samples, with
/// empty bins dropped. Degenerate spreads collapse to a single bin and
/// therefore zero entropy.
pub fn histogram_entropy(x: &[f64], bins: usize) -> f64 {
    if x.is_empty() || bins == 0 {
        return 0.0;
    }
    let lo = x.iter().cloned().fold(f64::INFINITY, f64::min);
    let hi = x.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let span = hi - lo;
    let mut counts = vec![0usize; bins];
    if span <= 0.0 {
        counts[0] = x.len();
    } else {
        for &v in x {
            let mut idx = ((v - lo) / span * bins as f64) as usize;
            if idx >= bins {
                idx = bins - 1;
            }
            counts[idx] += 1;
        }
    }
    let total = x.len() as f64;
    let mut h = 0.0;
    for &c in counts.iter().filter(|&&c| c > 0) {
        let p = c as f64 / total;
        h -= p * p.ln();
    }
    h
}

/// First differences, one element shorter than the input.
pub fn diff(x: &[f64]) -> Vec<f64> {
    x.windows(2).map(|w| w[1] - w[0]).collect()
}
