//! Peak picking over the filtered pulse waveform.
//!
//! Local maxima (plateaus collapse to their midpoint), thinned by a
//! minimum inter-peak distance (taller peaks win), then filtered by
//! topographic prominence.

/// Indices of peaks at least `distance` samples apart with prominence
/// of at least `min_prominence`.
pub fn find_peaks(x: &[f64], distance: usize, min_prominence: f64) -> Vec<usize> {
    let candidates = local_maxima(x);
    let spaced = enforce_distance(x, candidates, distance.max(1));
    spaced
        .into_iter()
        .filter(|&i| prominence(x, i) >= min_prominence)
        .collect()
}

/// Strict local maxima; a flat plateau bounded by lower samples yields
/// its midpoint.
fn local_maxima(x: &[f64]) -> Vec<usize> {
    let n = x.len();
    let mut peaks = Vec::new();
    let mut i = 1;
    while n >= 3 && i < n - 1 {
        if x[i - 1] < x[i] {
            // Walk the plateau.
            let mut j = i;
            while j + 1 < n && x[j + 1] == x[i] {
                j += 1;
            }
            if j + 1 < n && x[j + 1] < x[i] {
                peaks.push((i + j) / 2);
            }
            i = j + 1;
        } else {
            i += 1;
        }
    }
    peaks
}

/// Keeps the tallest peaks first, removing any neighbour closer than
/// `distance` samples.
fn enforce_distance(x: &[f64], mut peaks: Vec<usize>, distance: usize) -> Vec<usize> {
    if peaks.len() < 2 {
        return peaks;
    }
    let mut order: Vec<usize> = (0..peaks.len()).collect();
    order.sort_by(|&a, &b| x[peaks[b]].total_cmp(&x[peaks[a]]));
    let mut keep = vec![true; peaks.len()];
    for &idx in &order {
        if !keep[idx] {
            continue;
        }
        let pos = peaks[idx];
        for (other, &opos) in peaks.iter().enumerate() {
            if other != idx && keep[other] && opos.abs_diff(pos) < distance {
                // The taller peak was visited first and survives.
                if x[opos] <= x[pos] {
                    keep[other] = false;
                }
            }
        }
    }
    peaks = peaks
        .into_iter()
        .enumerate()
        .filter(|(i, _)| keep[*i])
        .map(|(_, p)| p)
        .collect();
    peaks
}

/// Topographic prominence: height above the higher of the two valley
/// minima between this peak and the nearest strictly-higher terrain
/// (or the signal edge).
fn prominence(x: &[f64], peak: usize) -> f64 {
    let h = x[peak];

    let mut left_min = h;
    let mut i = peak;
    while i > 0 {
        i -= 1;
        if x[i] > h {
            break;
        }
        left_min = left_min.min(x[i]);
    }

    let mut right_min = h;
    let mut i = peak;
    while i + 1 < x.len() {
        i += 1;
        if x[i] > h {
            break;
        }
        right_min = right_min.min(x[i]);
    }

    h - left_min.max(right_min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn finds_sine_peaks_at_the_beat_period() {
        // 1.3 Hz at 30 fps: one peak every ~23 samples.
        let fs = 30.0;
        let x: Vec<f64> = (0..300)
            .map(|i| (2.0 * PI * 1.3 * i as f64 / fs).sin())
            .collect();
        let peaks = find_peaks(&x, (0.4 * fs) as usize, 0.3);
        assert!(peaks.len() >= 11 && peaks.len() <= 14, "{} peaks", peaks.len());
        for w in peaks.windows(2) {
            let gap = w[1] - w[0];
            assert!((20..=26).contains(&gap), "gap {gap}");
        }
    }

    #[test]
    fn distance_suppresses_the_smaller_neighbour() {
        let x = vec![0.0, 1.0, 0.5, 0.9, 0.0, 0.0, 0.0, 0.8, 0.0];
        let peaks = find_peaks(&x, 4, 0.1);
        assert_eq!(peaks, vec![1, 7]);
    }

    #[test]
    fn prominence_filters_ripples() {
        let x = vec![0.0, 5.0, 4.9, 5.05, 0.0];
        // The 5.05 summit dwarfs the 0.15 ripple at index 1.
        let peaks = find_peaks(&x, 1, 1.0);
        assert_eq!(peaks, vec![3]);
    }

    #[test]
    fn plateau_collapses_to_midpoint() {
        let x = vec![0.0, 2.0, 2.0, 2.0, 0.0];
        assert_eq!(local_maxima(&x), vec![2]);
    }

    #[test]
    fn flat_signal_has_no_peaks() {
        assert!(find_peaks(&[1.0; 40], 3, 0.1).is_empty());
    }
}
