// Percentile estimation by linear interpolation between closest ranks
//
// rank k = (n - 1) * p / 100, f = floor(k), c = min(f + 1, n - 1)
// result = x[f] + (x[c] - x[f]) * (k - f)

/// Percentile of an unsorted sample set
///
/// Returns `None` for an empty sample. `p` is clamped to `[0, 100]`.
///
/// # Example
/// ```
/// use policyproof::summary::percentile;
///
/// assert_eq!(percentile(&[40.0, 10.0, 30.0, 20.0], 50.0), Some(25.0));
/// assert_eq!(percentile(&[], 95.0), None);
/// ```
pub fn percentile(samples: &[f64], p: f64) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    percentile_sorted(&sorted, p)
}

/// Percentile of an already ascending-sorted sample set
pub fn percentile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }

    let p = p.clamp(0.0, 100.0);
    let k = (n - 1) as f64 * (p / 100.0);
    let f = k.floor() as usize;
    let c = (f + 1).min(n - 1);

    if f == c {
        return Some(sorted[f]);
    }
    Some(sorted[f] + (sorted[c] - sorted[f]) * (k - f as f64))
}
