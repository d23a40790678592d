//! Score-vector statistics: normalization, percentiles and dense ranks.
//!
//! Degenerate vectors (single-valued, or fewer than two elements) get
//! defined fallbacks everywhere; none of these functions can fail.

pub fn round_to(v: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (v * factor).round() / factor
}

/// Min-max normalization into [0, 1], rounded to 2 decimals. An
/// all-equal vector would divide by zero; every score then normalizes
/// to 0.0.
pub fn min_max_normalized(score: f64, min: f64, max: f64) -> f64 {
    if max == min {
        0.0
    } else {
        round_to((score - min) / (max - min), 2)
    }
}

/// Fraction of scores strictly below `score`, rounded to 3 decimals.
pub fn percentile_below(score: f64, scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let below = scores.iter().filter(|&&s| s < score).count();
    round_to(below as f64 / scores.len() as f64, 3)
}

/// 1-based rank among distinct score values sorted descending. Tied
/// scores share a rank; this is the one rank rule used by both ranking
/// algorithms.
pub fn dense_rank(score: f64, scores: &[f64]) -> usize {
    let mut above: Vec<f64> = scores.iter().copied().filter(|&s| s > score).collect();
    above.sort_by(f64::total_cmp);
    above.dedup();
    above.len() + 1
}

/// Score value at the given percentile (0-100) under linear
/// interpolation, the numpy convention. `None` only for an empty vector.
pub fn percentile_threshold(scores: &[f64], percentile: f64) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    let mut sorted = scores.to_vec();
    sorted.sort_by(f64::total_cmp);
    if sorted.len() == 1 {
        return Some(sorted[0]);
    }
    let p = percentile.clamp(0.0, 100.0);
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}
