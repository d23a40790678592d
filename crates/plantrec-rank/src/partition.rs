//! Splits a score vector into tier candidate index sets.

use rand::seq::SliceRandom;
use rand::Rng;

use plantrec_core::config::Band;

use crate::stats::percentile_threshold;

/// Indices of the `take` highest scores, score descending. Ties break by
/// corpus position so the selection is reproducible.
pub fn top_indices(scores: &[f64], take: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..scores.len()).collect();
    indices.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));
    indices.truncate(take);
    indices
}

/// Indices whose score falls inside the inclusive percentile band. When
/// the band holds more than `take` candidates, a uniform sample without
/// replacement is drawn; fewer than `take` returns them all, which may
/// undershoot the request and is accepted. On a single-valued vector
/// the thresholds coincide and the range still resolves.
pub fn band_indices<R: Rng>(scores: &[f64], band: Band, take: usize, rng: &mut R) -> Vec<usize> {
    let (Some(lower), Some(upper)) = (
        percentile_threshold(scores, band.lower),
        percentile_threshold(scores, band.upper),
    ) else {
        return Vec::new();
    };

    let candidates: Vec<usize> = scores
        .iter()
        .enumerate()
        .filter(|(_, &s)| s >= lower && s <= upper)
        .map(|(i, _)| i)
        .collect();

    if candidates.len() > take {
        candidates.choose_multiple(rng, take).copied().collect()
    } else {
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn top_indices_sorts_by_score_then_position() {
        let scores = [1.0, 5.0, 5.0, 3.0];
        assert_eq!(top_indices(&scores, 3), vec![1, 2, 3]);
        assert_eq!(top_indices(&scores, 10), vec![1, 2, 3, 0]);
        assert!(top_indices(&scores, 0).is_empty());
    }

    #[test]
    fn band_keeps_only_in_range_scores() {
        // Scores 1..10: 70th pct = 7.3, 90th = 9.1, so only 8 and 9 fall in.
        let scores: Vec<f64> = (1..=10).map(f64::from).collect();
        let band = Band { lower: 70.0, upper: 90.0 };
        let mut rng = StdRng::seed_from_u64(7);
        let mut picked = band_indices(&scores, band, 10, &mut rng);
        picked.sort_unstable();
        assert_eq!(picked, vec![7, 8], "scores 8 and 9 sit in the 70-90 band");
    }

    #[test]
    fn oversized_band_is_sampled_down() {
        let scores = vec![1.0; 50];
        let band = Band { lower: 0.0, upper: 100.0 };
        let mut rng = StdRng::seed_from_u64(1);
        let picked = band_indices(&scores, band, 8, &mut rng);
        assert_eq!(picked.len(), 8);
        let mut unique = picked.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), 8, "sampling is without replacement");
    }

    #[test]
    fn sampling_is_reproducible_per_seed() {
        let scores: Vec<f64> = (0..40).map(f64::from).collect();
        let band = Band { lower: 10.0, upper: 90.0 };
        let a = band_indices(&scores, band, 5, &mut StdRng::seed_from_u64(42));
        let b = band_indices(&scores, band, 5, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn degenerate_vectors_do_not_fail() {
        let band = Band { lower: 5.0, upper: 20.0 };
        let mut rng = StdRng::seed_from_u64(0);
        assert!(band_indices(&[], band, 3, &mut rng).is_empty());
        assert_eq!(band_indices(&[2.0], band, 3, &mut rng), vec![0]);
        // All-equal vector: thresholds coincide, everything is in band.
        assert_eq!(band_indices(&[1.0, 1.0, 1.0], band, 5, &mut rng).len(), 3);
    }
}
