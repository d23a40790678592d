//! Persists a finished ranking run, one parent row plus one metadata
//! row per surfaced plant.

use tracing::warn;

use plantrec_core::error::{Error, Result};
use plantrec_core::traits::RecommendationStore;
use plantrec_core::types::{RecommendationRecord, SubmissionId};

use crate::recommend::RankedTiers;

/// Write every surfaced (plant, tier, metadata) tuple of a run, in tier
/// order. Each candidate is a two-step write: the recommendation row
/// first, then the metadata row under the store-assigned id. A metadata
/// failure after a successful parent write surfaces as `PartialWrite`
/// naming the orphaned recommendation; whether to roll the submission
/// back is the caller's call.
///
/// Returns the number of fully recorded candidates.
pub fn record_run(
    store: &dyn RecommendationStore,
    submission_id: SubmissionId,
    tiers: &RankedTiers,
) -> Result<usize> {
    let mut written = 0;
    for tier in tiers.tiers() {
        for (plant, metadata) in &tier.results {
            let record = RecommendationRecord {
                submission_id,
                tier: tier.tier,
                algorithm: tiers.algorithm,
                plant_id: plant.id,
            };
            let recommendation_id = store.create_recommendation(&record)?;
            if let Err(e) = store.create_metadata(recommendation_id, metadata) {
                warn!(recommendation_id, error = %e, "metadata write failed after parent row");
                return Err(Error::PartialWrite { recommendation_id });
            }
            written += 1;
        }
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use plantrec_core::types::{
        Algorithm, AlgorithmDetail, Plant, RecommendationId, RecommendationMetadata, ScoreStats,
        SubmissionHistory, Tier,
    };

    use crate::recommend::{RankedTier, RankedTiers};

    /// Store double that can be told to fail metadata writes after a
    /// number of successes.
    struct FlakyStore {
        recommendations: Mutex<Vec<RecommendationRecord>>,
        metadata: Mutex<Vec<RecommendationId>>,
        metadata_failures_after: usize,
    }

    impl FlakyStore {
        fn new(metadata_failures_after: usize) -> Self {
            Self {
                recommendations: Mutex::new(Vec::new()),
                metadata: Mutex::new(Vec::new()),
                metadata_failures_after,
            }
        }
    }

    impl RecommendationStore for FlakyStore {
        fn create_submission(&self, _free_text: Option<&str>) -> Result<i64> {
            Ok(1)
        }

        fn create_recommendation(&self, record: &RecommendationRecord) -> Result<RecommendationId> {
            let mut rows = self.recommendations.lock().expect("lock");
            rows.push(record.clone());
            Ok(rows.len() as RecommendationId)
        }

        fn create_metadata(
            &self,
            recommendation_id: RecommendationId,
            _metadata: &RecommendationMetadata,
        ) -> Result<()> {
            let mut rows = self.metadata.lock().expect("lock");
            if rows.len() >= self.metadata_failures_after {
                return Err(Error::Store("metadata table unavailable".to_string()));
            }
            rows.push(recommendation_id);
            Ok(())
        }

        fn add_rating(&self, _submission_id: i64, _rating: u8) -> Result<()> {
            Ok(())
        }

        fn list_submissions(&self, _include_unrated: bool) -> Result<Vec<SubmissionHistory>> {
            Ok(Vec::new())
        }

        fn purge_all(&self) -> Result<()> {
            Ok(())
        }
    }

    fn plant(id: i64) -> Plant {
        Plant {
            id,
            name: format!("plant-{id}"),
            growth: "fast".to_string(),
            soil: "moist".to_string(),
            sunlight: "full sunlight".to_string(),
            watering: "keep soil moist".to_string(),
            fertilization: "balanced".to_string(),
            image_url: None,
        }
    }

    fn metadata() -> RecommendationMetadata {
        RecommendationMetadata {
            stats: ScoreStats { score_raw: 1.0, score_norm: 1.0, score_percentile: 0.5, rank: 1 },
            detail: AlgorithmDetail::Sbert { cosine_distance: 0.0, gap_to_best: 0.0 },
        }
    }

    fn run_with(results_per_tier: usize) -> RankedTiers {
        let tier = |tier: Tier, offset: i64| RankedTier {
            tier,
            label: Algorithm::Sbert.tier_label(tier),
            results: (0..results_per_tier as i64)
                .map(|i| (plant(offset + i), metadata()))
                .collect(),
        };
        RankedTiers {
            algorithm: Algorithm::Sbert,
            perfect: tier(Tier::Perfect, 0),
            good: tier(Tier::Good, 100),
            mismatch: tier(Tier::Mismatch, 200),
        }
    }

    #[test]
    fn records_every_surfaced_candidate_in_tier_order() {
        let store = FlakyStore::new(usize::MAX);
        let written = record_run(&store, 7, &run_with(2)).expect("record");
        assert_eq!(written, 6);

        let rows = store.recommendations.lock().expect("lock");
        assert_eq!(rows.len(), 6);
        assert!(rows.iter().all(|r| r.submission_id == 7));
        assert_eq!(rows[0].tier, Tier::Perfect);
        assert_eq!(rows[2].tier, Tier::Good);
        assert_eq!(rows[4].tier, Tier::Mismatch);
        assert_eq!(store.metadata.lock().expect("lock").len(), 6);
    }

    #[test]
    fn metadata_failure_surfaces_the_orphaned_parent() {
        let store = FlakyStore::new(2);
        let err = record_run(&store, 7, &run_with(2)).expect_err("third metadata write fails");
        match err {
            Error::PartialWrite { recommendation_id } => assert_eq!(recommendation_id, 3),
            other => panic!("unexpected error: {other}"),
        }
        // The orphaned parent row is left in place for the caller.
        assert_eq!(store.recommendations.lock().expect("lock").len(), 3);
        assert_eq!(store.metadata.lock().expect("lock").len(), 2);
    }
}
