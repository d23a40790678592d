//! The recommendation pipeline: one scoring run fanned out into three
//! tiers, image-preferred, truncated and enriched, ready for
//! serialization and recording.

use rand::Rng;
use tracing::debug;

use plantrec_core::config::RankingSettings;
use plantrec_core::error::{Error, Result};
use plantrec_core::query::Query;
use plantrec_core::traits::Scorer;
use plantrec_core::types::{
    Algorithm, Plant, RecommendationMetadata, ScoreVector, Tier, TierCounts,
};

use crate::enrich::enrich;
use crate::image::prefer_images;
use crate::partition::{band_indices, top_indices};

/// One tier of a finished ranking run.
#[derive(Debug, Clone)]
pub struct RankedTier {
    pub tier: Tier,
    /// Stored label, e.g. "BM25_perfect".
    pub label: String,
    pub results: Vec<(Plant, RecommendationMetadata)>,
}

/// Everything one `rank` call produces.
#[derive(Debug, Clone)]
pub struct RankedTiers {
    pub algorithm: Algorithm,
    pub perfect: RankedTier,
    pub good: RankedTier,
    pub mismatch: RankedTier,
}

impl RankedTiers {
    pub fn tiers(&self) -> [&RankedTier; 3] {
        [&self.perfect, &self.good, &self.mismatch]
    }

    pub fn total_results(&self) -> usize {
        self.tiers().iter().map(|t| t.results.len()).sum()
    }
}

/// Wires a scorer to the partitioner, image resolver and enricher for
/// one catalog snapshot. The scorer decides the algorithm; the
/// recommender is strategy-agnostic.
pub struct Recommender<'a> {
    scorer: &'a dyn Scorer,
    catalog: &'a [Plant],
    settings: RankingSettings,
}

impl<'a> Recommender<'a> {
    pub fn new(scorer: &'a dyn Scorer, catalog: &'a [Plant], settings: RankingSettings) -> Self {
        Self { scorer, catalog, settings }
    }

    /// Score the whole catalog once, then cut the three tiers. The rng
    /// drives only the percentile-band sub-sampling; pass a seeded one
    /// to pin outcomes.
    pub fn rank<R: Rng>(
        &self,
        query: &Query,
        counts: TierCounts,
        rng: &mut R,
    ) -> Result<RankedTiers> {
        let scores = self.scorer.score(query)?;
        debug!(
            algorithm = self.scorer.algorithm().as_str(),
            catalog = scores.len(),
            "scored catalog"
        );

        let pad = self.settings.padding;
        let selected_perfect = if counts.perfect == 0 {
            Vec::new()
        } else {
            top_indices(scores.scores(), counts.perfect + pad)
        };
        let selected_good = if counts.good == 0 {
            Vec::new()
        } else {
            band_indices(scores.scores(), self.settings.good_band, counts.good + pad, rng)
        };
        let selected_mismatch = if counts.mismatch == 0 {
            Vec::new()
        } else {
            band_indices(scores.scores(), self.settings.mismatch_band, counts.mismatch + pad, rng)
        };

        Ok(RankedTiers {
            algorithm: self.scorer.algorithm(),
            perfect: self.finish_tier(Tier::Perfect, selected_perfect, counts.perfect, query, &scores)?,
            good: self.finish_tier(Tier::Good, selected_good, counts.good, query, &scores)?,
            mismatch: self.finish_tier(
                Tier::Mismatch,
                selected_mismatch,
                counts.mismatch,
                query,
                &scores,
            )?,
        })
    }

    /// Resolve selected score positions back to plants, apply image
    /// preference, cut to the requested count and enrich the survivors.
    fn finish_tier(
        &self,
        tier: Tier,
        selected: Vec<usize>,
        requested: usize,
        query: &Query,
        scores: &ScoreVector,
    ) -> Result<RankedTier> {
        let mut batch = Vec::with_capacity(selected.len());
        for position in selected {
            let id = scores.ids()[position];
            let plant = self
                .catalog
                .iter()
                .find(|p| p.id == id)
                .ok_or(Error::UnknownPlant(id))?;
            batch.push(plant.clone());
        }

        let kept = prefer_images(batch, requested, Plant::has_image);

        let mut results = Vec::with_capacity(kept.len());
        for plant in kept {
            let metadata = enrich(self.scorer, plant.id, query, scores)?;
            results.push((plant, metadata));
        }
        debug!(tier = tier.as_str(), surfaced = results.len(), requested, "tier finished");

        Ok(RankedTier {
            tier,
            label: self.scorer.algorithm().tier_label(tier),
            results,
        })
    }
}
