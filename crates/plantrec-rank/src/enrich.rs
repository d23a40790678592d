//! Metadata enrichment for surfaced candidates: the shared score
//! statistics plus the algorithm-specific diagnostics.

use plantrec_core::error::{Error, Result};
use plantrec_core::query::Query;
use plantrec_core::traits::Scorer;
use plantrec_core::types::{PlantId, RecommendationMetadata, ScoreStats, ScoreVector};

use crate::stats::{dense_rank, min_max_normalized, percentile_below};

/// Statistics for one raw score against the full vector it came from.
/// Degenerate vectors fall back per the rules in [`crate::stats`].
pub fn score_stats(raw: f64, scores: &ScoreVector) -> ScoreStats {
    let min = scores.min().unwrap_or(raw);
    let max = scores.max().unwrap_or(raw);
    ScoreStats {
        score_raw: raw,
        score_norm: min_max_normalized(raw, min, max),
        score_percentile: percentile_below(raw, scores.scores()),
        rank: dense_rank(raw, scores.scores()),
    }
}

/// Full metadata record for one surfaced plant. Fails only when the
/// plant id is absent from the score vector, which means the caller is
/// holding a stale index.
pub fn enrich(
    scorer: &dyn Scorer,
    plant_id: PlantId,
    query: &Query,
    scores: &ScoreVector,
) -> Result<RecommendationMetadata> {
    let raw = scores.get(plant_id).ok_or(Error::UnknownPlant(plant_id))?;
    Ok(RecommendationMetadata {
        stats: score_stats(raw, scores),
        detail: scorer.detail(plant_id, query, scores)?,
    })
}
