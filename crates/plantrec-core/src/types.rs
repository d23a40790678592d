//! Domain types shared by the lexical and semantic ranking paths.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type PlantId = i64;
pub type SubmissionId = i64;
pub type RecommendationId = i64;

/// One plant catalog entry eligible for recommendation.
///
/// Catalog records are read-only input to the ranking pipeline; the
/// attribute strings carry the raw dataset values (e.g. watering is
/// "keep soil evenly moist", not a bucket).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plant {
    pub id: PlantId,
    pub name: String,
    pub growth: String,
    pub soil: String,
    pub sunlight: String,
    pub watering: String,
    pub fertilization: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Plant {
    /// A plant counts as illustrated only when the reference is non-empty.
    pub fn has_image(&self) -> bool {
        self.image_url.as_deref().is_some_and(|url| !url.is_empty())
    }
}

/// Which ranking algorithm produced a score or recommendation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Algorithm {
    Bm25,
    Sbert,
}

impl Algorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::Bm25 => "bm25",
            Algorithm::Sbert => "sbert",
        }
    }

    /// Label stored per recommendation, e.g. "BM25_perfect".
    pub fn tier_label(self, tier: Tier) -> String {
        let prefix = match self {
            Algorithm::Bm25 => "BM25",
            Algorithm::Sbert => "SBERT",
        };
        format!("{}_{}", prefix, tier.as_str())
    }
}

/// Recommendation quality bucket.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Tier {
    Perfect,
    Good,
    Mismatch,
}

impl Tier {
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Perfect => "perfect",
            Tier::Good => "good",
            Tier::Mismatch => "mismatch",
        }
    }
}

/// How many plants the caller wants per tier. Zero is valid and yields
/// an empty tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TierCounts {
    pub perfect: usize,
    pub good: usize,
    pub mismatch: usize,
}

impl TierCounts {
    pub fn for_tier(self, tier: Tier) -> usize {
        match tier {
            Tier::Perfect => self.perfect,
            Tier::Good => self.good,
            Tier::Mismatch => self.mismatch,
        }
    }
}

impl Default for TierCounts {
    fn default() -> Self {
        Self { perfect: 5, good: 3, mismatch: 3 }
    }
}

/// Per-candidate relevance scores for one scoring run.
///
/// Fully populated: every catalog plant has exactly one score, in catalog
/// order. Scores are raw algorithm output; normalization and percentile
/// statistics are computed downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreVector {
    ids: Vec<PlantId>,
    scores: Vec<f64>,
}

impl ScoreVector {
    /// Ids and scores must be parallel; mismatched lengths are a
    /// programming error in the scorer.
    pub fn new(ids: Vec<PlantId>, scores: Vec<f64>) -> crate::error::Result<Self> {
        if ids.len() != scores.len() {
            return Err(crate::error::Error::Operation(format!(
                "score vector length mismatch: {} ids vs {} scores",
                ids.len(),
                scores.len()
            )));
        }
        Ok(Self { ids, scores })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[PlantId] {
        &self.ids
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    pub fn get(&self, id: PlantId) -> Option<f64> {
        self.ids.iter().position(|&i| i == id).map(|p| self.scores[p])
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlantId, f64)> + '_ {
        self.ids.iter().copied().zip(self.scores.iter().copied())
    }

    pub fn max(&self) -> Option<f64> {
        self.scores.iter().copied().reduce(f64::max)
    }

    pub fn min(&self) -> Option<f64> {
        self.scores.iter().copied().reduce(f64::min)
    }
}

/// Score statistics shared by both algorithms: raw score, min-max
/// normalized score, percentile (fraction of scores strictly below),
/// and dense rank among distinct scores descending.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreStats {
    pub score_raw: f64,
    pub score_norm: f64,
    pub score_percentile: f64,
    pub rank: usize,
}

/// Algorithm-specific diagnostic fields attached to a recommendation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "algorithm", rename_all = "lowercase")]
pub enum AlgorithmDetail {
    Bm25 {
        matched_terms: Vec<String>,
        unmatched_terms: Vec<String>,
        max_matches: usize,
        match_count: usize,
        match_ratio: f64,
    },
    Sbert {
        cosine_distance: f64,
        gap_to_best: f64,
    },
}

/// Full metadata persisted 1:1 with each surfaced recommendation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationMetadata {
    pub stats: ScoreStats,
    pub detail: AlgorithmDetail,
}

/// The durable provenance row written for every surfaced plant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationRecord {
    pub submission_id: SubmissionId,
    pub tier: Tier,
    pub algorithm: Algorithm,
    pub plant_id: PlantId,
}

impl RecommendationRecord {
    pub fn label(&self) -> String {
        self.algorithm.tier_label(self.tier)
    }
}

/// The durable parent of one ranking run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Submission {
    pub id: SubmissionId,
    pub free_text: Option<String>,
    pub created_at: DateTime<Utc>,
    pub rating: Option<u8>,
}

/// One stored recommendation joined with its metadata, as returned by
/// the audit listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordedRecommendation {
    pub id: RecommendationId,
    pub record: RecommendationRecord,
    pub metadata: RecommendationMetadata,
}

/// One submission with everything recorded for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubmissionHistory {
    pub submission: Submission,
    pub recommendations: Vec<RecordedRecommendation>,
}
