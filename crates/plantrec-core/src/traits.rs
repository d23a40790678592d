use crate::error::Result;
use crate::query::Query;
use crate::types::{
    Algorithm, AlgorithmDetail, Plant, PlantId, RecommendationId, RecommendationMetadata,
    RecommendationRecord, ScoreVector, SubmissionHistory, SubmissionId,
};

/// Sentence embedding backend. Implementations must be deterministic for
/// identical input within one process.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// A ranking strategy over the plant catalog. Implementations hold
/// whatever per-catalog state they need (token corpus, embeddings) and
/// produce one score per catalog plant for each query.
pub trait Scorer: Send + Sync {
    fn algorithm(&self) -> Algorithm;

    /// One raw score per catalog plant, in catalog order. A blank query
    /// must yield a deterministic baseline (all zeros), not an error.
    fn score(&self, query: &Query) -> Result<ScoreVector>;

    /// Algorithm-specific diagnostics for one surfaced plant.
    fn detail(&self, plant_id: PlantId, query: &Query, scores: &ScoreVector)
        -> Result<AlgorithmDetail>;
}

/// Read access to the plant catalog.
pub trait CatalogSource: Send + Sync {
    fn list_all(&self) -> Result<Vec<Plant>>;
}

/// Durable storage for submissions, recommendations and their metadata.
///
/// `create_recommendation` assigns and returns the row identity that the
/// matching `create_metadata` call must reference; the recorder performs
/// the two writes back to back per candidate.
pub trait RecommendationStore: Send + Sync {
    fn create_submission(&self, free_text: Option<&str>) -> Result<SubmissionId>;

    fn create_recommendation(&self, record: &RecommendationRecord) -> Result<RecommendationId>;

    fn create_metadata(
        &self,
        recommendation_id: RecommendationId,
        metadata: &RecommendationMetadata,
    ) -> Result<()>;

    /// Attach a 1-5 rating to a past submission.
    fn add_rating(&self, submission_id: SubmissionId, rating: u8) -> Result<()>;

    /// Everything ever recorded, optionally skipping unrated submissions.
    fn list_submissions(&self, include_unrated: bool) -> Result<Vec<SubmissionHistory>>;

    /// Bulk-delete all user data. The only way records are ever removed.
    fn purge_all(&self) -> Result<()>;
}
