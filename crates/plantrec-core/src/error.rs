use thiserror::Error;

use crate::types::{PlantId, RecommendationId};

#[derive(Debug, Error)]
pub enum Error {
    /// A catalog attribute value has no entry in the category bucket
    /// mapping. Fatal for the ranking run: silently dropping the plant
    /// would corrupt tier sizes invisibly.
    #[error("Unmapped {category} value: '{value}'")]
    UnmappedValue { category: &'static str, value: String },

    /// A score or embedding was requested for a plant id the scorer has
    /// never seen (e.g. the catalog changed under a stale corpus index).
    #[error("Unknown plant id: {0}")]
    UnknownPlant(PlantId),

    /// A recommendation row was written but its metadata row was not.
    /// The caller decides whether to roll back the whole submission.
    #[error("Partial write: recommendation {recommendation_id} is missing its metadata")]
    PartialWrite { recommendation_id: RecommendationId },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}

pub type Result<T> = std::result::Result<T, Error>;
