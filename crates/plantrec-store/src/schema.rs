//! Arrow schemas for the three store tables.

use arrow_schema::{DataType, Field, Schema, TimeUnit};
use std::sync::Arc;

pub const SUBMISSIONS_TABLE: &str = "submissions";
pub const RECOMMENDATIONS_TABLE: &str = "recommendations";
pub const METADATA_TABLE: &str = "metadata";

pub fn submissions_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("free_text", DataType::Utf8, true),
        Field::new("created_at", DataType::Timestamp(TimeUnit::Millisecond, None), false),
        Field::new("rating", DataType::Int32, true),
    ]))
}

pub fn recommendations_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("submission_id", DataType::Int64, false),
        Field::new("tier", DataType::Utf8, false),
        Field::new("algorithm", DataType::Utf8, false),
        Field::new("plant_id", DataType::Int64, false),
    ]))
}

/// Metadata payloads differ per algorithm, so the row is the serialized
/// `RecommendationMetadata` next to its parent id.
pub fn metadata_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("recommendation_id", DataType::Int64, false),
        Field::new("payload", DataType::Utf8, false),
    ]))
}
