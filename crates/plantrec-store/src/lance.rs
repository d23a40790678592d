//! LanceDB-backed recommendation store.
//!
//! Three append-only tables (`submissions`, `recommendations`,
//! `metadata`) behind a synchronous `RecommendationStore` facade; the
//! store owns its own Tokio runtime so callers stay blocking. Ids are
//! assigned sequentially, seeded from the existing tables at open.

use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use anyhow::anyhow;
use arrow_array::{Int32Array, Int64Array, RecordBatch, RecordBatchIterator, StringArray, TimestampMillisecondArray};
use arrow_schema::Schema;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{connect, Connection};
use tracing::{info, warn};

use plantrec_core::error::{Error, Result};
use plantrec_core::traits::RecommendationStore;
use plantrec_core::types::{
    Algorithm, RecommendationId, RecommendationMetadata, RecommendationRecord,
    RecordedRecommendation, Submission, SubmissionHistory, SubmissionId, Tier,
};

use crate::schema::{
    metadata_schema, recommendations_schema, submissions_schema, METADATA_TABLE,
    RECOMMENDATIONS_TABLE, SUBMISSIONS_TABLE,
};

pub struct LanceStore {
    runtime: tokio::runtime::Runtime,
    conn: Connection,
    next_submission: AtomicI64,
    next_recommendation: AtomicI64,
}

impl LanceStore {
    /// Open (or initialize) the store under `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let runtime = tokio::runtime::Runtime::new().map_err(store_err)?;
        let uri = dir.as_ref().to_string_lossy().to_string();
        let (conn, max_submission, max_recommendation) = runtime
            .block_on(async {
                let conn = connect(&uri).execute().await?;
                ensure_table(&conn, SUBMISSIONS_TABLE, submissions_schema()).await?;
                ensure_table(&conn, RECOMMENDATIONS_TABLE, recommendations_schema()).await?;
                ensure_table(&conn, METADATA_TABLE, metadata_schema()).await?;
                let max_submission = max_id(&conn, SUBMISSIONS_TABLE, "id").await?;
                let max_recommendation = max_id(&conn, RECOMMENDATIONS_TABLE, "id").await?;
                anyhow::Ok((conn, max_submission, max_recommendation))
            })
            .map_err(store_err)?;
        info!(uri, max_submission, max_recommendation, "lance store open");
        Ok(Self {
            runtime,
            conn,
            next_submission: AtomicI64::new(max_submission),
            next_recommendation: AtomicI64::new(max_recommendation),
        })
    }

    fn append(&self, table: &str, schema: Arc<Schema>, batch: RecordBatch) -> Result<()> {
        self.runtime
            .block_on(async {
                let t = self.conn.open_table(table).execute().await?;
                let reader =
                    Box::new(RecordBatchIterator::new(vec![Ok(batch)].into_iter(), schema));
                t.add(reader).execute().await?;
                anyhow::Ok(())
            })
            .map_err(store_err)
    }

    fn read_submissions(&self) -> Result<Vec<Submission>> {
        self.runtime.block_on(read_submissions(&self.conn)).map_err(store_err)
    }
}

impl RecommendationStore for LanceStore {
    fn create_submission(&self, free_text: Option<&str>) -> Result<SubmissionId> {
        let id = self.next_submission.fetch_add(1, Ordering::SeqCst) + 1;
        let batch = RecordBatch::try_new(
            submissions_schema(),
            vec![
                Arc::new(Int64Array::from(vec![id])),
                Arc::new(StringArray::from(vec![free_text.map(str::to_string)])),
                Arc::new(TimestampMillisecondArray::from(vec![Utc::now().timestamp_millis()])),
                Arc::new(Int32Array::from(vec![Option::<i32>::None])),
            ],
        )
        .map_err(store_err)?;
        self.append(SUBMISSIONS_TABLE, submissions_schema(), batch)?;
        Ok(id)
    }

    fn create_recommendation(&self, record: &RecommendationRecord) -> Result<RecommendationId> {
        let id = self.next_recommendation.fetch_add(1, Ordering::SeqCst) + 1;
        let batch = RecordBatch::try_new(
            recommendations_schema(),
            vec![
                Arc::new(Int64Array::from(vec![id])),
                Arc::new(Int64Array::from(vec![record.submission_id])),
                Arc::new(StringArray::from(vec![record.tier.as_str().to_string()])),
                Arc::new(StringArray::from(vec![record.algorithm.as_str().to_string()])),
                Arc::new(Int64Array::from(vec![record.plant_id])),
            ],
        )
        .map_err(store_err)?;
        self.append(RECOMMENDATIONS_TABLE, recommendations_schema(), batch)?;
        Ok(id)
    }

    fn create_metadata(
        &self,
        recommendation_id: RecommendationId,
        metadata: &RecommendationMetadata,
    ) -> Result<()> {
        let payload = serde_json::to_string(metadata).map_err(store_err)?;
        let batch = RecordBatch::try_new(
            metadata_schema(),
            vec![
                Arc::new(Int64Array::from(vec![recommendation_id])),
                Arc::new(StringArray::from(vec![payload])),
            ],
        )
        .map_err(store_err)?;
        self.append(METADATA_TABLE, metadata_schema(), batch)
    }

    fn add_rating(&self, submission_id: SubmissionId, rating: u8) -> Result<()> {
        if !(1..=5).contains(&rating) {
            return Err(Error::Operation(format!("rating {rating} outside 1-5")));
        }
        let submission = self
            .read_submissions()?
            .into_iter()
            .find(|s| s.id == submission_id)
            .ok_or_else(|| Error::NotFound(format!("submission id {submission_id}")))?;

        // Upsert the full row with the rating filled in; `id` is unique.
        let batch = RecordBatch::try_new(
            submissions_schema(),
            vec![
                Arc::new(Int64Array::from(vec![submission.id])),
                Arc::new(StringArray::from(vec![submission.free_text.clone()])),
                Arc::new(TimestampMillisecondArray::from(vec![
                    submission.created_at.timestamp_millis(),
                ])),
                Arc::new(Int32Array::from(vec![Some(i32::from(rating))])),
            ],
        )
        .map_err(store_err)?;
        self.runtime
            .block_on(async {
                let t = self.conn.open_table(SUBMISSIONS_TABLE).execute().await?;
                let reader = Box::new(RecordBatchIterator::new(
                    vec![Ok(batch)].into_iter(),
                    submissions_schema(),
                ));
                let mut mi = t.merge_insert(&["id"]);
                mi.when_matched_update_all(None).when_not_matched_insert_all();
                let _ = mi.execute(reader).await?;
                anyhow::Ok(())
            })
            .map_err(store_err)
    }

    fn list_submissions(&self, include_unrated: bool) -> Result<Vec<SubmissionHistory>> {
        let (submissions, recommendations, metadata) = self
            .runtime
            .block_on(async {
                let submissions = read_submissions(&self.conn).await?;
                let recommendations = read_recommendations(&self.conn).await?;
                let metadata = read_metadata(&self.conn).await?;
                anyhow::Ok((submissions, recommendations, metadata))
            })
            .map_err(store_err)?;

        let mut histories = Vec::new();
        for submission in submissions {
            if !include_unrated && submission.rating.is_none() {
                continue;
            }
            // A recommendation without its metadata half is a recorded
            // partial write; the audit listing skips it.
            let recommendations = recommendations
                .iter()
                .filter(|(_, r)| r.submission_id == submission.id)
                .filter_map(|(id, record)| {
                    let found = metadata.iter().find(|(mid, _)| mid == id);
                    if found.is_none() {
                        warn!(recommendation_id = id, "orphaned recommendation skipped");
                    }
                    found.map(|(_, m)| RecordedRecommendation {
                        id: *id,
                        record: record.clone(),
                        metadata: m.clone(),
                    })
                })
                .collect();
            histories.push(SubmissionHistory { submission, recommendations });
        }
        Ok(histories)
    }

    fn purge_all(&self) -> Result<()> {
        self.runtime
            .block_on(async {
                let names = self.conn.table_names().execute().await?;
                for table in [SUBMISSIONS_TABLE, RECOMMENDATIONS_TABLE, METADATA_TABLE] {
                    if names.contains(&table.to_string()) {
                        self.conn.drop_table(table).await?;
                    }
                }
                ensure_table(&self.conn, SUBMISSIONS_TABLE, submissions_schema()).await?;
                ensure_table(&self.conn, RECOMMENDATIONS_TABLE, recommendations_schema()).await?;
                ensure_table(&self.conn, METADATA_TABLE, metadata_schema()).await?;
                anyhow::Ok(())
            })
            .map_err(store_err)?;
        self.next_submission.store(0, Ordering::SeqCst);
        self.next_recommendation.store(0, Ordering::SeqCst);
        info!("store purged");
        Ok(())
    }
}

fn store_err(e: impl std::fmt::Display) -> Error {
    Error::Store(e.to_string())
}

async fn ensure_table(conn: &Connection, name: &str, schema: Arc<Schema>) -> anyhow::Result<()> {
    let names = conn.table_names().execute().await?;
    if names.contains(&name.to_string()) {
        return Ok(());
    }
    let iter = RecordBatchIterator::new(vec![].into_iter(), schema);
    conn.create_table(name, Box::new(iter)).execute().await?;
    Ok(())
}

async fn max_id(conn: &Connection, table: &str, column: &str) -> anyhow::Result<i64> {
    let t = conn.open_table(table).execute().await?;
    let mut stream = t.query().execute().await?;
    let mut max = 0i64;
    while let Some(batch) = stream.try_next().await? {
        let ids = int64_column(&batch, column)?;
        for i in 0..batch.num_rows() {
            max = max.max(ids.value(i));
        }
    }
    Ok(max)
}

async fn read_submissions(conn: &Connection) -> anyhow::Result<Vec<Submission>> {
    let t = conn.open_table(SUBMISSIONS_TABLE).execute().await?;
    let mut stream = t.query().execute().await?;
    let mut out = Vec::new();
    while let Some(batch) = stream.try_next().await? {
        let ids = int64_column(&batch, "id")?;
        let free_texts = string_column(&batch, "free_text")?;
        let created = batch
            .column_by_name("created_at")
            .and_then(|c| c.as_any().downcast_ref::<TimestampMillisecondArray>())
            .ok_or_else(|| anyhow!("submissions.created_at column missing"))?;
        let ratings = batch
            .column_by_name("rating")
            .and_then(|c| c.as_any().downcast_ref::<Int32Array>())
            .ok_or_else(|| anyhow!("submissions.rating column missing"))?;
        for i in 0..batch.num_rows() {
            let created_at = DateTime::<Utc>::from_timestamp_millis(created.value(i))
                .ok_or_else(|| anyhow!("invalid created_at for submission {}", ids.value(i)))?;
            out.push(Submission {
                id: ids.value(i),
                free_text: if free_texts.is_null(i) {
                    None
                } else {
                    Some(free_texts.value(i).to_string())
                },
                created_at,
                rating: if ratings.is_null(i) {
                    None
                } else {
                    u8::try_from(ratings.value(i)).ok()
                },
            });
        }
    }
    out.sort_by_key(|s| s.id);
    Ok(out)
}

async fn read_recommendations(
    conn: &Connection,
) -> anyhow::Result<Vec<(RecommendationId, RecommendationRecord)>> {
    let t = conn.open_table(RECOMMENDATIONS_TABLE).execute().await?;
    let mut stream = t.query().execute().await?;
    let mut out = Vec::new();
    while let Some(batch) = stream.try_next().await? {
        let ids = int64_column(&batch, "id")?;
        let submission_ids = int64_column(&batch, "submission_id")?;
        let tiers = string_column(&batch, "tier")?;
        let algorithms = string_column(&batch, "algorithm")?;
        let plant_ids = int64_column(&batch, "plant_id")?;
        for i in 0..batch.num_rows() {
            out.push((
                ids.value(i),
                RecommendationRecord {
                    submission_id: submission_ids.value(i),
                    tier: parse_tier(tiers.value(i))?,
                    algorithm: parse_algorithm(algorithms.value(i))?,
                    plant_id: plant_ids.value(i),
                },
            ));
        }
    }
    out.sort_by_key(|(id, _)| *id);
    Ok(out)
}

async fn read_metadata(
    conn: &Connection,
) -> anyhow::Result<Vec<(RecommendationId, RecommendationMetadata)>> {
    let t = conn.open_table(METADATA_TABLE).execute().await?;
    let mut stream = t.query().execute().await?;
    let mut out = Vec::new();
    while let Some(batch) = stream.try_next().await? {
        let ids = int64_column(&batch, "recommendation_id")?;
        let payloads = string_column(&batch, "payload")?;
        for i in 0..batch.num_rows() {
            let metadata: RecommendationMetadata = serde_json::from_str(payloads.value(i))?;
            out.push((ids.value(i), metadata));
        }
    }
    Ok(out)
}

fn int64_column<'a>(batch: &'a RecordBatch, name: &str) -> anyhow::Result<&'a Int64Array> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<Int64Array>())
        .ok_or_else(|| anyhow!("{name} column missing"))
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> anyhow::Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| anyhow!("{name} column missing"))
}

fn parse_tier(raw: &str) -> anyhow::Result<Tier> {
    match raw {
        "perfect" => Ok(Tier::Perfect),
        "good" => Ok(Tier::Good),
        "mismatch" => Ok(Tier::Mismatch),
        other => Err(anyhow!("unknown tier '{other}'")),
    }
}

fn parse_algorithm(raw: &str) -> anyhow::Result<Algorithm> {
    match raw {
        "bm25" => Ok(Algorithm::Bm25),
        "sbert" => Ok(Algorithm::Sbert),
        other => Err(anyhow!("unknown algorithm '{other}'")),
    }
}
