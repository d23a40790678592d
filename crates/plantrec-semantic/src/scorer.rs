//! The semantic ranking strategy: cosine similarity between the query
//! embedding and precomputed corpus embeddings.

use plantrec_core::error::{Error, Result};
use plantrec_core::query::Query;
use plantrec_core::traits::{Embedder, Scorer};
use plantrec_core::types::{Algorithm, AlgorithmDetail, Plant, PlantId, ScoreVector};

use crate::corpus::CorpusEmbeddings;

/// Long-lived scorer: the encoder and corpus embeddings are expensive,
/// so one instance is built at startup and shared read-only across
/// requests. Catalog changes are picked up only via [`rebuild`], an
/// accepted staleness window.
///
/// [`rebuild`]: SemanticScorer::rebuild
pub struct SemanticScorer {
    embedder: Box<dyn Embedder>,
    index: CorpusEmbeddings,
}

impl SemanticScorer {
    pub fn new(embedder: Box<dyn Embedder>, catalog: &[Plant]) -> Result<Self> {
        let index = CorpusEmbeddings::build(embedder.as_ref(), catalog)
            .map_err(|e| Error::Operation(format!("corpus embedding build: {e}")))?;
        Ok(Self { embedder, index })
    }

    /// Explicit catalog-refresh trigger; the only way the corpus index
    /// ever changes after construction.
    pub fn rebuild(&mut self, catalog: &[Plant]) -> Result<()> {
        self.index = CorpusEmbeddings::build(self.embedder.as_ref(), catalog)
            .map_err(|e| Error::Operation(format!("corpus embedding rebuild: {e}")))?;
        Ok(())
    }

    /// Free text is used as-is; structured answers are rendered into a
    /// plain phrase so the encoder has something sentence-like.
    fn query_text(query: &Query) -> String {
        match query {
            Query::FreeText(text) => text.clone(),
            Query::Structured(answers) => answers
                .iter()
                .map(|a| format!("{} {}", a.value, a.category.prefix()))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let mut batch = self
            .embedder
            .embed_batch(&[text.to_string()])
            .map_err(|e| Error::Operation(format!("query embedding: {e}")))?;
        Ok(batch.remove(0))
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f64 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    f64::from(dot) / f64::from((na * nb).max(1e-12))
}

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

impl Scorer for SemanticScorer {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Sbert
    }

    fn score(&self, query: &Query) -> Result<ScoreVector> {
        let ids = self.index.ids().to_vec();
        if query.is_blank() {
            // Nothing to embed; a blank query is a valid degenerate run
            // where every plant scores the same baseline.
            return ScoreVector::new(ids, vec![0.0; self.index.len()]);
        }
        let query_vec = self.embed_query(&Self::query_text(query))?;
        let scores = self.index.iter().map(|(_, v)| cosine(&query_vec, v)).collect();
        ScoreVector::new(ids, scores)
    }

    fn detail(
        &self,
        plant_id: PlantId,
        _query: &Query,
        scores: &ScoreVector,
    ) -> Result<AlgorithmDetail> {
        let raw = scores.get(plant_id).ok_or(Error::UnknownPlant(plant_id))?;
        let best = scores.max().unwrap_or(raw);
        Ok(AlgorithmDetail::Sbert {
            cosine_distance: round4(1.0 - raw),
            gap_to_best: round4(best - raw),
        })
    }
}
