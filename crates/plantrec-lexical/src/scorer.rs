//! The lexical ranking strategy: BM25 over the namespaced token corpus.

use std::collections::HashSet;

use tracing::debug;

use plantrec_core::error::{Error, Result};
use plantrec_core::query::Query;
use plantrec_core::traits::Scorer;
use plantrec_core::types::{Algorithm, AlgorithmDetail, Plant, PlantId, ScoreVector};

use crate::bm25::Bm25;
use crate::corpus::{build_corpus, query_tokens, PlantDocument};

/// Ephemeral per-request scorer; rebuild it from the current catalog
/// state for every ranking run.
pub struct LexicalScorer {
    documents: Vec<PlantDocument>,
    bm25: Bm25,
}

impl LexicalScorer {
    pub fn new(catalog: &[Plant]) -> Result<Self> {
        let documents = build_corpus(catalog)?;
        let token_lists: Vec<Vec<String>> = documents.iter().map(|d| d.tokens.clone()).collect();
        let bm25 = Bm25::fit(&token_lists);
        debug!(documents = documents.len(), "fitted keyword corpus");
        Ok(Self { documents, bm25 })
    }

    fn document(&self, plant_id: PlantId) -> Result<&PlantDocument> {
        self.documents
            .iter()
            .find(|d| d.plant_id == plant_id)
            .ok_or(Error::UnknownPlant(plant_id))
    }

    /// Structured answers become namespaced tokens; free text falls back
    /// to plain whitespace tokens, which can only match the name/id lead
    /// tokens of a document.
    fn tokens_for(query: &Query) -> Vec<String> {
        match query {
            Query::Structured(answers) => query_tokens(answers),
            Query::FreeText(text) => text.split_whitespace().map(str::to_string).collect(),
        }
    }
}

impl Scorer for LexicalScorer {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Bm25
    }

    fn score(&self, query: &Query) -> Result<ScoreVector> {
        let tokens = Self::tokens_for(query);
        let scores = self.bm25.scores(&tokens);
        let ids = self.documents.iter().map(|d| d.plant_id).collect();
        ScoreVector::new(ids, scores)
    }

    fn detail(
        &self,
        plant_id: PlantId,
        query: &Query,
        _scores: &ScoreVector,
    ) -> Result<AlgorithmDetail> {
        let document = self.document(plant_id)?;
        let query_set: HashSet<String> = Self::tokens_for(query).into_iter().collect();

        let mut matched_terms = Vec::new();
        let mut unmatched_terms = Vec::new();
        for token in document.describable_tokens() {
            if query_set.contains(token) {
                matched_terms.push(token.clone());
            } else {
                unmatched_terms.push(token.clone());
            }
        }

        let max_matches = document.describable_tokens().len();
        let match_count = matched_terms.len();
        let match_ratio = if max_matches == 0 {
            0.0
        } else {
            (match_count as f64 / max_matches as f64 * 100.0).round() / 100.0
        };

        Ok(AlgorithmDetail::Bm25 {
            matched_terms,
            unmatched_terms,
            max_matches,
            match_count,
            match_ratio,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Plant> {
        vec![
            Plant {
                id: 1,
                name: "Basil".to_string(),
                growth: "fast".to_string(),
                soil: "moist".to_string(),
                sunlight: "full sunlight".to_string(),
                watering: "keep soil moist".to_string(),
                fertilization: "balanced".to_string(),
                image_url: None,
            },
            Plant {
                id: 2,
                name: "Aloe".to_string(),
                growth: "slow".to_string(),
                soil: "sandy".to_string(),
                sunlight: "full sunlight".to_string(),
                watering: "water weekly".to_string(),
                fertilization: "no".to_string(),
                image_url: None,
            },
        ]
    }

    fn structured(pairs: &[(plantrec_core::mappings::Category, &str)]) -> Query {
        Query::Structured(
            pairs
                .iter()
                .map(|(category, value)| plantrec_core::query::AnswerChoice {
                    category: *category,
                    value: (*value).to_string(),
                })
                .collect(),
        )
    }

    #[test]
    fn matching_plant_outranks_the_rest() {
        use plantrec_core::mappings::Category;
        let scorer = LexicalScorer::new(&catalog()).unwrap();
        let query = structured(&[
            (Category::Growth, "fast"),
            (Category::Soil, "moist"),
            (Category::Watering, "high"),
        ]);
        let scores = scorer.score(&query).unwrap();
        assert!(scores.get(1).unwrap() > scores.get(2).unwrap());
    }

    #[test]
    fn blank_query_is_a_uniform_zero_run() {
        let scorer = LexicalScorer::new(&catalog()).unwrap();
        let scores = scorer.score(&Query::Structured(vec![])).unwrap();
        assert!(scores.iter().all(|(_, s)| s == 0.0));
    }

    #[test]
    fn detail_partitions_describable_tokens() {
        use plantrec_core::mappings::Category;
        let scorer = LexicalScorer::new(&catalog()).unwrap();
        let query = structured(&[(Category::Growth, "fast"), (Category::Soil, "sandy")]);
        let scores = scorer.score(&query).unwrap();

        let detail = scorer.detail(1, &query, &scores).unwrap();
        match detail {
            AlgorithmDetail::Bm25 {
                matched_terms,
                unmatched_terms,
                max_matches,
                match_count,
                match_ratio,
            } => {
                assert_eq!(matched_terms, vec!["growth_fast"]);
                assert_eq!(unmatched_terms.len(), 4);
                assert_eq!(max_matches, 5);
                assert_eq!(match_count, 1);
                assert_eq!(match_ratio, 0.2);
            }
            AlgorithmDetail::Sbert { .. } => panic!("wrong detail shape"),
        }
    }

    #[test]
    fn detail_for_unknown_plant_fails() {
        let scorer = LexicalScorer::new(&catalog()).unwrap();
        let query = Query::Structured(vec![]);
        let scores = scorer.score(&query).unwrap();
        assert!(scorer.detail(999, &query, &scores).is_err());
    }
}
