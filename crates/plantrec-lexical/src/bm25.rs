//! Okapi BM25 over pre-tokenized documents.
//!
//! Scores are computed for every document in the corpus, including
//! zero-match ones, because the tier partitioner needs a fully populated
//! score vector to take percentiles over.

use std::collections::{HashMap, HashSet};

const K1: f64 = 1.5;
const B: f64 = 0.75;

/// Fitted BM25 corpus statistics.
#[derive(Debug, Clone)]
pub struct Bm25 {
    term_freqs: Vec<HashMap<String, usize>>,
    doc_freqs: HashMap<String, usize>,
    doc_lens: Vec<usize>,
    avg_doc_len: f64,
}

impl Bm25 {
    pub fn fit(documents: &[Vec<String>]) -> Self {
        let mut term_freqs = Vec::with_capacity(documents.len());
        let mut doc_freqs: HashMap<String, usize> = HashMap::new();
        let mut doc_lens = Vec::with_capacity(documents.len());

        for tokens in documents {
            let mut tf: HashMap<String, usize> = HashMap::new();
            for token in tokens {
                *tf.entry(token.clone()).or_insert(0) += 1;
            }
            for term in tf.keys() {
                *doc_freqs.entry(term.clone()).or_insert(0) += 1;
            }
            doc_lens.push(tokens.len());
            term_freqs.push(tf);
        }

        let total: usize = doc_lens.iter().sum();
        let avg_doc_len = if doc_lens.is_empty() { 0.0 } else { total as f64 / doc_lens.len() as f64 };

        Self { term_freqs, doc_freqs, doc_lens, avg_doc_len }
    }

    pub fn num_docs(&self) -> usize {
        self.doc_lens.len()
    }

    /// Non-negative idf: ln(1 + (N - df + 0.5) / (df + 0.5)).
    fn idf(&self, term: &str) -> f64 {
        let n = self.num_docs() as f64;
        let df = *self.doc_freqs.get(term).unwrap_or(&0) as f64;
        ((n - df + 0.5) / (df + 0.5)).ln_1p()
    }

    /// One score per document, corpus order. An empty query scores every
    /// document exactly 0.0, which downstream treats as a degenerate but
    /// valid run.
    pub fn scores(&self, query: &[String]) -> Vec<f64> {
        let mut unique: HashSet<&String> = HashSet::new();
        let query_terms: Vec<&String> = query.iter().filter(|t| unique.insert(*t)).collect();

        (0..self.num_docs())
            .map(|doc| {
                let mut score = 0.0;
                let doc_len = self.doc_lens[doc] as f64;
                for term in &query_terms {
                    let tf = *self.term_freqs[doc].get(*term).unwrap_or(&0) as f64;
                    if tf == 0.0 {
                        continue;
                    }
                    let norm = 1.0 - B + B * doc_len / self.avg_doc_len.max(1.0);
                    score += self.idf(term) * (tf * (K1 + 1.0)) / (tf + K1 * norm);
                }
                score
            })
            .collect()
    }
}
