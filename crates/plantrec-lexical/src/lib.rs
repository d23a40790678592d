//! plantrec-lexical
//!
//! Keyword-matching ranking path: namespaced token corpus over the plant
//! catalog, BM25 scoring, and per-plant match diagnostics.

pub mod bm25;
pub mod corpus;
pub mod scorer;

pub use bm25::Bm25;
pub use corpus::{build_corpus, query_tokens, PlantDocument};
pub use scorer::LexicalScorer;
