//! plantrec-semantic
//!
//! Sentence-embedding ranking path: natural-language corpus over the
//! plant catalog, a local sentence encoder, and cosine-similarity
//! scoring. Set `PLANTREC_USE_FAKE_EMBEDDINGS=1` to swap in a
//! deterministic hash embedder (tests, offline runs).

pub mod corpus;
pub mod device;
pub mod model;
pub mod scorer;

use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use tracing::info;

use plantrec_core::traits::Embedder;

pub use corpus::{plant_sentence, CorpusEmbeddings};
pub use model::SentenceEncoder;
pub use scorer::SemanticScorer;

pub const FAKE_EMBEDDING_DIM: usize = 384;

/// Deterministic stand-in for the real encoder: hashes whitespace tokens
/// into a fixed-size vector and L2-normalizes. Shares tokens, shares
/// mass; useful wherever model weights are unavailable.
pub struct FakeEmbedder {
    dim: usize,
}

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl Default for FakeEmbedder {
    fn default() -> Self {
        Self::new(FAKE_EMBEDDING_DIM)
    }
}

impl Embedder for FakeEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts
            .iter()
            .map(|text| {
                let mut v = vec![0f32; self.dim];
                for (i, token) in text.split_whitespace().enumerate() {
                    let mut hasher = twox_hash::XxHash64::with_seed(0);
                    token.hash(&mut hasher);
                    let h = hasher.finish();
                    let idx = (h as usize) % self.dim;
                    let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
                    v[idx] += val + (i as f32 % 3.0) * 0.01;
                }
                let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-6);
                for x in &mut v {
                    *x /= norm;
                }
                Ok(v)
            })
            .collect()
    }
}

/// The embedder the service should use: the fake one when
/// `PLANTREC_USE_FAKE_EMBEDDINGS` is set, otherwise the real encoder
/// loaded from `model_dir` (or the usual lookup locations).
pub fn default_embedder(model_dir: Option<PathBuf>) -> Result<Box<dyn Embedder>> {
    let use_fake = std::env::var("PLANTREC_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if use_fake {
        info!("using deterministic fake embedder");
        return Ok(Box::new(FakeEmbedder::default()));
    }
    let dir = match model_dir {
        Some(dir) => dir,
        None => resolve_model_dir()?,
    };
    Ok(Box::new(SentenceEncoder::load(&dir)?))
}

fn resolve_model_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("PLANTREC_MODEL_DIR") {
        let p = PathBuf::from(&dir);
        if p.exists() {
            return Ok(p);
        }
    }
    for candidate in ["models/all-MiniLM-L6-v2", "../models/all-MiniLM-L6-v2"] {
        let p = Path::new(candidate);
        if p.exists() {
            return Ok(p.to_path_buf());
        }
    }
    Err(anyhow!("Could not locate a sentence-embedding model directory"))
}
