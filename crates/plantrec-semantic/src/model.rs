//! Sentence encoder built on a local MiniLM-class BERT checkpoint.
//!
//! Embeddings are mean-pooled over the token dimension and L2-normalized,
//! so cosine similarity downstream reduces to a dot product.

use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::path::Path;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::Tokenizer;
use tracing::info;

use plantrec_core::traits::Embedder;

use crate::device::select_device;

const MAX_LEN: usize = 256;

pub struct SentenceEncoder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dim: usize,
}

impl SentenceEncoder {
    /// Load tokenizer, config and weights from a local model directory
    /// (the all-MiniLM-L6-v2 layout: tokenizer.json, config.json,
    /// pytorch_model.bin).
    pub fn load(model_dir: &Path) -> Result<Self> {
        let device = select_device();
        info!("loading sentence encoder from {}", model_dir.display());

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;

        let config_path = model_dir.join("config.json");
        let config: BertConfig = serde_json::from_str(&std::fs::read_to_string(&config_path)?)?;

        let weights_path = model_dir.join("pytorch_model.bin");
        let weights = candle_core::pickle::read_all(&weights_path)?;
        let weights_map: HashMap<String, Tensor> = weights.into_iter().collect();
        let vb = VarBuilder::from_tensors(weights_map, DType::F32, &device);

        let dim = config.hidden_size;
        let model = BertModel::load(vb, &config)?;
        info!(dim, "sentence encoder ready");
        Ok(Self { model, tokenizer, device, dim })
    }

    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let enc = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow!("Tokenization failed: {}", e))?;
        let mut ids = enc.get_ids().to_vec();
        if ids.len() > MAX_LEN {
            ids.truncate(MAX_LEN);
        }
        let len = ids.len();

        let input_ids = Tensor::from_iter(ids, &self.device)?.reshape((1, len))?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self.model.forward(&input_ids, &token_type_ids, None)?;

        // Mean over the token dimension, then L2 normalize. No attention
        // mask needed: single-text batches carry no padding.
        let mean = hidden.mean(1)?;
        let norm = (mean.sqr()?.sum_keepdim(1)?.sqrt()? + 1e-12f64)?;
        let normalized = mean.broadcast_div(&norm)?;
        let out = normalized.squeeze(0)?.to_device(&Device::Cpu)?.to_vec1::<f32>()?;
        Ok(out)
    }
}

impl Embedder for SentenceEncoder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed_one(t)).collect()
    }
}
