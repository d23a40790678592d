//! Natural-language corpus for the embedding path, and the precomputed
//! corpus embeddings that live for the scorer's lifetime.

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use plantrec_core::traits::Embedder;
use plantrec_core::types::{Plant, PlantId};

/// Sentence template describing one plant for the encoder.
pub fn plant_sentence(plant: &Plant) -> String {
    format!(
        "{} that grows {}, has {} soil, needs {}, needs {} fertilizer and {}.",
        plant.name, plant.growth, plant.soil, plant.sunlight, plant.fertilization, plant.watering
    )
}

/// One embedding per catalog plant, in catalog order. Built once at
/// scorer construction and read-only afterwards; queries are embedded
/// per request against this fixed index.
pub struct CorpusEmbeddings {
    ids: Vec<PlantId>,
    vectors: Vec<Vec<f32>>,
}

impl CorpusEmbeddings {
    pub fn build(embedder: &dyn Embedder, catalog: &[Plant]) -> Result<Self> {
        let pb = ProgressBar::new(catalog.len() as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} plants embedded")
        {
            pb.set_style(style.progress_chars("#>-"));
        }

        let mut ids = Vec::with_capacity(catalog.len());
        let mut vectors = Vec::with_capacity(catalog.len());
        for plant in catalog {
            let sentence = plant_sentence(plant);
            let mut batch = embedder.embed_batch(&[sentence])?;
            ids.push(plant.id);
            vectors.push(batch.remove(0));
            pb.inc(1);
        }
        pb.finish_and_clear();
        info!(plants = ids.len(), dim = embedder.dim(), "corpus embeddings built");

        Ok(Self { ids, vectors })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[PlantId] {
        &self.ids
    }

    pub fn get(&self, id: PlantId) -> Option<&[f32]> {
        self.ids.iter().position(|&i| i == id).map(|p| self.vectors[p].as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlantId, &[f32])> {
        self.ids.iter().copied().zip(self.vectors.iter().map(Vec::as_slice))
    }
}
