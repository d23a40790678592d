//! Builds the keyword document corpus and the matching query tokens.
//!
//! Each plant becomes one token document: id and name first, then one
//! namespaced bucket token per describable attribute. The namespaces
//! ("growth_fast" vs "soil_fast") are what make plain keyword search
//! usable on this dataset.

use plantrec_core::error::Result;
use plantrec_core::mappings::ALL_CATEGORIES;
use plantrec_core::query::AnswerChoice;
use plantrec_core::types::{Plant, PlantId};

/// The id and name tokens lead every document; everything after this
/// offset describes care attributes.
pub const DESCRIBABLE_OFFSET: usize = 2;

/// Tokenized document for one plant, in corpus (catalog) order.
#[derive(Debug, Clone)]
pub struct PlantDocument {
    pub plant_id: PlantId,
    pub tokens: Vec<String>,
}

impl PlantDocument {
    /// Attribute tokens, without the positional id/name lead-in.
    pub fn describable_tokens(&self) -> &[String] {
        if self.tokens.len() > DESCRIBABLE_OFFSET {
            &self.tokens[DESCRIBABLE_OFFSET..]
        } else {
            &[]
        }
    }
}

/// One token document per catalog plant. An attribute value missing from
/// its bucket table fails the whole build; a partially built corpus
/// would silently skew every downstream tier.
pub fn build_corpus(catalog: &[Plant]) -> Result<Vec<PlantDocument>> {
    catalog
        .iter()
        .map(|plant| {
            let mut tokens = vec![plant.id.to_string(), plant.name.clone()];
            for category in ALL_CATEGORIES {
                tokens.push(category.namespaced_bucket(plant)?);
            }
            Ok(PlantDocument { plant_id: plant.id, tokens })
        })
        .collect()
}

/// Query tokens from answered categories, namespaced the same way as the
/// corpus. "Don't care" answers were already dropped during resolution,
/// so every choice contributes one token.
pub fn query_tokens(answers: &[AnswerChoice]) -> Vec<String> {
    answers.iter().map(|a| format!("{}_{}", a.category.prefix(), a.value)).collect()
}
