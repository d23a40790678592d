//! Configuration loader and the typed ranking settings.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `PLANTREC_*`
//! env vars, same lookup order in every binary and test.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::env;

use crate::types::TierCounts;

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("PLANTREC_"));

        Ok(Self { figment })
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// The `[ranking]` section. Absent is fine and yields the defaults;
    /// a section that is present but does not deserialize is an
    /// `InvalidConfig` error, not a silent fallback.
    pub fn ranking(&self) -> crate::error::Result<RankingSettings> {
        if self.figment.find_value("ranking").is_err() {
            return Ok(RankingSettings::default());
        }
        self.figment
            .extract_inner("ranking")
            .map_err(|e| crate::error::Error::InvalidConfig(format!("[ranking]: {e}")))
    }
}

/// An inclusive percentile band, in percent.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct Band {
    pub lower: f64,
    pub upper: f64,
}

/// Knobs of the tier partitioner.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RankingSettings {
    /// Extra candidates fetched beyond each requested count so that
    /// image preference can reorder without shrinking the final set.
    pub padding: usize,
    pub good_band: Band,
    pub mismatch_band: Band,
    pub counts: TierCounts,
    /// Fixed seed for percentile-band sub-sampling; `None` draws from
    /// entropy. Tests pin this.
    pub seed: Option<u64>,
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            padding: 10,
            good_band: Band { lower: 70.0, upper: 90.0 },
            mismatch_band: Band { lower: 5.0, upper: 20.0 },
            counts: TierCounts::default(),
            seed: None,
        }
    }
}
