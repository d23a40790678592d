//! Fixed mappings from raw catalog attribute values to the coarse
//! buckets the questionnaire offers. Bucketing is what makes keyword
//! matching between user answers and catalog rows possible at all: the
//! dataset says "keep soil evenly moist", the user says "high".
//!
//! A value missing from its table is a hard error for the whole ranking
//! run, never a silent skip.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Plant;

/// The five describable plant attributes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    Growth,
    Soil,
    Watering,
    Sunlight,
    Fertilization,
}

pub const ALL_CATEGORIES: [Category; 5] = [
    Category::Growth,
    Category::Soil,
    Category::Watering,
    Category::Sunlight,
    Category::Fertilization,
];

impl Category {
    /// Token namespace prefix. Namespacing keeps e.g. a growth value from
    /// ever colliding with a soil value of the same surface text.
    pub fn prefix(self) -> &'static str {
        match self {
            Category::Growth => "growth",
            Category::Soil => "soil",
            Category::Watering => "water",
            Category::Sunlight => "sun",
            Category::Fertilization => "fertilizer",
        }
    }

    fn table(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Category::Growth => GROWTH,
            Category::Soil => SOIL,
            Category::Watering => WATERING,
            Category::Sunlight => SUNLIGHT,
            Category::Fertilization => FERTILIZATION,
        }
    }

    /// Map a raw catalog value to its bucket.
    pub fn bucket(self, raw: &str) -> Result<&'static str> {
        self.table()
            .iter()
            .find(|(from, _)| *from == raw)
            .map(|(_, to)| *to)
            .ok_or_else(|| Error::UnmappedValue { category: self.prefix(), value: raw.to_string() })
    }

    /// The raw attribute string a plant carries for this category.
    pub fn raw_value(self, plant: &Plant) -> &str {
        match self {
            Category::Growth => &plant.growth,
            Category::Soil => &plant.soil,
            Category::Watering => &plant.watering,
            Category::Sunlight => &plant.sunlight,
            Category::Fertilization => &plant.fertilization,
        }
    }

    /// Convenience: bucket a plant's value and glue on the namespace,
    /// e.g. "water_high".
    pub fn namespaced_bucket(self, plant: &Plant) -> Result<String> {
        Ok(format!("{}_{}", self.prefix(), self.bucket(self.raw_value(plant))?))
    }
}

const WATERING: &[(&str, &str)] = &[
    ("keep soil consistently moist", "high"),
    ("keep soil evenly moist", "high"),
    ("keep soil moist", "high"),
    ("keep soil slightly moist", "high"),
    ("let soil dry between watering", "low"),
    ("regular watering", "moderate"),
    ("regular, moist soil", "moderate"),
    ("regular, well-drained soil", "moderate"),
    ("water weekly", "low"),
    ("water when soil feels dry", "low"),
    ("water when soil is dry", "low"),
    ("water when topsoil is dry", "low"),
];

const SUNLIGHT: &[(&str, &str)] = &[
    ("full sunlight", "full"),
    ("indirect sunlight", "indirect"),
    ("partial sunlight", "partial"),
];

const SOIL: &[(&str, &str)] = &[
    ("well-drained", "drained"),
    ("sandy", "sandy"),
    ("moist", "moist"),
    ("loamy", "loamy"),
    ("acidic", "acidic"),
];

const FERTILIZATION: &[(&str, &str)] = &[
    ("acidic", "yes"),
    ("low-nitrogen", "yes"),
    ("balanced", "yes"),
    ("organic", "yes"),
    ("no", "no"),
];

const GROWTH: &[(&str, &str)] = &[("slow", "slow"), ("moderate", "moderate"), ("fast", "fast")];
