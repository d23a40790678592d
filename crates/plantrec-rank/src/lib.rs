//! plantrec-rank
//!
//! Result stratification: score statistics, percentile-band tier
//! partitioning, image-preference ordering, metadata enrichment, and the
//! recommendation pipeline that wires a scorer to a store.

pub mod enrich;
pub mod image;
pub mod partition;
pub mod recommend;
pub mod recorder;
pub mod stats;

pub use recommend::{RankedTier, RankedTiers, Recommender};
pub use recorder::record_run;
