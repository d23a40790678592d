//! plantrec-store
//!
//! Durable storage for submissions, recommendations and their metadata:
//! a LanceDB-backed store for real deployments and a mutex-guarded
//! in-memory store with the same contract for tests and offline runs.

pub mod lance;
pub mod memory;
mod schema;

pub use lance::LanceStore;
pub use memory::MemoryStore;
