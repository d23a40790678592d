//! JSON-file catalog source. The catalog is an external collaborator as
//! far as the ranking pipeline is concerned; this is the one concrete
//! implementation the repository ships.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::traits::CatalogSource;
use crate::types::Plant;

/// Plant catalog backed by a JSON array on disk. The file is read on
/// every listing so a refreshed catalog is picked up without restarts;
/// plant order in the file is the catalog order everywhere downstream.
pub struct JsonCatalog {
    path: PathBuf,
}

impl JsonCatalog {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }
}

impl CatalogSource for JsonCatalog {
    fn list_all(&self) -> Result<Vec<Plant>> {
        let raw = std::fs::read_to_string(&self.path)
            .map_err(|e| Error::NotFound(format!("catalog file {}: {e}", self.path.display())))?;
        serde_json::from_str(&raw)
            .map_err(|e| Error::Operation(format!("catalog parse: {e}")))
    }
}
