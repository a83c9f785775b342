use petstore_core::{default_pets, load_seed, CatalogError, CatalogService, CatalogStore};
use std::path::PathBuf;

/// Where the catalog's initial contents come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedSource {
    /// The three built-in pets.
    Builtin,
    Empty,
    /// A JSON array of pets, each with an id.
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub seed: SeedSource,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 8080,
            seed: SeedSource::Builtin,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn build_service(&self) -> Result<CatalogService, CatalogError> {
        let store = match &self.seed {
            SeedSource::Builtin => CatalogStore::with_pets(default_pets())?,
            SeedSource::Empty => CatalogStore::new(),
            SeedSource::File(path) => CatalogStore::with_pets(load_seed(path)?)?,
        };
        Ok(CatalogService::new(store))
    }
}
