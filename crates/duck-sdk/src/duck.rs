use duck_map::Mapper;
use duck_path::{Placeholder, Recording};
use duck_store::{MappingConfig, Shaped, Source, Store, TypedStore};
use tracing::debug;

use crate::error::DuckResult;

/// Entry point bundling a configured [`Mapper`].
#[derive(Clone, Debug, Default)]
pub struct Duck {
    mapper: Mapper,
}

impl Duck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MappingConfig) -> Self {
        Self {
            mapper: Mapper::with_config(config),
        }
    }

    /// Configure from a TOML document; missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> DuckResult<Self> {
        let config = MappingConfig::from_toml_str(text)?;
        debug!(max_depth = config.max_depth, lossy_numeric = config.lossy_numeric, "configured");
        Ok(Self::with_config(config))
    }

    pub fn mapper(&self) -> &Mapper {
        &self.mapper
    }

    pub fn config(&self) -> &MappingConfig {
        self.mapper.config()
    }

    /// An empty untyped store.
    pub fn store(&self) -> Store {
        Store::new()
    }

    /// A plain store copied from `source`.
    pub fn store_from<S: Source + ?Sized>(&self, source: &S) -> DuckResult<Store> {
        Ok(self.mapper.to_store(source)?)
    }

    /// A typed store seeded from `source` under this configuration.
    pub fn typed<T: Shaped, S: Source + ?Sized>(&self, source: &S) -> DuckResult<TypedStore<T>> {
        Ok(self.mapper.to_typed(source)?)
    }

    /// Record the member path a closure walks.
    pub fn record<F, R>(&self, f: F) -> DuckResult<Recording>
    where
        F: FnOnce(Placeholder) -> R,
    {
        Ok(duck_path::parse(f)?)
    }
}
