use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

use super::ObjectPool;
use crate::entity::EntityFactory;
use crate::error::{PoolError, PoolResult};

/// Well-known location of the persisted pool configuration
pub const DEFAULT_CONFIG_PATH: &str = "res://object_pools.json";

/// One persisted pool entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    pub name: String,
    /// Template reference, e.g. a packed scene path. `null` is accepted
    /// here and rejected when the pool is first used.
    #[serde(default)]
    pub template: Option<String>,
    pub budget: usize,
    #[serde(default)]
    pub prewarm: bool,
}

impl PoolConfig {
    pub fn new(name: impl Into<String>, template: impl Into<String>, budget: usize) -> Self {
        Self {
            name: name.into(),
            template: Some(template.into()),
            budget,
            prewarm: false,
        }
    }

    pub fn prewarmed(mut self) -> Self {
        self.prewarm = true;
        self
    }
}

/// Persisted configuration of a whole pool registry
///
/// ```json
/// { "pools": [ { "name": "bullets", "template": "res://bullet.tscn", "budget": 32, "prewarm": true } ] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub pools: Vec<PoolConfig>,
}

impl RegistryConfig {
    pub fn new(pools: Vec<PoolConfig>) -> Self {
        Self { pools }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Build one pool per entry, resolving template references through
    /// `factory`. References that do not resolve leave the pool without a
    /// template.
    pub fn resolve<F: EntityFactory>(
        &self,
        factory: &mut F,
    ) -> Vec<ObjectPool<F::Template, F::Handle>> {
        self.pools
            .iter()
            .map(|entry| {
                let template = match entry.template.as_deref() {
                    Some(path) => {
                        let resolved = factory.resolve_template(path);
                        if resolved.is_none() {
                            warn!("[{} POOL] Template '{}' could not be resolved", entry.name, path);
                        }
                        resolved
                    }
                    None => None,
                };
                ObjectPool::new(entry.name.clone(), template, entry.budget, entry.prewarm)
            })
            .collect()
    }
}

/// Supplier of the persisted registry configuration
pub trait ConfigSource {
    fn load(&self) -> PoolResult<RegistryConfig>;
}

/// An in-memory configuration is its own source
impl ConfigSource for RegistryConfig {
    fn load(&self) -> PoolResult<RegistryConfig> {
        Ok(self.clone())
    }
}

/// Configuration stored as a JSON file on disk
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for JsonFileSource {
    fn load(&self) -> PoolResult<RegistryConfig> {
        let contents = std::fs::read_to_string(&self.path).map_err(|err| {
            PoolError::configuration(format!(
                "pool configuration {} not readable: {}",
                self.path.display(),
                err
            ))
        })?;

        RegistryConfig::from_json(&contents).map_err(|err| {
            PoolError::configuration(format!(
                "pool configuration {} is malformed: {}",
                self.path.display(),
                err
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::HeadlessScene;

    #[test]
    fn test_parse_defaults() {
        let config = RegistryConfig::from_json(
            r#"{ "pools": [
                { "name": "bullets", "template": "bullet", "budget": 8, "prewarm": true },
                { "name": "sparks", "template": null, "budget": 2 },
                { "name": "smoke", "budget": 1 }
            ] }"#,
        )
        .unwrap();

        assert_eq!(config.pools.len(), 3);
        assert_eq!(config.pools[0], PoolConfig::new("bullets", "bullet", 8).prewarmed());
        assert_eq!(config.pools[1].template, None);
        assert!(!config.pools[1].prewarm);
        assert_eq!(config.pools[2].template, None);
    }

    #[test]
    fn test_negative_budget_is_rejected() {
        let result = RegistryConfig::from_json(
            r#"{ "pools": [ { "name": "bullets", "template": "bullet", "budget": -1 } ] }"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_json_survives_write_and_read() {
        let config = RegistryConfig::new(vec![
            PoolConfig::new("bullets", "res://bullet.tscn", 16).prewarmed(),
            PoolConfig::new("sparks", "res://spark.tscn", 4),
        ]);
        let json = config.to_json().unwrap();
        assert_eq!(RegistryConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_resolve_keeps_unresolved_as_missing_template() {
        let mut scene = HeadlessScene::with_templates(["bullet"]);
        let config = RegistryConfig::new(vec![
            PoolConfig::new("bullets", "bullet", 4).prewarmed(),
            PoolConfig::new("ghosts", "ghost", 2),
        ]);

        let pools = config.resolve(&mut scene);

        assert_eq!(pools.len(), 2);
        assert_eq!(pools[0].name(), "bullets");
        assert_eq!(pools[0].template(), Some(&"bullet".to_string()));
        assert_eq!(pools[0].budget(), 4);
        assert!(pools[0].prewarm_enabled());
        assert_eq!(pools[1].template(), None);
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let source = JsonFileSource::new("/definitely/not/here/object_pools.json");
        assert!(source.load().unwrap_err().is_configuration());
    }
}
