use log::info;

use super::config::ConfigSource;
use super::PoolRegistry;
use crate::entity::EntityFactory;
use crate::error::PoolResult;

/// Application-wide access point to one pool registry
///
/// Construct it exactly once, at the composition root, and hand it (or a
/// reference to it) to whoever needs pooled entities. There is no global
/// instance and no way to swap the registry out after construction.
pub struct PoolManager<F: EntityFactory> {
    registry: PoolRegistry<F>,
}

impl<F: EntityFactory> PoolManager<F> {
    /// Load the persisted configuration from `source` and bring up a fully
    /// initialized registry on top of `factory`.
    pub fn load<S>(mut factory: F, source: &S) -> PoolResult<Self>
    where
        S: ConfigSource + ?Sized,
    {
        let config = source.load()?;
        let pools = config.resolve(&mut factory);
        let registry = PoolRegistry::new(factory, pools);
        Self::from_registry(registry)
    }

    /// Take over a registry, initializing it if that has not happened yet
    pub fn from_registry(mut registry: PoolRegistry<F>) -> PoolResult<Self> {
        if !registry.is_initialized() {
            registry.init()?;
        }
        info!("[POOL MANAGER] Ready with pools {:?}", registry.pool_names());
        Ok(Self { registry })
    }

    pub fn get_object(&mut self, name: &str) -> PoolResult<F::Handle> {
        self.registry.get_object(name)
    }

    pub fn parent_container(&self) -> Option<&F::Handle> {
        self.registry.parent_container()
    }

    pub fn registry(&self) -> &PoolRegistry<F> {
        &self.registry
    }

    /// Destroy every pooled entity and the shared container
    pub fn dispose(&mut self) {
        self.registry.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::HeadlessScene;
    use crate::pool::config::{PoolConfig, RegistryConfig};

    #[test]
    fn test_load_initializes_registry() {
        let config = RegistryConfig::new(vec![
            PoolConfig::new("bullets", "bullet", 3).prewarmed(),
            PoolConfig::new("sparks", "spark", 2),
        ]);
        let scene = HeadlessScene::with_templates(["bullet", "spark"]);

        let mut manager = PoolManager::load(scene, &config).unwrap();

        assert!(manager.registry().is_initialized());
        assert_eq!(manager.registry().factory().instantiated_count(), 3);
        let container = *manager.parent_container().unwrap();
        let spark = manager.get_object("sparks").unwrap();
        assert_eq!(manager.registry().factory().parent_of(&spark), Some(container));
    }

    #[test]
    fn test_load_empty_config_fails() {
        let result = PoolManager::load(HeadlessScene::new(), &RegistryConfig::default());
        assert!(result.err().unwrap().is_configuration());
    }

    #[test]
    fn test_unresolved_template_fails_on_rent() {
        let config = RegistryConfig::new(vec![PoolConfig::new("ghosts", "ghost", 2)]);
        let mut manager = PoolManager::load(HeadlessScene::new(), &config).unwrap();

        assert!(manager.get_object("ghosts").unwrap_err().is_configuration());
        assert!(manager.get_object("bullets").unwrap_err().is_not_found());
    }

    #[test]
    fn test_from_registry_keeps_initialized_registry() {
        let mut scene = HeadlessScene::with_templates(["bullet"]);
        let pools = RegistryConfig::new(vec![PoolConfig::new("bullets", "bullet", 1)])
            .resolve(&mut scene);
        let mut registry = PoolRegistry::new(scene, pools);
        registry.init().unwrap();
        let container = *registry.parent_container().unwrap();

        let manager = PoolManager::from_registry(registry).unwrap();

        assert_eq!(manager.parent_container(), Some(&container));
    }
}
