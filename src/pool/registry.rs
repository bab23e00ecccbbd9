use std::collections::HashSet;

use dashmap::DashMap;
use log::{error, info};

use super::ObjectPool;
use crate::entity::EntityFactory;
use crate::error::{PoolError, PoolResult};

/// Name of the container entity every pooled entity is parented under
pub const CONTAINER_NAME: &str = "Object Pool";

/// Named collection of pools sharing one parent container
///
/// The registry owns the entity factory and hands it to its pools on
/// every call. Nothing is created before `init`; `dispose` tears
/// everything down and returns the registry to its uninitialized state.
pub struct PoolRegistry<F: EntityFactory> {
    factory: F,
    /// Pools in configuration order
    pools: Vec<ObjectPool<F::Template, F::Handle>>,
    /// Pool name -> position in `pools`, filled by `init`
    index: DashMap<String, usize>,
    parent_container: Option<F::Handle>,
}

impl<F: EntityFactory> PoolRegistry<F> {
    pub fn new(factory: F, pools: Vec<ObjectPool<F::Template, F::Handle>>) -> Self {
        Self {
            factory,
            pools,
            index: DashMap::new(),
            parent_container: None,
        }
    }

    /// Create the parent container, register every pool by name and
    /// prewarm the pools that ask for it.
    ///
    /// Configuration is validated before anything is created. If a prewarm
    /// fails, everything created so far is destroyed again and the
    /// registry stays uninitialized.
    pub fn init(&mut self) -> PoolResult<()> {
        if self.is_initialized() {
            return Err(PoolError::configuration("pool registry is already initialized"));
        }
        if self.pools.is_empty() {
            return Err(PoolError::configuration("pool configuration is empty"));
        }

        let mut seen = HashSet::with_capacity(self.pools.len());
        for pool in &self.pools {
            if !seen.insert(pool.name()) {
                return Err(PoolError::configuration(format!(
                    "duplicate pool name '{}'",
                    pool.name()
                )));
            }
        }

        let container = self.factory.create_container(CONTAINER_NAME)?;

        let mut failure = None;
        for pool in self.pools.iter_mut() {
            if !pool.prewarm_enabled() {
                continue;
            }
            if let Err(err) = pool.prewarm(&mut self.factory, &container) {
                error!("[POOL REGISTRY] Prewarm of '{}' failed: {}", pool.name(), err);
                failure = Some(err);
                break;
            }
        }

        self.parent_container = Some(container);
        if let Some(err) = failure {
            self.dispose();
            return Err(err);
        }

        for (position, pool) in self.pools.iter().enumerate() {
            self.index.insert(pool.name().to_string(), position);
        }

        info!("[POOL REGISTRY] Initialized {} pools", self.pools.len());
        Ok(())
    }

    /// Rent an entity from the pool registered under `name`
    pub fn get_object(&mut self, name: &str) -> PoolResult<F::Handle> {
        let position = self
            .index
            .get(name)
            .map(|entry| *entry.value())
            .ok_or_else(|| PoolError::NotFound(name.to_string()))?;
        let container = self
            .parent_container
            .as_ref()
            .ok_or_else(|| PoolError::NotFound(name.to_string()))?;

        self.pools[position].rent(&mut self.factory, container)
    }

    /// Dispose every pool, then destroy the parent container.
    ///
    /// Safe to call again: a disposed registry has nothing left to destroy.
    /// `init` may be called afterwards to build everything anew.
    pub fn dispose(&mut self) {
        for pool in self.pools.iter_mut() {
            pool.dispose(&mut self.factory);
        }

        if let Some(container) = self.parent_container.take() {
            if self.factory.is_alive(&container) {
                self.factory.destroy(&container);
            }
            info!("[POOL REGISTRY] Disposed {} pools", self.pools.len());
        }
        self.index.clear();
    }

    pub fn is_initialized(&self) -> bool {
        self.parent_container.is_some()
    }

    /// Container every pooled entity is parented under, once initialized
    pub fn parent_container(&self) -> Option<&F::Handle> {
        self.parent_container.as_ref()
    }

    /// Registered pool by name
    pub fn pool(&self, name: &str) -> Option<&ObjectPool<F::Template, F::Handle>> {
        let position = self.index.get(name).map(|entry| *entry.value())?;
        self.pools.get(position)
    }

    /// Names of the registered pools, in configuration order
    pub fn pool_names(&self) -> Vec<&str> {
        self.pools
            .iter()
            .map(|pool| pool.name())
            .filter(|name| self.index.contains_key(*name))
            .collect()
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn factory_mut(&mut self) -> &mut F {
        &mut self.factory
    }
}
