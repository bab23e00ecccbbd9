use log::{debug, info, warn};

use crate::entity::EntityFactory;
use crate::error::{PoolError, PoolResult};

/// Fixed-budget pool of entities created from one template
///
/// Entities are created lazily by `rent` (or all at once by `prewarm`)
/// until `budget` of them exist. From then on `rent` hands them out again
/// in creation order, round-robin.
///
/// Recycling does not track ownership: a recycled entity may still be in
/// use by whoever rented it `budget` calls ago. Only the activation state
/// is reset on rent; callers re-initialize everything else.
#[derive(Debug, Clone)]
pub struct ObjectPool<T, H> {
    name: String,
    template: Option<T>,
    budget: usize,
    prewarm: bool,
    instances: Vec<H>,
    /// Next recycle index, meaningful once `instances.len() == budget`
    cursor: usize,
}

impl<T, H: Clone> ObjectPool<T, H> {
    pub fn new(name: impl Into<String>, template: Option<T>, budget: usize, prewarm: bool) -> Self {
        Self {
            name: name.into(),
            template,
            budget,
            prewarm,
            instances: Vec::with_capacity(budget),
            cursor: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template(&self) -> Option<&T> {
        self.template.as_ref()
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    pub fn prewarm_enabled(&self) -> bool {
        self.prewarm
    }

    /// Created entities, in creation order
    pub fn instances(&self) -> &[H] {
        &self.instances
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.instances.len() >= self.budget
    }

    fn missing_template(&self) -> PoolError {
        PoolError::configuration(format!("pool '{}' has no template assigned", self.name))
    }

    /// Hand out an entity, always inactive.
    ///
    /// Creates a new entity under `parent` while the pool is below budget,
    /// otherwise recycles the entity at the cursor and advances it.
    pub fn rent<F>(&mut self, factory: &mut F, parent: &H) -> PoolResult<H>
    where
        F: EntityFactory<Template = T, Handle = H>,
    {
        let Some(template) = self.template.as_ref() else {
            return Err(self.missing_template());
        };
        if self.budget == 0 {
            return Err(PoolError::configuration(format!(
                "pool '{}' has a budget of zero",
                self.name
            )));
        }

        let entity = if self.instances.len() < self.budget {
            let entity = factory.instantiate(template)?;
            factory.set_parent(&entity, parent);
            self.instances.push(entity.clone());
            debug!(
                "[{} POOL] Created instance {}/{}",
                self.name,
                self.instances.len(),
                self.budget
            );
            entity
        } else {
            let entity = self.instances[self.cursor].clone();
            self.cursor = (self.cursor + 1) % self.instances.len();
            entity
        };

        factory.set_active(&entity, false);
        Ok(entity)
    }

    /// Create the whole budget up front, inactive and parented under
    /// `parent`. Does nothing once the pool holds any entity.
    ///
    /// If the factory fails partway, the entities created so far are
    /// destroyed and the pool is left empty.
    pub fn prewarm<F>(&mut self, factory: &mut F, parent: &H) -> PoolResult<()>
    where
        F: EntityFactory<Template = T, Handle = H>,
    {
        if !self.instances.is_empty() {
            return Ok(());
        }
        let Some(template) = self.template.as_ref() else {
            return Err(self.missing_template());
        };

        for _ in 0..self.budget {
            let entity = match factory.instantiate(template) {
                Ok(entity) => entity,
                Err(err) => {
                    warn!(
                        "[{} POOL] Prewarm stopped after {} instances: {}",
                        self.name,
                        self.instances.len(),
                        err
                    );
                    self.dispose(factory);
                    return Err(err);
                }
            };
            factory.set_active(&entity, false);
            factory.set_parent(&entity, parent);
            self.instances.push(entity);
        }

        info!("[{} POOL] Prewarmed {} instances", self.name, self.instances.len());
        Ok(())
    }

    /// Destroy every created entity and forget them.
    ///
    /// Entities already destroyed elsewhere are skipped. Calling this on an
    /// empty pool, including a second time in a row, does nothing. The next
    /// `rent` starts over as on a fresh pool.
    pub fn dispose<F>(&mut self, factory: &mut F)
    where
        F: EntityFactory<Template = T, Handle = H>,
    {
        if self.instances.is_empty() {
            return;
        }

        let mut destroyed = 0;
        for entity in self.instances.drain(..) {
            if factory.is_alive(&entity) {
                factory.destroy(&entity);
                destroyed += 1;
            } else {
                warn!("[{} POOL] Skipping instance that was already destroyed", self.name);
            }
        }
        self.cursor = 0;

        info!("[{} POOL] Disposed {} instances", self.name, destroyed);
    }
}
