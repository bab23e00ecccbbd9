use std::collections::{HashMap, HashSet};
use std::fmt;

use bitflags::bitflags;
use ulid::Ulid;

use super::EntityFactory;
use crate::error::{PoolError, PoolResult};

bitflags! {
    /// Per-entity state bits of the in-memory scene
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct EntityFlags: u8 {
        const ACTIVE    = 0b0000_0001;
        const DESTROYED = 0b0000_0010;
        const CONTAINER = 0b0000_0100;
    }
}

/// Identity of an entity in a `HeadlessScene` (128-bit ULID)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(Ulid);

impl EntityId {
    fn generate() -> Self {
        EntityId(Ulid::new())
    }

    pub fn to_bytes(&self) -> [u8; 16] {
        self.0.to_bytes()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug)]
struct EntityRecord {
    template: Option<String>,
    name: Option<String>,
    parent: Option<EntityId>,
    flags: EntityFlags,
}

/// In-memory scene graph
///
/// Stands in for a real engine on headless servers and in tests. Templates
/// are plain names that must be registered before they resolve. Destroyed
/// entities keep their record (flagged `DESTROYED`) so callers can still
/// inspect what happened to them.
#[derive(Debug, Default)]
pub struct HeadlessScene {
    templates: HashSet<String>,
    entities: HashMap<EntityId, EntityRecord>,
    instantiated: usize,
    destroyed: usize,
}

impl HeadlessScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scene with the given template names already registered
    pub fn with_templates<I, S>(templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut scene = Self::new();
        for template in templates {
            scene.register_template(template);
        }
        scene
    }

    pub fn register_template(&mut self, name: impl Into<String>) {
        self.templates.insert(name.into());
    }

    /// Number of entities created from templates (containers excluded)
    pub fn instantiated_count(&self) -> usize {
        self.instantiated
    }

    /// Number of entities destroyed through `destroy` (containers included)
    pub fn destroyed_count(&self) -> usize {
        self.destroyed
    }

    /// Template entities that are still alive
    pub fn live_count(&self) -> usize {
        self.entities
            .values()
            .filter(|record| {
                !record.flags.contains(EntityFlags::DESTROYED)
                    && !record.flags.contains(EntityFlags::CONTAINER)
            })
            .count()
    }

    pub fn flags(&self, entity: &EntityId) -> Option<EntityFlags> {
        self.entities.get(entity).map(|record| record.flags)
    }

    pub fn is_active(&self, entity: &EntityId) -> bool {
        self.flags(entity)
            .map_or(false, |flags| flags.contains(EntityFlags::ACTIVE))
    }

    pub fn parent_of(&self, entity: &EntityId) -> Option<EntityId> {
        self.entities.get(entity).and_then(|record| record.parent)
    }

    pub fn template_of(&self, entity: &EntityId) -> Option<&str> {
        self.entities
            .get(entity)
            .and_then(|record| record.template.as_deref())
    }

    pub fn name_of(&self, entity: &EntityId) -> Option<&str> {
        self.entities.get(entity).and_then(|record| record.name.as_deref())
    }

    /// Live entities currently parented under `container`
    pub fn children_of(&self, container: &EntityId) -> Vec<EntityId> {
        let mut children: Vec<EntityId> = self
            .entities
            .iter()
            .filter(|(_, record)| {
                record.parent == Some(*container)
                    && !record.flags.contains(EntityFlags::DESTROYED)
            })
            .map(|(id, _)| *id)
            .collect();
        children.sort();
        children
    }

    /// Destroy an entity behind the owner's back, as another system
    /// freeing a node would. Not counted in `destroyed_count`.
    pub fn invalidate(&mut self, entity: &EntityId) {
        if let Some(record) = self.entities.get_mut(entity) {
            record.flags.insert(EntityFlags::DESTROYED);
            record.flags.remove(EntityFlags::ACTIVE);
        }
    }

    /// Make an entity active, as a caller does after renting it
    pub fn activate(&mut self, entity: &EntityId) {
        self.set_active(entity, true);
    }
}

impl EntityFactory for HeadlessScene {
    type Template = String;
    type Handle = EntityId;

    fn resolve_template(&mut self, path: &str) -> Option<String> {
        self.templates.get(path).cloned()
    }

    fn instantiate(&mut self, template: &String) -> PoolResult<EntityId> {
        if !self.templates.contains(template) {
            return Err(PoolError::configuration(format!(
                "template '{}' is not registered",
                template
            )));
        }

        let id = EntityId::generate();
        self.entities.insert(
            id,
            EntityRecord {
                template: Some(template.clone()),
                name: None,
                parent: None,
                // Fresh instances start active, like instantiated scenes do.
                flags: EntityFlags::ACTIVE,
            },
        );
        self.instantiated += 1;
        Ok(id)
    }

    fn destroy(&mut self, entity: &EntityId) {
        if let Some(record) = self.entities.get_mut(entity) {
            if record.flags.contains(EntityFlags::DESTROYED) {
                return;
            }
            record.flags.insert(EntityFlags::DESTROYED);
            record.flags.remove(EntityFlags::ACTIVE);
            self.destroyed += 1;
        }
    }

    fn set_parent(&mut self, entity: &EntityId, container: &EntityId) {
        if let Some(record) = self.entities.get_mut(entity) {
            record.parent = Some(*container);
        }
    }

    fn set_active(&mut self, entity: &EntityId, active: bool) {
        if let Some(record) = self.entities.get_mut(entity) {
            if record.flags.contains(EntityFlags::DESTROYED) {
                return;
            }
            record.flags.set(EntityFlags::ACTIVE, active);
        }
    }

    fn is_alive(&self, entity: &EntityId) -> bool {
        self.flags(entity)
            .map_or(false, |flags| !flags.contains(EntityFlags::DESTROYED))
    }

    fn create_container(&mut self, name: &str) -> PoolResult<EntityId> {
        let id = EntityId::generate();
        self.entities.insert(
            id,
            EntityRecord {
                template: None,
                name: Some(name.to_string()),
                parent: None,
                flags: EntityFlags::ACTIVE | EntityFlags::CONTAINER,
            },
        );
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unregistered_template_does_not_resolve() {
        let mut scene = HeadlessScene::with_templates(["bullet"]);
        assert_eq!(scene.resolve_template("bullet"), Some("bullet".to_string()));
        assert_eq!(scene.resolve_template("missile"), None);
    }

    #[test]
    fn test_instantiate_starts_active_and_counts() {
        let mut scene = HeadlessScene::with_templates(["bullet"]);
        let id = scene.instantiate(&"bullet".to_string()).unwrap();

        assert!(scene.is_active(&id));
        assert!(scene.is_alive(&id));
        assert_eq!(scene.template_of(&id), Some("bullet"));
        assert_eq!(scene.instantiated_count(), 1);
        assert_eq!(scene.live_count(), 1);
    }

    #[test]
    fn test_entity_ids_are_distinct_ulids() {
        let mut scene = HeadlessScene::with_templates(["bullet"]);
        let a = scene.instantiate(&"bullet".to_string()).unwrap();
        let b = scene.instantiate(&"bullet".to_string()).unwrap();

        assert_ne!(a.to_bytes(), b.to_bytes());
        assert_eq!(a.to_string().len(), 26);
    }

    #[test]
    fn test_instantiate_unknown_template_fails() {
        let mut scene = HeadlessScene::new();
        let err = scene.instantiate(&"ghost".to_string()).unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(scene.instantiated_count(), 0);
    }

    #[test]
    fn test_destroy_is_counted_once() {
        let mut scene = HeadlessScene::with_templates(["bullet"]);
        let id = scene.instantiate(&"bullet".to_string()).unwrap();

        scene.destroy(&id);
        scene.destroy(&id);

        assert!(!scene.is_alive(&id));
        assert_eq!(scene.destroyed_count(), 1);
        assert_eq!(scene.live_count(), 0);
    }

    #[test]
    fn test_invalidate_is_not_counted_as_destroy() {
        let mut scene = HeadlessScene::with_templates(["bullet"]);
        let id = scene.instantiate(&"bullet".to_string()).unwrap();

        scene.invalidate(&id);

        assert!(!scene.is_alive(&id));
        assert_eq!(scene.destroyed_count(), 0);
    }

    #[test]
    fn test_parenting_and_containers() {
        let mut scene = HeadlessScene::with_templates(["bullet"]);
        let container = scene.create_container("Object Pool").unwrap();
        let id = scene.instantiate(&"bullet".to_string()).unwrap();

        scene.set_parent(&id, &container);

        assert_eq!(scene.parent_of(&id), Some(container));
        assert_eq!(scene.children_of(&container), vec![id]);
        assert_eq!(scene.name_of(&container), Some("Object Pool"));
        assert_eq!(scene.live_count(), 1);
    }
}
