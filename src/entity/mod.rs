/// Scene entity capability consumed by the pools
///
/// Pools never talk to an engine directly. Everything that creates,
/// destroys, parents or toggles a scene entity goes through an
/// `EntityFactory`, so the recycling logic runs the same against Godot
/// and against the in-memory `HeadlessScene`.

pub mod godot_scene;
pub mod headless;

pub use godot_scene::GodotSceneFactory;
pub use headless::{EntityFlags, EntityId, HeadlessScene};

use crate::error::PoolResult;

/// Synchronous entity lifecycle operations of a host scene graph.
///
/// All calls are expected to complete immediately and to be made from
/// the thread that owns the scene graph.
pub trait EntityFactory {
    /// Blueprint that entities are instantiated from (a packed scene,
    /// a prefab name, ...).
    type Template;

    /// Reference to a live entity. Cloning must be cheap and must refer
    /// to the same entity.
    type Handle: Clone;

    /// Resolve a persisted template reference. `None` means the
    /// reference does not name a usable template.
    fn resolve_template(&mut self, path: &str) -> Option<Self::Template>;

    /// Create a new entity from `template`.
    fn instantiate(&mut self, template: &Self::Template) -> PoolResult<Self::Handle>;

    /// Destructively release an entity.
    fn destroy(&mut self, entity: &Self::Handle);

    /// Move `entity` under `container` in the scene graph.
    fn set_parent(&mut self, entity: &Self::Handle, container: &Self::Handle);

    fn set_active(&mut self, entity: &Self::Handle, active: bool);

    /// False once the entity was destroyed, by us or by someone else.
    fn is_alive(&self, entity: &Self::Handle) -> bool;

    /// Create an empty entity used only to group other entities.
    fn create_container(&mut self, name: &str) -> PoolResult<Self::Handle>;
}
