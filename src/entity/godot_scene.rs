use godot::classes::node::ProcessMode;
use godot::classes::{CanvasItem, Node, Node3D, PackedScene};
use godot::prelude::*;

use super::EntityFactory;
use crate::error::{PoolError, PoolResult};

/// Entity factory backed by the Godot scene tree
///
/// Templates are `PackedScene`s loaded from resource paths, entities are
/// the root `Node` of each instantiated scene. Containers are plain nodes
/// attached under `root` (normally the pool manager node itself).
pub struct GodotSceneFactory {
    root: Gd<Node>,
}

impl GodotSceneFactory {
    pub fn new(root: Gd<Node>) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Gd<Node> {
        &self.root
    }
}

impl EntityFactory for GodotSceneFactory {
    type Template = Gd<PackedScene>;
    type Handle = Gd<Node>;

    fn resolve_template(&mut self, path: &str) -> Option<Gd<PackedScene>> {
        match try_load::<PackedScene>(path) {
            Ok(scene) => Some(scene),
            Err(err) => {
                godot_error!("[OBJECT POOL] Failed to load scene {}: {:?}", path, err);
                None
            }
        }
    }

    fn instantiate(&mut self, template: &Gd<PackedScene>) -> PoolResult<Gd<Node>> {
        template.try_instantiate_as::<Node>().ok_or_else(|| {
            PoolError::configuration(format!(
                "scene {} could not be instantiated",
                template.get_path()
            ))
        })
    }

    fn destroy(&mut self, entity: &Gd<Node>) {
        let mut node = entity.clone();
        if node.is_instance_valid() && !node.is_queued_for_deletion() {
            node.queue_free();
        }
    }

    fn set_parent(&mut self, entity: &Gd<Node>, container: &Gd<Node>) {
        let node = entity.clone();
        if let Some(mut current) = node.get_parent() {
            if current == *container {
                return;
            }
            current.remove_child(&node);
        }
        container.clone().add_child(&node);
    }

    fn set_active(&mut self, entity: &Gd<Node>, active: bool) {
        let mut node = entity.clone();
        node.set_process_mode(if active {
            ProcessMode::INHERIT
        } else {
            ProcessMode::DISABLED
        });

        // Only visual nodes carry visibility
        if let Ok(mut item) = node.clone().try_cast::<CanvasItem>() {
            item.set_visible(active);
        } else if let Ok(mut spatial) = node.try_cast::<Node3D>() {
            spatial.set_visible(active);
        }
    }

    fn is_alive(&self, entity: &Gd<Node>) -> bool {
        entity.is_instance_valid() && !entity.is_queued_for_deletion()
    }

    fn create_container(&mut self, name: &str) -> PoolResult<Gd<Node>> {
        if !self.root.is_instance_valid() {
            return Err(PoolError::configuration(
                "root node for the pool container is no longer valid",
            ));
        }

        let mut container = Node::new_alloc();
        container.set_name(&StringName::from(name));
        self.root.add_child(&container);
        Ok(container)
    }
}
