use godot::classes::{FileAccess, INode, Node};
use godot::obj::WithBaseField;
use godot::prelude::*;
use once_cell::unsync::OnceCell;

use crate::entity::GodotSceneFactory;
use crate::error::{PoolError, PoolResult};
use crate::pool::{ConfigSource, PoolManager, RegistryConfig, DEFAULT_CONFIG_PATH};

// ============================================================================
// Resource-backed configuration
// ============================================================================

/// Pool configuration stored as a JSON file inside the Godot project
/// (`res://` or `user://` paths)
pub struct ResourceConfigSource {
    path: String,
}

impl ResourceConfigSource {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigSource for ResourceConfigSource {
    fn load(&self) -> PoolResult<RegistryConfig> {
        if !FileAccess::file_exists(self.path.as_str()) {
            return Err(PoolError::configuration(format!(
                "pool configuration {} not found",
                self.path
            )));
        }

        let contents = FileAccess::get_file_as_string(self.path.as_str()).to_string();
        RegistryConfig::from_json(&contents).map_err(|err| {
            PoolError::configuration(format!(
                "pool configuration {} is malformed: {}",
                self.path, err
            ))
        })
    }
}

// ============================================================================
// Godot FFI wrapper
// ============================================================================

/// Scene-side owner of the pool manager
///
/// Meant to be registered once as an autoload. The manager is built on the
/// first call that needs it and kept for the lifetime of the node; pooled
/// nodes live under an "Object Pool" child of this node.
#[derive(GodotClass)]
#[class(base=Node)]
pub struct GodotPoolManager {
    #[export]
    config_path: GString,
    manager: OnceCell<PoolManager<GodotSceneFactory>>,
    base: Base<Node>,
}

#[godot_api]
impl INode for GodotPoolManager {
    fn init(base: Base<Node>) -> Self {
        Self {
            config_path: GString::from(DEFAULT_CONFIG_PATH),
            manager: OnceCell::new(),
            base,
        }
    }

    fn exit_tree(&mut self) {
        if let Some(manager) = self.manager.get_mut() {
            manager.dispose();
        }
    }
}

#[godot_api]
impl GodotPoolManager {
    /// Rent a node from the named pool. The node comes back disabled and
    /// hidden; the caller activates it.
    #[func]
    fn get_object(&mut self, name: GString) -> Option<Gd<Node>> {
        let name = name.to_string();
        let manager = self.pool_manager()?;

        match manager.get_object(&name) {
            Ok(node) => Some(node),
            Err(err) => {
                godot_error!("[POOL MANAGER] get_object('{}') failed: {}", name, err);
                None
            }
        }
    }

    #[func]
    fn get_parent_container(&mut self) -> Option<Gd<Node>> {
        self.pool_manager()
            .and_then(|manager| manager.parent_container().cloned())
    }

    #[func]
    fn has_pool(&mut self, name: GString) -> bool {
        let name = name.to_string();
        self.pool_manager()
            .map_or(false, |manager| manager.registry().pool(&name).is_some())
    }

    /// Destroy every pooled node ahead of `exit_tree`
    #[func]
    fn dispose_pools(&mut self) {
        if let Some(manager) = self.manager.get_mut() {
            manager.dispose();
        }
    }
}

impl GodotPoolManager {
    fn pool_manager(&mut self) -> Option<&mut PoolManager<GodotSceneFactory>> {
        if self.manager.get().is_none() {
            let factory = GodotSceneFactory::new(self.to_gd().upcast::<Node>());
            let source = ResourceConfigSource::new(self.config_path.to_string());

            if let Err(err) = self
                .manager
                .get_or_try_init(|| PoolManager::load(factory, &source))
            {
                godot_error!("[POOL MANAGER] Failed to load {}: {}", self.config_path, err);
                return None;
            }
        }

        self.manager.get_mut()
    }
}
