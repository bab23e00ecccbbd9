use godot::prelude::*;

pub mod entity;
pub mod error;
pub mod godot_pool_manager;
pub mod logging;
pub mod pool;

pub use entity::{EntityFactory, GodotSceneFactory, HeadlessScene};
pub use error::{PoolError, PoolResult};
pub use pool::{ObjectPool, PoolManager, PoolRegistry};

struct ScenePool;

#[gdextension]
unsafe impl ExtensionLibrary for ScenePool {
    fn on_level_init(level: InitLevel) {
        if level == InitLevel::Scene {
            logging::init(log::LevelFilter::Info);
            godot_print!("ScenePool v0.1.0 - object pool GDExtension loaded successfully!");
        }
    }
}
