/// Fixed-budget entity recycling
///
/// `ObjectPool` holds the instances of one template, `PoolRegistry`
/// routes lookups by pool name and owns the shared parent container,
/// `PoolManager` brings a registry up from persisted configuration.

pub mod config;
pub mod manager;
pub mod object_pool;
pub mod registry;

pub use config::{ConfigSource, JsonFileSource, PoolConfig, RegistryConfig, DEFAULT_CONFIG_PATH};
pub use manager::PoolManager;
pub use object_pool::ObjectPool;
pub use registry::{PoolRegistry, CONTAINER_NAME};
