use thiserror::Error;

/// Errors raised by pools, the registry and the manager.
///
/// Both kinds are raised at the point of detection and never retried:
/// they describe programmer or configuration mistakes, not transient
/// conditions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// Missing template, empty or unreadable pool configuration,
    /// duplicate pool names.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Lookup of a pool name that is not registered.
    #[error("pool '{0}' not found")]
    NotFound(String),
}

impl PoolError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        PoolError::Configuration(message.into())
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, PoolError::Configuration(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PoolError::NotFound(_))
    }
}

pub type PoolResult<T> = Result<T, PoolError>;
