use thiserror::Error;

/// Errors returned when opening a [`DataStore`](crate::DataStore).
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("another store for this preferences file is already open")]
    InstanceAlreadyLoaded,

    #[error("could not determine a configuration directory")]
    NoConfigDir,

    #[error("storage error: {0}")]
    StorageError(#[from] std::io::Error),

    #[error("failed to parse preferences at {0}: {1}")]
    DeserializationError(String, #[source] toml::de::Error),
}

/// Errors returned by store writes.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("failed to serialize preferences: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("background write failed: {0}")]
    Background(String),
}
