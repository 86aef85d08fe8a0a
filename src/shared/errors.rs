use thiserror::Error;

/// Common storage-related errors used across plugins.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to access storage: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse data: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Failed to create directory: {0}")]
    DirectoryError(String),

    #[error("Storage is unavailable: {0}")]
    Unavailable(String),
}

/// Fatal errors of the server binary.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid configuration: {0}")]
    Settings(#[from] crate::core::settings::SettingsError),
    #[error("Server failed: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    pub fn directory(msg: impl Into<String>) -> Self {
        StorageError::DirectoryError(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        StorageError::Unavailable(msg.into())
    }
}
