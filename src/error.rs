//! Error types for imgsort

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for imgsort operations
pub type Result<T> = std::result::Result<T, SorterError>;

#[derive(Error, Debug)]
pub enum SorterError {
    /// Missing or malformed settings; reported before a session starts
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The source folder holds no eligible images
    #[error("No images found in {}", .0.display())]
    EmptyQueue(PathBuf),

    /// A move or undo could not be carried out on disk
    #[error("File system error: {0}")]
    FileSystem(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SorterError {
    /// Builds the error reported when a relocation would overwrite an existing file
    pub fn already_exists(path: &std::path::Path) -> Self {
        SorterError::FileSystem(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("Refusing to overwrite existing file: {}", path.display()),
        ))
    }

    /// Returns the underlying io::ErrorKind for filesystem failures
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            SorterError::FileSystem(e) => Some(e.kind()),
            _ => None,
        }
    }
}
