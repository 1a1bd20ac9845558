// ABOUTME: Error types for the revealpack build pipeline
// ABOUTME: Provides structured error handling for each stage of the build

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PackError {
    #[error("File system error: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to access {path:?}: {source}")]
    PathError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path not found: {0}")]
    PathNotFoundError(PathBuf),

    #[error("Input validation error: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Template error: {0}")]
    TemplateError(#[from] minijinja::Error),

    #[error("Template not found: {0}")]
    TemplateNotFound(PathBuf),

    #[error("Theme could not be located: {0}")]
    ThemeNotFound(String),

    #[error("Failed to compile stylesheet {source_path:?}: {message}")]
    CompileError { source_path: PathBuf, message: String },

    #[error("Presentation '{deck}' failed: {source}")]
    DeckError {
        deck: String,
        #[source]
        source: Box<PackError>,
    },

    #[error("{} presentation(s) failed to build: {}", .0.len(), .0.join(", "))]
    DeckFailures(Vec<String>),

    #[error("Watch error: {0}")]
    WatchError(String),

    #[error("Unknown error: {0}")]
    UnknownError(String),
}

impl PackError {
    /// Attach the path an I/O error happened at
    pub fn at(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PackError::PathError {
            path: path.into(),
            source,
        }
    }
}

// Implement conversion from anyhow::Error to our PackError
impl From<anyhow::Error> for PackError {
    fn from(err: anyhow::Error) -> Self {
        PackError::UnknownError(err.to_string())
    }
}

impl From<walkdir::Error> for PackError {
    fn from(err: walkdir::Error) -> Self {
        match err.path().map(PathBuf::from) {
            Some(path) => PackError::ValidationError(format!(
                "Failed to walk directory {:?}: {}",
                path, err
            )),
            None => PackError::ValidationError(format!("Failed to walk directory: {}", err)),
        }
    }
}

pub type Result<T> = std::result::Result<T, PackError>;
