use std::io;

use thiserror::Error;

/// Errors surfaced by the library managers.
///
/// Validation variants are raised before any filesystem mutation. `Io` and
/// `Serialize` can surface mid-operation, in which case the directory tree
/// and the JSON index may disagree until the next successful write; callers
/// must report them rather than continue.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("path '{0}' escapes its root directory")]
    PathTraversal(String),

    #[error("'{0}' is a reserved identifier")]
    Reserved(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("failed to serialize metadata: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MediaError>;
