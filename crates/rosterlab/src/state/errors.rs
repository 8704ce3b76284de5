//! Error types for loading, saving, and matrix computation.

use rosterlab_core::ResolveError;

use crate::platform::StorageError;

#[derive(Debug)]
pub enum LoadError {
    Io(String),
    Parse(String),
    NotFound(String),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Io(msg) => write!(f, "IO error: {}", msg),
            LoadError::Parse(msg) => write!(f, "Parse error: {}", msg),
            LoadError::NotFound(name) => write!(f, "'{}' not found", name),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<StorageError> for LoadError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound(name) => LoadError::NotFound(name),
            StorageError::Parse(msg) => LoadError::Parse(msg),
            StorageError::Io(msg)
            | StorageError::Serialize(msg)
            | StorageError::Protected(msg) => LoadError::Io(msg),
        }
    }
}

#[derive(Debug)]
pub enum SaveError {
    Io(String),
    Serialize(String),
    /// Delete refused for a protected document
    Protected(String),
    NotFound(String),
    /// Nothing has been opened or named yet
    NoPath,
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Io(msg) => write!(f, "IO error: {}", msg),
            SaveError::Serialize(msg) => write!(f, "Serialization error: {}", msg),
            SaveError::Protected(name) => write!(f, "'{}' is protected", name),
            SaveError::NotFound(name) => write!(f, "'{}' not found", name),
            SaveError::NoPath => write!(f, "No filename set"),
        }
    }
}

impl std::error::Error for SaveError {}

impl From<StorageError> for SaveError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::Serialize(msg) => SaveError::Serialize(msg),
            StorageError::Protected(name) => SaveError::Protected(name),
            StorageError::NotFound(name) => SaveError::NotFound(name),
            StorageError::Io(msg) | StorageError::Parse(msg) => SaveError::Io(msg),
        }
    }
}

#[derive(Debug)]
pub enum MatrixError {
    /// Roster or target list is empty
    EmptyInputs,
    Resolve(ResolveError),
    /// The request was superseded or cancelled
    Cancelled,
    WorkerStopped,
    Timeout,
}

impl std::fmt::Display for MatrixError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatrixError::EmptyInputs => write!(f, "Roster and target list must both be non-empty"),
            MatrixError::Resolve(e) => write!(f, "{}", e),
            MatrixError::Cancelled => write!(f, "Matrix request cancelled"),
            MatrixError::WorkerStopped => write!(f, "Resolution worker has stopped"),
            MatrixError::Timeout => write!(f, "Timed out waiting for the resolution service"),
        }
    }
}

impl std::error::Error for MatrixError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MatrixError::Resolve(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ResolveError> for MatrixError {
    fn from(e: ResolveError) -> Self {
        MatrixError::Resolve(e)
    }
}
