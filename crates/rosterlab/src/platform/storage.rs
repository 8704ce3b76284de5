//! Storage abstraction for roster and target-list persistence.
//!
//! Rosters and target lists are addressed by filename. [`Storage`] hides
//! where the documents live; [`crate::platform::NativeStorage`] keeps them as
//! YAML files in the data directory.

use rosterlab_core::model::{TargetProfile, WeaponProfile};

use crate::data::{RosterFile, TargetListFile};

/// Error types for storage operations
#[derive(Debug)]
pub enum StorageError {
    /// I/O error (permission denied, disk full, etc.)
    Io(String),
    /// Parse error (invalid YAML, failed validation)
    Parse(String),
    /// Serialization error
    Serialize(String),
    /// No document with that filename
    NotFound(String),
    /// The document may not be deleted
    Protected(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(msg) => write!(f, "IO error: {}", msg),
            StorageError::Parse(msg) => write!(f, "Parse error: {}", msg),
            StorageError::Serialize(msg) => write!(f, "Serialization error: {}", msg),
            StorageError::NotFound(name) => write!(f, "Not found: {}", name),
            StorageError::Protected(name) => write!(f, "'{}' is protected and cannot be deleted", name),
        }
    }
}

impl std::error::Error for StorageError {}

/// Listing entry for a saved roster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterSummary {
    pub filename: String,
    pub name: String,
    pub total_points: u32,
    pub unit_count: usize,
    pub weapon_count: usize,
}

/// Listing entry for a saved target list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetListSummary {
    pub filename: String,
    pub name: String,
    pub target_count: usize,
    /// Target names in list order
    pub targets: Vec<String>,
}

/// Filename-keyed persistence for rosters and target lists.
pub trait Storage {
    /// Check if storage has been initialized
    fn exists(&self) -> bool;

    /// Initialize the storage (create directories, etc.)
    fn init(&self) -> Result<(), StorageError>;

    /// Summaries of every readable roster. Unreadable files are skipped.
    fn list_rosters(&self) -> Result<Vec<RosterSummary>, StorageError>;

    fn load_roster(&self, filename: &str) -> Result<RosterFile, StorageError>;

    /// Create or replace a roster. Returns the sanitized filename.
    fn save_roster(
        &self,
        filename: &str,
        name: &str,
        weapons: &[WeaponProfile],
    ) -> Result<String, StorageError>;

    fn delete_roster(&self, filename: &str) -> Result<(), StorageError>;

    fn list_target_lists(&self) -> Result<Vec<TargetListSummary>, StorageError>;

    fn load_target_list(&self, filename: &str) -> Result<TargetListFile, StorageError>;

    /// Create or replace a target list. Returns the sanitized filename.
    fn save_target_list(
        &self,
        filename: &str,
        name: &str,
        targets: &[TargetProfile],
    ) -> Result<String, StorageError>;

    /// Delete a target list. The `default` list and read-only lists are refused.
    fn delete_target_list(&self, filename: &str) -> Result<(), StorageError>;
}
