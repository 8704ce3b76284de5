//! Filesystem storage for rosters and target lists.
//!
//! Directory structure:
//! ~/.rosterlab/
//!   config.yaml          # Service URL, flags, last opened files
//!   rosterlab.log
//!   rosters/
//!     default_roster.yaml
//!     space_marines.yaml
//!   targets/
//!     default.yaml
//!     elites.yaml

use std::fs;
use std::path::{Path, PathBuf};

use rosterlab_core::RosterStore;
use rosterlab_core::model::{TargetProfile, WeaponProfile};

use crate::data::{RosterFile, TargetListFile};
use crate::platform::storage::{RosterSummary, Storage, StorageError, TargetListSummary};
use crate::util::io::atomic_write;

/// Roster listed first
pub const DEFAULT_ROSTER: &str = "default_roster";
/// Target list listed first and never deleted
pub const DEFAULT_TARGET_LIST: &str = "default";

/// Storage rooted at a data directory
pub struct NativeStorage {
    root: PathBuf,
}

impl NativeStorage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Get the default data directory path (~/.rosterlab/)
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".rosterlab")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn rosters_dir(&self) -> PathBuf {
        self.root.join("rosters")
    }

    fn targets_dir(&self) -> PathBuf {
        self.root.join("targets")
    }

    fn roster_path(&self, filename: &str) -> PathBuf {
        Self::resolve(&self.rosters_dir(), filename)
    }

    fn target_list_path(&self, filename: &str) -> PathBuf {
        Self::resolve(&self.targets_dir(), filename)
    }

    /// Path of the file stored under `filename`.
    ///
    /// `{key}.yaml` wins; otherwise any `.yaml`/`.yml` file whose stem
    /// sanitizes to the same key. A name with no file maps to `{key}.yaml`.
    fn resolve(dir: &Path, filename: &str) -> PathBuf {
        let key = sanitize_filename(filename);
        let exact = dir.join(format!("{key}.yaml"));
        if exact.exists() {
            return exact;
        }
        Self::yaml_files(dir)
            .ok()
            .and_then(|files| files.into_iter().find(|(k, _)| *k == key))
            .map(|(_, path)| path)
            .unwrap_or(exact)
    }

    fn ensure_init(&self) -> Result<(), StorageError> {
        if !self.exists() {
            self.init()?;
        }
        Ok(())
    }

    fn read(path: &Path, filename: &str) -> Result<String, StorageError> {
        if !path.exists() {
            return Err(StorageError::NotFound(filename.to_string()));
        }
        fs::read_to_string(path).map_err(|e| StorageError::Io(format!("Failed to read file: {}", e)))
    }

    /// Every `.yaml`/`.yml` file in `dir` keyed by its sanitized stem.
    ///
    /// One entry per key: the `{key}.yaml` file if present, otherwise the
    /// first matching path in sorted order.
    fn yaml_files(dir: &Path) -> Result<Vec<(String, PathBuf)>, StorageError> {
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(dir)
            .map_err(|e| StorageError::Io(format!("Failed to read directory: {}", e)))?;

        let mut files = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path
                .extension()
                .is_some_and(|ext| ext == "yaml" || ext == "yml")
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                files.push((sanitize_filename(stem), path));
            }
        }

        files.sort_by(|(a_key, a_path), (b_key, b_path)| {
            let a_exact = a_path.file_name().and_then(|n| n.to_str()) == Some(format!("{a_key}.yaml").as_str());
            let b_exact = b_path.file_name().and_then(|n| n.to_str()) == Some(format!("{b_key}.yaml").as_str());
            (a_key, !a_exact, a_path).cmp(&(b_key, !b_exact, b_path))
        });
        files.dedup_by(|later, earlier| later.0 == earlier.0);
        Ok(files)
    }
}

impl Storage for NativeStorage {
    fn exists(&self) -> bool {
        self.root.exists() && self.rosters_dir().exists() && self.targets_dir().exists()
    }

    fn init(&self) -> Result<(), StorageError> {
        fs::create_dir_all(self.rosters_dir())
            .map_err(|e| StorageError::Io(format!("Failed to create rosters directory: {}", e)))?;
        fs::create_dir_all(self.targets_dir())
            .map_err(|e| StorageError::Io(format!("Failed to create targets directory: {}", e)))?;
        Ok(())
    }

    fn list_rosters(&self) -> Result<Vec<RosterSummary>, StorageError> {
        let mut summaries = Vec::new();
        for (filename, _) in Self::yaml_files(&self.rosters_dir())? {
            match self.load_roster(&filename) {
                Ok(file) => {
                    let totals = RosterStore::from_weapons(file.roster).totals();
                    summaries.push(RosterSummary {
                        filename,
                        name: file.name,
                        total_points: totals.total_points,
                        unit_count: totals.unit_count,
                        weapon_count: totals.weapon_count,
                    });
                }
                Err(e) => {
                    tracing::warn!(roster = %filename, error = %e, "Skipping unreadable roster");
                }
            }
        }

        summaries.sort_by(|a, b| listing_order(&a.filename, &a.name, &b.filename, &b.name, DEFAULT_ROSTER));
        Ok(summaries)
    }

    fn load_roster(&self, filename: &str) -> Result<RosterFile, StorageError> {
        let content = Self::read(&self.roster_path(filename), filename)?;
        let file = RosterFile::from_yaml(&content)
            .map_err(|e| StorageError::Parse(format!("Failed to parse roster: {}", e)))?;

        if file.roster.is_empty() {
            return Err(StorageError::Parse(format!("Roster '{}' has no weapons", filename)));
        }
        let errors = RosterStore::from_weapons(file.roster.clone()).validate();
        if let Some(first) = errors.first() {
            return Err(StorageError::Parse(format!(
                "Roster '{}' failed validation ({} problems): {}",
                filename,
                errors.len(),
                first
            )));
        }

        tracing::info!(roster = filename, weapons = file.roster.len(), "Loaded roster");
        Ok(file)
    }

    fn save_roster(
        &self,
        filename: &str,
        name: &str,
        weapons: &[WeaponProfile],
    ) -> Result<String, StorageError> {
        self.ensure_init()?;

        let sanitized = sanitize_filename(filename);
        let path = self.roster_path(&sanitized);

        // Keep the original creation time on overwrite
        let mut file = RosterFile::new(name, weapons.to_vec());
        if let Ok(existing) = self.load_roster(&sanitized) {
            file.created = existing.created;
            file.description = existing.description;
        }

        let yaml = file
            .to_yaml()
            .map_err(|e| StorageError::Serialize(format!("Failed to serialize roster: {}", e)))?;
        atomic_write(&path, &yaml)
            .map_err(|e| StorageError::Io(format!("Failed to write roster: {}", e)))?;

        tracing::info!(roster = %sanitized, weapons = weapons.len(), "Saved roster");
        Ok(sanitized)
    }

    fn delete_roster(&self, filename: &str) -> Result<(), StorageError> {
        let path = self.roster_path(filename);
        if !path.exists() {
            return Err(StorageError::NotFound(filename.to_string()));
        }
        fs::remove_file(path)
            .map_err(|e| StorageError::Io(format!("Failed to delete roster: {}", e)))?;
        tracing::info!(roster = filename, "Deleted roster");
        Ok(())
    }

    fn list_target_lists(&self) -> Result<Vec<TargetListSummary>, StorageError> {
        let mut summaries = Vec::new();
        for (filename, _) in Self::yaml_files(&self.targets_dir())? {
            match self.load_target_list(&filename) {
                Ok(file) => summaries.push(TargetListSummary {
                    filename,
                    name: file.name,
                    target_count: file.targets.len(),
                    targets: file.targets.into_iter().map(|t| t.name).collect(),
                }),
                Err(e) => {
                    tracing::warn!(targets = %filename, error = %e, "Skipping unreadable target list");
                }
            }
        }

        summaries.sort_by(|a, b| {
            listing_order(&a.filename, &a.name, &b.filename, &b.name, DEFAULT_TARGET_LIST)
        });
        Ok(summaries)
    }

    fn load_target_list(&self, filename: &str) -> Result<TargetListFile, StorageError> {
        let content = Self::read(&self.target_list_path(filename), filename)?;
        let file = TargetListFile::from_yaml(&content)
            .map_err(|e| StorageError::Parse(format!("Failed to parse target list: {}", e)))?;

        if let Some(error) = file.targets.iter().flat_map(|t| t.validate()).next() {
            return Err(StorageError::Parse(format!(
                "Target list '{}' failed validation: {}",
                filename, error
            )));
        }
        Ok(file)
    }

    fn save_target_list(
        &self,
        filename: &str,
        name: &str,
        targets: &[TargetProfile],
    ) -> Result<String, StorageError> {
        self.ensure_init()?;

        let sanitized = sanitize_filename(filename);
        let path = self.target_list_path(&sanitized);

        let mut file = TargetListFile::new(name, targets.to_vec());
        if let Ok(existing) = self.load_target_list(&sanitized) {
            file.created = existing.created;
            file.description = existing.description;
            file.readonly = existing.readonly;
        }

        let yaml = file.to_yaml().map_err(|e| {
            StorageError::Serialize(format!("Failed to serialize target list: {}", e))
        })?;
        atomic_write(&path, &yaml)
            .map_err(|e| StorageError::Io(format!("Failed to write target list: {}", e)))?;

        tracing::info!(targets = %sanitized, count = targets.len(), "Saved target list");
        Ok(sanitized)
    }

    fn delete_target_list(&self, filename: &str) -> Result<(), StorageError> {
        let sanitized = sanitize_filename(filename);
        if sanitized == DEFAULT_TARGET_LIST {
            return Err(StorageError::Protected(sanitized));
        }

        let path = self.target_list_path(&sanitized);
        if !path.exists() {
            return Err(StorageError::NotFound(filename.to_string()));
        }
        if let Ok(file) = self.load_target_list(&sanitized)
            && file.readonly
        {
            return Err(StorageError::Protected(sanitized));
        }

        fs::remove_file(path)
            .map_err(|e| StorageError::Io(format!("Failed to delete target list: {}", e)))?;
        tracing::info!(targets = %sanitized, "Deleted target list");
        Ok(())
    }
}

/// Default entry first, then case-insensitive by display name.
fn listing_order(
    a_file: &str,
    a_name: &str,
    b_file: &str,
    b_name: &str,
    default: &str,
) -> std::cmp::Ordering {
    (a_file != default, a_name.to_lowercase()).cmp(&(b_file != default, b_name.to_lowercase()))
}

/// Sanitize a filename: lowercase, with spaces and anything outside
/// `[a-z0-9_-]` replaced by `_`. A trailing `.yaml`/`.json` is dropped.
pub fn sanitize_filename(name: &str) -> String {
    let trimmed = name.trim();
    let stem = [".yaml", ".yml", ".json"]
        .iter()
        .find_map(|ext| trimmed.strip_suffix(ext))
        .unwrap_or(trimmed);

    stem.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}
