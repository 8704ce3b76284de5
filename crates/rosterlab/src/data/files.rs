//! On-disk document types for rosters and target lists.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use rosterlab_core::model::{TargetProfile, WeaponProfile};

/// A saved roster: metadata plus the flat weapon list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterFile {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub created: Timestamp,
    #[serde(default)]
    pub roster: Vec<WeaponProfile>,
}

impl RosterFile {
    pub fn new(name: impl Into<String>, roster: Vec<WeaponProfile>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            created: Timestamp::now(),
            roster,
        }
    }

    /// Parse from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_saphyr::Error> {
        serde_saphyr::from_str(yaml)
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String, serde_saphyr::ser::Error> {
        serde_saphyr::to_string(self)
    }
}

/// A saved target list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetListFile {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub created: Timestamp,
    /// Read-only lists cannot be deleted
    #[serde(default)]
    pub readonly: bool,
    #[serde(default)]
    pub targets: Vec<TargetProfile>,
}

impl TargetListFile {
    pub fn new(name: impl Into<String>, targets: Vec<TargetProfile>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            created: Timestamp::now(),
            readonly: false,
            targets,
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, serde_saphyr::Error> {
        serde_saphyr::from_str(yaml)
    }

    pub fn to_yaml(&self) -> Result<String, serde_saphyr::ser::Error> {
        serde_saphyr::to_string(self)
    }
}
