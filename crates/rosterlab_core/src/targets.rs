//! Target list for the active analysis session.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::model::{TargetPatch, TargetProfile};

/// Ordered list of target profiles. Lookups by name hit the first match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetStore {
    targets: Vec<TargetProfile>,
}

impl TargetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_targets(targets: Vec<TargetProfile>) -> Self {
        Self { targets }
    }

    pub fn set_targets(&mut self, targets: Vec<TargetProfile>) {
        self.targets = targets;
    }

    pub fn add_target(&mut self, target: TargetProfile) {
        self.targets.push(target);
    }

    pub fn update_target(&mut self, name: &str, patch: &TargetPatch) -> bool {
        match self.targets.iter_mut().find(|t| t.name == name) {
            Some(target) => {
                patch.apply(target);
                true
            }
            None => false,
        }
    }

    pub fn remove_target(&mut self, name: &str) -> Option<TargetProfile> {
        let idx = self.targets.iter().position(|t| t.name == name)?;
        Some(self.targets.remove(idx))
    }

    pub fn get(&self, name: &str) -> Option<&TargetProfile> {
        self.targets.iter().find(|t| t.name == name)
    }

    pub fn targets(&self) -> &[TargetProfile] {
        &self.targets
    }

    pub fn names(&self) -> Vec<&str> {
        self.targets.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn validate(&self) -> Vec<ValidationError> {
        self.targets.iter().flat_map(TargetProfile::validate).collect()
    }
}
