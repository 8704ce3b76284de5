//! Defensive target profiles.

use serde::{Deserialize, Serialize};

use super::values::{RollTarget, optional_roll, yes_no};
use super::weapon::check_range;
use crate::error::ValidationError;

fn default_unit_size() -> u32 {
    1
}

/// Defensive stat block a roster is measured against.
///
/// Identity within a target list is the `name`; duplicates are allowed and
/// resolve to the first entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetProfile {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Pts")]
    pub pts: u32,
    #[serde(rename = "T")]
    pub toughness: u8,
    #[serde(rename = "W")]
    pub wounds: u8,
    #[serde(rename = "Sv")]
    pub save: RollTarget,
    #[serde(rename = "Inv", with = "optional_roll", default)]
    pub invuln: Option<RollTarget>,
    #[serde(rename = "FNP", with = "optional_roll", default)]
    pub fnp: Option<RollTarget>,
    #[serde(rename = "Stealth", with = "yes_no", default)]
    pub stealth: bool,
    #[serde(rename = "UnitSize", default = "default_unit_size")]
    pub unit_size: u32,
}

impl TargetProfile {
    pub fn new(name: impl Into<String>, pts: u32, toughness: u8, wounds: u8, save: RollTarget) -> Self {
        Self {
            name: name.into(),
            pts,
            toughness,
            wounds,
            save,
            invuln: None,
            fnp: None,
            stealth: false,
            unit_size: default_unit_size(),
        }
    }

    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(ValidationError::new(&self.name, "Name", "must not be empty"));
        }
        check_range(&mut errors, &self.name, "T", i32::from(self.toughness), 1, 14);
        check_range(&mut errors, &self.name, "W", i32::from(self.wounds), 1, 30);
        if self.unit_size == 0 {
            errors.push(ValidationError::new(&self.name, "UnitSize", "must be at least 1"));
        }
        errors
    }
}

/// Partial update of a target profile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetPatch {
    pub name: Option<String>,
    pub pts: Option<u32>,
    pub toughness: Option<u8>,
    pub wounds: Option<u8>,
    pub save: Option<RollTarget>,
    pub invuln: Option<Option<RollTarget>>,
    pub fnp: Option<Option<RollTarget>>,
    pub stealth: Option<bool>,
    pub unit_size: Option<u32>,
}

impl TargetPatch {
    pub fn apply(&self, t: &mut TargetProfile) {
        if let Some(name) = &self.name {
            t.name = name.clone();
        }
        if let Some(pts) = self.pts {
            t.pts = pts;
        }
        if let Some(toughness) = self.toughness {
            t.toughness = toughness;
        }
        if let Some(wounds) = self.wounds {
            t.wounds = wounds;
        }
        if let Some(save) = self.save {
            t.save = save;
        }
        if let Some(invuln) = self.invuln {
            t.invuln = invuln;
        }
        if let Some(fnp) = self.fnp {
            t.fnp = fnp;
        }
        if let Some(stealth) = self.stealth {
            t.stealth = stealth;
        }
        if let Some(unit_size) = self.unit_size {
            t.unit_size = unit_size;
        }
    }
}
