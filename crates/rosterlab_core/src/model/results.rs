//! Combat results produced by the external resolution service.

use serde::{Deserialize, Serialize};

use super::UnitId;

/// Sentinel CPK/TTK the resolution service reports when nothing dies.
pub const NO_KILL_SENTINEL: f64 = 999.0;

fn sentinel() -> f64 {
    NO_KILL_SENTINEL
}

/// Metrics for one weapon profile against one target.
///
/// Read-only input to the matrix engine. The service may send its own grade
/// in `grade_hint`; it is kept for display but never used, grades are always
/// recomputed locally from `cpk`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatResult {
    #[serde(rename = "UnitID")]
    pub unit_id: UnitId,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Weapon", default)]
    pub weapon: String,
    #[serde(rename = "Qty", default)]
    pub qty: u32,
    #[serde(rename = "Pts", default)]
    pub pts: u32,
    #[serde(rename = "Kills", default)]
    pub kills: f64,
    #[serde(rename = "Damage", default)]
    pub damage: f64,
    /// Cost per kill. `>= 999` or `<= 0` marks a degenerate result.
    #[serde(rename = "CPK", default = "sentinel")]
    pub cpk: f64,
    /// Activations needed to destroy the whole target unit
    #[serde(rename = "TTK", default = "sentinel")]
    pub ttk: f64,
    #[serde(rename = "CPK_Grade", default, skip_serializing_if = "Option::is_none")]
    pub grade_hint: Option<String>,
    #[serde(rename = "ProfileID", default, skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<String>,
}

impl CombatResult {
    pub fn new(unit_id: impl Into<UnitId>, name: impl Into<String>, weapon: impl Into<String>) -> Self {
        Self {
            unit_id: unit_id.into(),
            name: name.into(),
            weapon: weapon.into(),
            qty: 1,
            pts: 0,
            kills: 0.0,
            damage: 0.0,
            cpk: NO_KILL_SENTINEL,
            ttk: NO_KILL_SENTINEL,
            grade_hint: None,
            profile_id: None,
        }
    }

    pub fn with_metrics(mut self, kills: f64, damage: f64, cpk: f64, ttk: f64) -> Self {
        self.kills = kills;
        self.damage = damage;
        self.cpk = cpk;
        self.ttk = ttk;
        self
    }
}
