//! Unit tests for the roster analysis core
//!
//! Tests are organized by topic:
//! - `roster` - RosterStore mutations and the shared unit-field invariant
//! - `targets` - TargetStore operations
//! - `grading` - CPK grade bands and sentinel handling
//! - `matrix` - min-CPK reduction, no-data cells, determinism
//! - `wire` - serialized field names and value notation


use crate::model::{CombatResult, DiceValue, RollTarget, TargetProfile, WeaponProfile};

pub(crate) fn weapon(unit: &str, name: &str, weapon: &str, pts: u32) -> WeaponProfile {
    WeaponProfile::new(unit, name, weapon)
        .with_unit(5, pts)
        .with_stats(DiceValue::Fixed(2), 3, 4, -1, DiceValue::Fixed(1))
}

pub(crate) fn target(name: &str) -> TargetProfile {
    TargetProfile::new(name, 100, 4, 2, RollTarget::new(3).unwrap())
}

pub(crate) fn result(unit: &str, weapon: &str, cpk: f64) -> CombatResult {
    CombatResult::new(unit, "Unit", weapon).with_metrics(1.0, 2.0, cpk, 1.0)
}
