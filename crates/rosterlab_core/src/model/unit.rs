use serde::Serialize;

use super::{UnitId, WeaponProfile};

/// Read-only view of every roster row sharing one `UnitId`.
///
/// Built on demand by [`crate::roster::RosterStore::group_by_unit`] and
/// never stored. Unit-level fields come from the first row of the unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Unit {
    pub id: UnitId,
    pub name: String,
    pub qty: u32,
    pub pts: u32,
    /// Weapon rows in roster order
    pub weapons: Vec<WeaponProfile>,
}

impl Unit {
    pub fn weapon_count(&self) -> usize {
        self.weapons.len()
    }
}
