//! Roster storage and unit grouping.
//!
//! The roster is a flat, ordered list of weapon rows. Units are not stored:
//! they are derived on read by indexing rows by `UnitId`. Every mutation goes
//! through [`RosterStore`], which keeps the unit-level fields (`Name`, `Qty`,
//! `Pts`) identical across the rows of a unit.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::model::{Unit, UnitId, WeaponPatch, WeaponProfile};

/// Aggregate numbers for a roster, as shown in roster listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterTotals {
    /// Points of every unit, counted once per unit
    pub total_points: u32,
    pub unit_count: usize,
    pub weapon_count: usize,
}

/// Row indices of each unit, in first-seen order of `UnitId`.
struct UnitIndex<'a> {
    order: Vec<&'a UnitId>,
    rows: FxHashMap<&'a UnitId, Vec<usize>>,
}

impl<'a> UnitIndex<'a> {
    fn build(weapons: &'a [WeaponProfile]) -> Self {
        let mut order = Vec::new();
        let mut rows: FxHashMap<&UnitId, Vec<usize>> = FxHashMap::default();

        for (idx, weapon) in weapons.iter().enumerate() {
            rows.entry(&weapon.unit_id)
                .or_insert_with(|| {
                    order.push(&weapon.unit_id);
                    Vec::new()
                })
                .push(idx);
        }

        Self { order, rows }
    }

    fn units(&self) -> impl Iterator<Item = (&'a UnitId, &[usize])> + '_ {
        self.order
            .iter()
            .map(|id| (*id, self.rows.get(*id).map(Vec::as_slice).unwrap_or(&[])))
    }
}

/// Owner of the roster. All operations are total: unknown ids are no-ops.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RosterStore {
    weapons: Vec<WeaponProfile>,
}

impl RosterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_weapons(weapons: Vec<WeaponProfile>) -> Self {
        Self { weapons }
    }

    /// Replace the whole roster, e.g. after loading a file.
    pub fn set_roster(&mut self, weapons: Vec<WeaponProfile>) {
        self.weapons = weapons;
    }

    pub fn weapons(&self) -> &[WeaponProfile] {
        &self.weapons
    }

    pub fn into_weapons(self) -> Vec<WeaponProfile> {
        self.weapons
    }

    pub fn len(&self) -> usize {
        self.weapons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weapons.is_empty()
    }

    /// Append a weapon row.
    ///
    /// When `unit_id` names a unit already in the roster, the new row takes
    /// that unit's id, name, qty and pts from its first existing row.
    /// Otherwise the row is inserted as supplied and starts a new unit.
    /// Returns the roster index of the new row.
    pub fn add_weapon(&mut self, mut profile: WeaponProfile, unit_id: Option<&UnitId>) -> usize {
        if let Some(id) = unit_id
            && let Some(sibling) = self.weapons.iter().find(|w| &w.unit_id == id)
        {
            profile.inherit_unit_fields(sibling);
        }

        tracing::debug!(unit = %profile.unit_id, weapon = %profile.weapon, "adding weapon");
        self.weapons.push(profile);
        self.weapons.len() - 1
    }

    /// Patch exactly the row at roster position `index`, if it belongs to `unit_id`.
    ///
    /// Changing `name`, `qty` or `pts` here diverges the row from its
    /// siblings; use [`Self::update_unit_attributes`] for unit-level fields.
    pub fn update_weapon(&mut self, unit_id: &UnitId, index: usize, patch: &WeaponPatch) -> bool {
        let has_siblings = self.unit_row_count(unit_id) > 1;
        let Some(weapon) = self.weapons.get_mut(index) else {
            return false;
        };
        if &weapon.unit_id != unit_id {
            return false;
        }

        if patch.touches_unit_fields() && has_siblings {
            tracing::warn!(
                unit = %unit_id,
                index,
                "single-row update changes unit-level fields; siblings not updated"
            );
        }
        patch.apply(weapon);
        true
    }

    /// Patch every row of a unit. Returns the number of rows touched.
    pub fn update_unit_attributes(&mut self, unit_id: &UnitId, patch: &WeaponPatch) -> usize {
        let mut touched = 0;
        for weapon in self.weapons.iter_mut().filter(|w| &w.unit_id == unit_id) {
            patch.apply(weapon);
            touched += 1;
        }
        touched
    }

    /// Remove the row at roster position `index` if it belongs to `unit_id`.
    pub fn delete_weapon(&mut self, unit_id: &UnitId, index: usize) -> Option<WeaponProfile> {
        match self.weapons.get(index) {
            Some(weapon) if &weapon.unit_id == unit_id => Some(self.weapons.remove(index)),
            _ => None,
        }
    }

    /// Remove every row of a unit. Returns the number of rows removed.
    pub fn delete_unit(&mut self, unit_id: &UnitId) -> usize {
        let before = self.weapons.len();
        self.weapons.retain(|w| &w.unit_id != unit_id);
        before - self.weapons.len()
    }

    /// Derive the unit view, in first-seen order of `UnitId`.
    pub fn group_by_unit(&self) -> Vec<Unit> {
        UnitIndex::build(&self.weapons)
            .units()
            .map(|(id, rows)| self.unit_from_rows(id, rows))
            .collect()
    }

    /// The unit view for one id, if any row carries it.
    pub fn unit(&self, unit_id: &UnitId) -> Option<Unit> {
        let rows: Vec<usize> = self.row_indices(unit_id);
        (!rows.is_empty()).then(|| self.unit_from_rows(unit_id, &rows))
    }

    /// Roster positions of a unit's rows, in order.
    pub fn row_indices(&self, unit_id: &UnitId) -> Vec<usize> {
        self.weapons
            .iter()
            .enumerate()
            .filter(|(_, w)| &w.unit_id == unit_id)
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn unit_weapons(&self, unit_id: &UnitId) -> Vec<&WeaponProfile> {
        self.weapons
            .iter()
            .filter(|w| &w.unit_id == unit_id)
            .collect()
    }

    pub fn contains_unit(&self, unit_id: &UnitId) -> bool {
        self.weapons.iter().any(|w| &w.unit_id == unit_id)
    }

    /// Unit ids in first-seen order.
    pub fn unit_ids(&self) -> Vec<UnitId> {
        UnitIndex::build(&self.weapons)
            .order
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn totals(&self) -> RosterTotals {
        let index = UnitIndex::build(&self.weapons);
        let total_points = index
            .units()
            .filter_map(|(_, rows)| rows.first())
            .map(|&row| self.weapons[row].pts)
            .sum();

        RosterTotals {
            total_points,
            unit_count: index.order.len(),
            weapon_count: self.weapons.len(),
        }
    }

    /// True when every unit's rows agree on name, qty and pts.
    pub fn is_consistent(&self) -> bool {
        UnitIndex::build(&self.weapons).units().all(|(_, rows)| {
            let first = &self.weapons[rows[0]];
            rows.iter().all(|&row| self.weapons[row].shares_unit_fields(first))
        })
    }

    /// Validate every row's characteristics.
    pub fn validate(&self) -> Vec<ValidationError> {
        self.weapons.iter().flat_map(WeaponProfile::validate).collect()
    }

    fn unit_row_count(&self, unit_id: &UnitId) -> usize {
        self.weapons.iter().filter(|w| &w.unit_id == unit_id).count()
    }

    fn unit_from_rows(&self, id: &UnitId, rows: &[usize]) -> Unit {
        let weapons: Vec<WeaponProfile> = rows.iter().map(|&row| self.weapons[row].clone()).collect();
        let (name, qty, pts) = weapons
            .first()
            .map(|w| (w.name.clone(), w.qty, w.pts))
            .unwrap_or_default();

        Unit {
            id: id.clone(),
            name,
            qty,
            pts,
            weapons,
        }
    }
}
