//! Weapon profiles: one attack-capable loadout row in a roster.

use serde::{Deserialize, Serialize};

use super::UnitId;
use super::values::{DiceValue, Range, yes_no};
use crate::error::ValidationError;

fn default_crit() -> u8 {
    6
}

fn default_loadout_group() -> String {
    "Standard".to_string()
}

/// One row of a roster.
///
/// `unit_id`, `name`, `qty` and `pts` describe the owning unit and are
/// duplicated on every row of that unit. The `RosterStore` keeps them in
/// sync; see [`crate::roster::RosterStore::add_weapon`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponProfile {
    #[serde(rename = "UnitID")]
    pub unit_id: UnitId,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Qty")]
    pub qty: u32,
    #[serde(rename = "Pts")]
    pub pts: u32,

    #[serde(rename = "Weapon")]
    pub weapon: String,
    #[serde(rename = "Loadout Group", default = "default_loadout_group")]
    pub loadout_group: String,
    #[serde(rename = "Range", default)]
    pub range: Range,
    #[serde(rename = "A")]
    pub attacks: DiceValue,
    /// Ballistic or weapon skill, hitting on this value or better
    #[serde(rename = "BS")]
    pub skill: u8,
    #[serde(rename = "S")]
    pub strength: u8,
    #[serde(rename = "AP")]
    pub ap: i8,
    #[serde(rename = "D")]
    pub damage: DiceValue,

    #[serde(rename = "Blast", with = "yes_no", default)]
    pub blast: bool,
    #[serde(rename = "Melta", default)]
    pub melta: u8,
    #[serde(rename = "RapidFire", default)]
    pub rapid_fire: u8,
    #[serde(rename = "TwinLinked", with = "yes_no", default)]
    pub twin_linked: bool,
    #[serde(rename = "Lethal", with = "yes_no", default)]
    pub lethal_hits: bool,
    #[serde(rename = "Dev", with = "yes_no", default)]
    pub devastating_wounds: bool,
    #[serde(rename = "Torrent", with = "yes_no", default)]
    pub torrent: bool,
    #[serde(rename = "IgnoresCover", with = "yes_no", default)]
    pub ignores_cover: bool,
    #[serde(rename = "CritHit", default = "default_crit")]
    pub crit_hit: u8,
    #[serde(rename = "CritWound", default = "default_crit")]
    pub crit_wound: u8,
    #[serde(rename = "Sustained", default)]
    pub sustained_hits: u8,
    #[serde(rename = "RR_H", with = "yes_no", default)]
    pub reroll_hits: bool,
    #[serde(rename = "RR_W", with = "yes_no", default)]
    pub reroll_wounds: bool,

    /// Rows sharing a profile id are exclusive firing modes of one weapon
    #[serde(rename = "ProfileID", default, skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<String>,
    #[serde(rename = "Keywords", default, skip_serializing_if = "String::is_empty")]
    pub keywords: String,
}

impl WeaponProfile {
    /// A plain ranged profile with no special rules.
    pub fn new(unit_id: impl Into<UnitId>, name: impl Into<String>, weapon: impl Into<String>) -> Self {
        Self {
            unit_id: unit_id.into(),
            name: name.into(),
            qty: 1,
            pts: 0,
            weapon: weapon.into(),
            loadout_group: default_loadout_group(),
            range: Range::default(),
            attacks: DiceValue::Fixed(1),
            skill: 4,
            strength: 4,
            ap: 0,
            damage: DiceValue::Fixed(1),
            blast: false,
            melta: 0,
            rapid_fire: 0,
            twin_linked: false,
            lethal_hits: false,
            devastating_wounds: false,
            torrent: false,
            ignores_cover: false,
            crit_hit: default_crit(),
            crit_wound: default_crit(),
            sustained_hits: 0,
            reroll_hits: false,
            reroll_wounds: false,
            profile_id: None,
            keywords: String::new(),
        }
    }

    pub fn with_unit(mut self, qty: u32, pts: u32) -> Self {
        self.qty = qty;
        self.pts = pts;
        self
    }

    pub fn with_stats(mut self, attacks: DiceValue, skill: u8, strength: u8, ap: i8, damage: DiceValue) -> Self {
        self.attacks = attacks;
        self.skill = skill;
        self.strength = strength;
        self.ap = ap;
        self.damage = damage;
        self
    }

    /// True when the unit-level fields match `other`.
    pub fn shares_unit_fields(&self, other: &WeaponProfile) -> bool {
        self.name == other.name && self.qty == other.qty && self.pts == other.pts
    }

    /// Copy the unit-level fields (id, name, qty, pts) from a sibling row.
    pub fn inherit_unit_fields(&mut self, sibling: &WeaponProfile) {
        self.unit_id = sibling.unit_id.clone();
        self.name = sibling.name.clone();
        self.qty = sibling.qty;
        self.pts = sibling.pts;
    }

    /// Check characteristic ranges. Returns every problem found.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let label = if self.weapon.is_empty() {
            self.name.clone()
        } else {
            format!("{} / {}", self.name, self.weapon)
        };

        if self.unit_id.is_empty() {
            errors.push(ValidationError::new(&label, "UnitID", "must not be empty"));
        }
        if self.name.trim().is_empty() {
            errors.push(ValidationError::new(&label, "Name", "must not be empty"));
        }
        check_range(&mut errors, &label, "BS", i32::from(self.skill), 2, 6);
        check_range(&mut errors, &label, "S", i32::from(self.strength), 1, 14);
        check_range(&mut errors, &label, "AP", i32::from(self.ap), -6, 0);
        check_range(&mut errors, &label, "Melta", i32::from(self.melta), 0, 6);
        check_range(&mut errors, &label, "RapidFire", i32::from(self.rapid_fire), 0, 6);
        check_range(&mut errors, &label, "Sustained", i32::from(self.sustained_hits), 0, 6);
        check_range(&mut errors, &label, "CritHit", i32::from(self.crit_hit), 2, 6);
        check_range(&mut errors, &label, "CritWound", i32::from(self.crit_wound), 2, 6);
        errors
    }
}

pub(crate) fn check_range(
    errors: &mut Vec<ValidationError>,
    label: &str,
    field: &'static str,
    value: i32,
    min: i32,
    max: i32,
) {
    if value < min || value > max {
        errors.push(ValidationError::new(
            label,
            field,
            format!("{value} is outside {min}..={max}"),
        ));
    }
}

/// Partial update of a weapon row. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeaponPatch {
    pub name: Option<String>,
    pub qty: Option<u32>,
    pub pts: Option<u32>,
    pub weapon: Option<String>,
    pub loadout_group: Option<String>,
    pub range: Option<Range>,
    pub attacks: Option<DiceValue>,
    pub skill: Option<u8>,
    pub strength: Option<u8>,
    pub ap: Option<i8>,
    pub damage: Option<DiceValue>,
    pub blast: Option<bool>,
    pub melta: Option<u8>,
    pub rapid_fire: Option<u8>,
    pub twin_linked: Option<bool>,
    pub lethal_hits: Option<bool>,
    pub devastating_wounds: Option<bool>,
    pub torrent: Option<bool>,
    pub ignores_cover: Option<bool>,
    pub crit_hit: Option<u8>,
    pub crit_wound: Option<u8>,
    pub sustained_hits: Option<u8>,
    pub reroll_hits: Option<bool>,
    pub reroll_wounds: Option<bool>,
    pub profile_id: Option<Option<String>>,
    pub keywords: Option<String>,
}

impl WeaponPatch {
    /// Patch touching only the unit-level fields.
    pub fn unit_fields(name: Option<String>, qty: Option<u32>, pts: Option<u32>) -> Self {
        Self {
            name,
            qty,
            pts,
            ..Default::default()
        }
    }

    pub fn touches_unit_fields(&self) -> bool {
        self.name.is_some() || self.qty.is_some() || self.pts.is_some()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, w: &mut WeaponProfile) {
        fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *slot = v.clone();
            }
        }

        set(&mut w.name, &self.name);
        set(&mut w.qty, &self.qty);
        set(&mut w.pts, &self.pts);
        set(&mut w.weapon, &self.weapon);
        set(&mut w.loadout_group, &self.loadout_group);
        set(&mut w.range, &self.range);
        set(&mut w.attacks, &self.attacks);
        set(&mut w.skill, &self.skill);
        set(&mut w.strength, &self.strength);
        set(&mut w.ap, &self.ap);
        set(&mut w.damage, &self.damage);
        set(&mut w.blast, &self.blast);
        set(&mut w.melta, &self.melta);
        set(&mut w.rapid_fire, &self.rapid_fire);
        set(&mut w.twin_linked, &self.twin_linked);
        set(&mut w.lethal_hits, &self.lethal_hits);
        set(&mut w.devastating_wounds, &self.devastating_wounds);
        set(&mut w.torrent, &self.torrent);
        set(&mut w.ignores_cover, &self.ignores_cover);
        set(&mut w.crit_hit, &self.crit_hit);
        set(&mut w.crit_wound, &self.crit_wound);
        set(&mut w.sustained_hits, &self.sustained_hits);
        set(&mut w.reroll_hits, &self.reroll_hits);
        set(&mut w.reroll_wounds, &self.reroll_wounds);
        set(&mut w.profile_id, &self.profile_id);
        set(&mut w.keywords, &self.keywords);
    }
}
