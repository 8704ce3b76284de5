mod ids;
mod results;
mod target;
mod unit;
mod values;
mod weapon;

pub use ids::UnitId;
pub use results::{CombatResult, NO_KILL_SENTINEL};
pub use target::{TargetPatch, TargetProfile};
pub use unit::Unit;
pub use values::{DiceValue, Range, RawCharacteristic, RollTarget, optional_roll, yes_no};
pub use weapon::{WeaponPatch, WeaponProfile};
