//! Characteristic value types shared by weapon and target profiles.
//!
//! These keep the compact tabletop notation on the wire (`"3+"`, `"D6+3"`,
//! `"M"`, `"Y"`/`"N"`) while exposing typed values to the rest of the crate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A D6 roll target such as an armor save, written `"3+"`.
///
/// `7+` is a legal armor save (no save at all) so the range is 2..=7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RollTarget(u8);

impl RollTarget {
    pub const MIN: u8 = 2;
    pub const MAX: u8 = 7;

    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for RollTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+", self.0)
    }
}

impl FromStr for RollTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches('+');
        let value: u8 = trimmed
            .parse()
            .map_err(|_| format!("invalid roll target '{s}'"))?;
        Self::new(value).ok_or_else(|| format!("roll target '{s}' must be between 2+ and 7+"))
    }
}

impl TryFrom<String> for RollTarget {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RollTarget> for String {
    fn from(value: RollTarget) -> Self {
        value.to_string()
    }
}

/// Serde adapter for optional roll targets, where the empty string means none.
pub mod optional_roll {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::RollTarget;

    pub fn serialize<S: Serializer>(value: &Option<RollTarget>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(roll) => s.serialize_str(&roll.to_string()),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<RollTarget>, D::Error> {
        let raw = Option::<String>::deserialize(d)?.unwrap_or_default();
        if raw.trim().is_empty() {
            return Ok(None);
        }
        raw.parse().map(Some).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for `"Y"`/`"N"` flags. Plain booleans are accepted on input.
pub mod yes_no {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawFlag {
        Bool(bool),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &bool, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(if *value { "Y" } else { "N" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        match RawFlag::deserialize(d)? {
            RawFlag::Bool(b) => Ok(b),
            RawFlag::Text(text) => match text.trim().to_ascii_uppercase().as_str() {
                "Y" | "YES" | "TRUE" => Ok(true),
                "N" | "NO" | "FALSE" | "" => Ok(false),
                other => Err(serde::de::Error::custom(format!(
                    "expected 'Y' or 'N', got '{other}'"
                ))),
            },
        }
    }
}

/// Wire form of a characteristic that may be a bare number or notation text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCharacteristic {
    Number(u32),
    Text(String),
}

/// Weapon range: melee or a distance in inches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawCharacteristic", into = "RawCharacteristic")]
pub enum Range {
    Melee,
    Inches(u32),
}

impl Default for Range {
    fn default() -> Self {
        Range::Inches(24)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Range::Melee => f.write_str("M"),
            Range::Inches(n) => write!(f, "{n}\""),
        }
    }
}

impl TryFrom<RawCharacteristic> for Range {
    type Error = String;

    fn try_from(raw: RawCharacteristic) -> Result<Self, Self::Error> {
        match raw {
            RawCharacteristic::Number(n) => Ok(Range::Inches(n)),
            RawCharacteristic::Text(text) => {
                let trimmed = text.trim().trim_end_matches('"');
                if trimmed.eq_ignore_ascii_case("m") || trimmed.eq_ignore_ascii_case("melee") {
                    Ok(Range::Melee)
                } else {
                    trimmed
                        .parse()
                        .map(Range::Inches)
                        .map_err(|_| format!("invalid range '{text}'"))
                }
            }
        }
    }
}

impl From<Range> for RawCharacteristic {
    fn from(range: Range) -> Self {
        match range {
            Range::Melee => RawCharacteristic::Text("M".to_string()),
            Range::Inches(n) => RawCharacteristic::Number(n),
        }
    }
}

/// A fixed value or a dice expression (`D3`, `2D6`, `D6+3`) for attacks and damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawCharacteristic", into = "RawCharacteristic")]
pub enum DiceValue {
    Fixed(u32),
    Dice { count: u32, sides: u32, bonus: u32 },
}

impl Default for DiceValue {
    fn default() -> Self {
        DiceValue::Fixed(1)
    }
}

impl fmt::Display for DiceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            DiceValue::Fixed(n) => write!(f, "{n}"),
            DiceValue::Dice {
                count,
                sides,
                bonus,
            } => {
                if count != 1 {
                    write!(f, "{count}")?;
                }
                write!(f, "D{sides}")?;
                if bonus > 0 {
                    write!(f, "+{bonus}")?;
                }
                Ok(())
            }
        }
    }
}

impl FromStr for DiceValue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().to_ascii_uppercase();
        let invalid = || format!("invalid dice expression '{s}'");

        let Some((count, rest)) = text.split_once('D') else {
            return text.parse().map(DiceValue::Fixed).map_err(|_| invalid());
        };

        let count = if count.is_empty() {
            1
        } else {
            count.parse().map_err(|_| invalid())?
        };
        let (sides, bonus) = match rest.split_once('+') {
            Some((sides, bonus)) => (sides, bonus.parse().map_err(|_| invalid())?),
            None => (rest, 0),
        };
        let sides = sides.parse().map_err(|_| invalid())?;
        if count == 0 || sides == 0 {
            return Err(invalid());
        }

        Ok(DiceValue::Dice {
            count,
            sides,
            bonus,
        })
    }
}

impl TryFrom<RawCharacteristic> for DiceValue {
    type Error = String;

    fn try_from(raw: RawCharacteristic) -> Result<Self, Self::Error> {
        match raw {
            RawCharacteristic::Number(n) => Ok(DiceValue::Fixed(n)),
            RawCharacteristic::Text(text) => text.parse(),
        }
    }
}

impl From<DiceValue> for RawCharacteristic {
    fn from(value: DiceValue) -> Self {
        match value {
            DiceValue::Fixed(n) => RawCharacteristic::Number(n),
            dice => RawCharacteristic::Text(dice.to_string()),
        }
    }
}
