//! Cost-per-kill grading.
//!
//! Converts a CPK value into a letter grade. Lower CPK is more efficient.
//! The bands are tuned around a median CPK of about 2.5 across a five turn
//! game: S-tier removes a similarly costed unit in one interaction, F-tier
//! has minimal impact.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::NO_KILL_SENTINEL;

/// Letter grade, ordered best (`S`) to worst (`F`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    S,
    A,
    B,
    C,
    D,
    E,
    F,
}

/// Inclusive upper CPK bound of each graded band. Anything above the last
/// bound is `F`.
pub const GRADE_THRESHOLDS: [(Grade, f64); 6] = [
    (Grade::S, 1.0),
    (Grade::A, 1.5),
    (Grade::B, 2.0),
    (Grade::C, 2.5),
    (Grade::D, 3.0),
    (Grade::E, 3.5),
];

impl Grade {
    pub const ALL: [Grade; 7] = [
        Grade::S,
        Grade::A,
        Grade::B,
        Grade::C,
        Grade::D,
        Grade::E,
        Grade::F,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Grade::S => "S",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::E => "E",
            Grade::F => "F",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Grade::S => "Elite - removes similarly costed units in one interaction",
            Grade::A => "Excellent trade efficiency",
            Grade::B => "Good trade efficiency",
            Grade::C => "Average - roughly neutral trades",
            Grade::D => "Below average - unfavorable trades",
            Grade::E => "Poor - very unfavorable trades",
            Grade::F => "Ineffective - minimal game impact",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Grade a cost-per-kill value.
///
/// Zero, negative, NaN and sentinel (`>= 999`) values come from targets the
/// weapon cannot kill and are always `F`, before the threshold ladder runs.
pub fn classify(cpk: f64) -> Grade {
    if cpk.is_nan() || cpk <= 0.0 || cpk >= NO_KILL_SENTINEL {
        return Grade::F;
    }

    GRADE_THRESHOLDS
        .iter()
        .find(|(_, upper)| cpk <= *upper)
        .map_or(Grade::F, |(grade, _)| *grade)
}

/// Format as `"1.70 (B-tier)"`, optionally with the grade description.
pub fn format_cpk_with_grade(cpk: f64, include_description: bool) -> String {
    let grade = classify(cpk);
    if include_description {
        format!("{cpk:.2} ({grade}-tier: {})", grade.description())
    } else {
        format!("{cpk:.2} ({grade}-tier)")
    }
}
