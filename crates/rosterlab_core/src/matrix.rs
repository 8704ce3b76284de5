//! Unit × target efficiency matrix.
//!
//! Weapon-level combat results are grouped by unit and target, each group is
//! reduced to its lowest-CPK result, and that result is graded. A pair with
//! no results becomes [`MatrixCell::NoData`], never a zero-valued result.

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::grading::{Grade, classify};
use crate::model::{CombatResult, TargetProfile, Unit, UnitId};
use crate::resolution::{ResolutionResponse, TargetSummary};

/// The winning result for a (unit, target) pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradedCell {
    /// Lowest-CPK result among the unit's weapons
    pub best: CombatResult,
    pub grade: Grade,
    /// Every weapon result for the pair, in response order. Carried for
    /// detail display only.
    pub details: Vec<CombatResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MatrixCell {
    /// The service returned nothing for this unit against this target
    NoData,
    Graded(GradedCell),
}

impl MatrixCell {
    pub fn grade(&self) -> Option<Grade> {
        match self {
            MatrixCell::NoData => None,
            MatrixCell::Graded(cell) => Some(cell.grade),
        }
    }

    pub fn best(&self) -> Option<&CombatResult> {
        match self {
            MatrixCell::NoData => None,
            MatrixCell::Graded(cell) => Some(&cell.best),
        }
    }

    pub fn details(&self) -> &[CombatResult] {
        match self {
            MatrixCell::NoData => &[],
            MatrixCell::Graded(cell) => &cell.details,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, MatrixCell::NoData)
    }
}

/// Row header for one unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitHeader {
    pub id: UnitId,
    pub name: String,
    pub pts: u32,
    pub weapon_count: usize,
}

/// The graded Unit × Target grid
#[derive(Debug, Clone, PartialEq)]
pub struct EfficiencyMatrix {
    units: Vec<UnitHeader>,
    targets: Vec<String>,
    cells: FxHashMap<(UnitId, String), MatrixCell>,
    summaries: Vec<Option<TargetSummary>>,
}

impl EfficiencyMatrix {
    /// Units in roster order
    pub fn units(&self) -> &[UnitHeader] {
        &self.units
    }

    /// Target names in list order, duplicates removed
    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    pub fn cell(&self, unit_id: &UnitId, target: &str) -> Option<&MatrixCell> {
        self.cells.get(&(unit_id.clone(), target.to_string()))
    }

    /// Cells of each unit, aligned with [`Self::targets`].
    pub fn rows(&self) -> impl Iterator<Item = (&UnitHeader, Vec<&MatrixCell>)> + '_ {
        self.units.iter().map(move |unit| {
            let row = self
                .targets
                .iter()
                .filter_map(|target| self.cell(&unit.id, target))
                .collect();
            (unit, row)
        })
    }

    /// Aggregate over every weapon result against a target.
    pub fn column_summary(&self, target: &str) -> Option<TargetSummary> {
        let idx = self.targets.iter().position(|t| t == target)?;
        self.summaries.get(idx).copied().flatten()
    }

    /// The unit's best graded cell across all targets.
    pub fn unit_best(&self, unit_id: &UnitId) -> Option<(&str, &GradedCell)> {
        let mut best: Option<(&str, &GradedCell)> = None;
        for target in &self.targets {
            if let Some(MatrixCell::Graded(cell)) = self.cell(unit_id, target) {
                let better = match best {
                    Some((_, current)) => rank_key(&cell.best) < rank_key(&current.best),
                    None => true,
                };
                if better {
                    best = Some((target.as_str(), cell));
                }
            }
        }
        best
    }

    /// Count of graded cells per grade, plus the number of no-data cells.
    pub fn grade_counts(&self) -> (FxHashMap<Grade, usize>, usize) {
        let mut counts: FxHashMap<Grade, usize> = FxHashMap::default();
        let mut no_data = 0;
        for cell in self.cells.values() {
            match cell.grade() {
                Some(grade) => *counts.entry(grade).or_default() += 1,
                None => no_data += 1,
            }
        }
        (counts, no_data)
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}

/// Ordering key for the min-CPK reduction. NaN sorts last; zero and negative
/// values are ordinary minimums and grade F through `classify`.
fn rank_key(result: &CombatResult) -> f64 {
    if result.cpk.is_nan() {
        f64::INFINITY
    } else {
        result.cpk
    }
}

/// Lowest-CPK result; the first one wins ties.
pub fn pick_best<'a, I>(results: I) -> Option<&'a CombatResult>
where
    I: IntoIterator<Item = &'a CombatResult>,
{
    let mut best: Option<&CombatResult> = None;
    for result in results {
        match best {
            Some(current) if rank_key(result) >= rank_key(current) => {}
            _ => best = Some(result),
        }
    }
    best
}

/// Reduce one (unit, target) group to a cell.
pub fn reduce_cell(results: Vec<CombatResult>) -> MatrixCell {
    let Some(best) = pick_best(&results).cloned() else {
        return MatrixCell::NoData;
    };
    let grade = classify(best.cpk);

    MatrixCell::Graded(GradedCell {
        best,
        grade,
        details: results,
    })
}

/// Build the grid from grouped units, the target list and the service response.
///
/// Callers must not invoke this with an empty roster or target list.
pub fn build_matrix(
    units: &[Unit],
    targets: &[TargetProfile],
    response: &ResolutionResponse,
) -> EfficiencyMatrix {
    debug_assert!(!units.is_empty(), "matrix requested for an empty roster");
    debug_assert!(!targets.is_empty(), "matrix requested for an empty target list");

    let mut target_names: Vec<String> = Vec::with_capacity(targets.len());
    for target in targets {
        if !target_names.contains(&target.name) {
            target_names.push(target.name.clone());
        }
    }

    let mut cells = FxHashMap::default();
    for target in &target_names {
        let mut by_unit: FxHashMap<&UnitId, Vec<CombatResult>> = FxHashMap::default();
        for result in response.results_for(target) {
            by_unit
                .entry(&result.unit_id)
                .or_default()
                .push(result.clone());
        }

        for unit in units {
            let results = by_unit.remove(&unit.id).unwrap_or_default();
            cells.insert((unit.id.clone(), target.clone()), reduce_cell(results));
        }
    }

    let summaries = target_names
        .iter()
        .map(|name| response.results.get(name).map(|r| r.summary()))
        .collect();

    let units: Vec<UnitHeader> = units
        .iter()
        .map(|u| UnitHeader {
            id: u.id.clone(),
            name: u.name.clone(),
            pts: u.pts,
            weapon_count: u.weapon_count(),
        })
        .collect();

    let matrix = EfficiencyMatrix {
        units,
        targets: target_names,
        cells,
        summaries,
    };

    tracing::debug!(
        units = matrix.units.len(),
        targets = matrix.targets.len(),
        no_data = matrix.grade_counts().1,
        "efficiency matrix built"
    );
    matrix
}
