//! Plain-text rendering of listings and the efficiency matrix.

use std::fmt::Write;

use rosterlab_core::model::UnitId;
use rosterlab_core::{EfficiencyMatrix, Grade, MatrixCell, format_cpk_with_grade};

use crate::platform::{RosterSummary, TargetListSummary};
use crate::util::format::{format_cpk, format_kills, format_points, truncate};

const UNIT_COLUMN: usize = 24;
const CELL_COLUMN: usize = 12;

pub fn render_roster_list(rosters: &[RosterSummary]) -> String {
    if rosters.is_empty() {
        return "No saved rosters\n".to_string();
    }

    let mut out = String::new();
    for r in rosters {
        let _ = writeln!(
            out,
            "{:<24} {:<28} {:>10}  {:>3} units  {:>3} weapons",
            r.filename,
            truncate(&r.name, 28),
            format_points(r.total_points),
            r.unit_count,
            r.weapon_count
        );
    }
    out
}

pub fn render_target_lists(lists: &[TargetListSummary]) -> String {
    if lists.is_empty() {
        return "No saved target lists\n".to_string();
    }

    let mut out = String::new();
    for l in lists {
        let _ = writeln!(
            out,
            "{:<24} {:<28} {:>3} targets: {}",
            l.filename,
            truncate(&l.name, 28),
            l.target_count,
            l.targets.join(", ")
        );
    }
    out
}

fn cell_text(cell: &MatrixCell) -> String {
    match cell {
        MatrixCell::NoData => "n/a".to_string(),
        MatrixCell::Graded(graded) => format!("{} {}", graded.grade, format_cpk(graded.best.cpk)),
    }
}

/// The Unit × Target grid: grade and best CPK per cell, column averages below.
pub fn render_matrix(matrix: &EfficiencyMatrix) -> String {
    let mut out = String::new();

    let _ = write!(out, "{:<width$}", "Unit", width = UNIT_COLUMN);
    for target in matrix.targets() {
        let _ = write!(out, " {:>width$}", truncate(target, CELL_COLUMN), width = CELL_COLUMN);
    }
    out.push('\n');
    out.push_str(&"-".repeat(UNIT_COLUMN + matrix.targets().len() * (CELL_COLUMN + 1)));
    out.push('\n');

    for (unit, row) in matrix.rows() {
        let label = format!("{} ({})", unit.name, unit.pts);
        let _ = write!(out, "{:<width$}", truncate(&label, UNIT_COLUMN), width = UNIT_COLUMN);
        for cell in row {
            let _ = write!(out, " {:>width$}", cell_text(cell), width = CELL_COLUMN);
        }
        out.push('\n');
    }

    let _ = write!(out, "{:<width$}", "Avg CPK", width = UNIT_COLUMN);
    for target in matrix.targets() {
        let avg = matrix
            .column_summary(target)
            .map_or_else(|| "n/a".to_string(), |s| format_cpk(s.avg_cpk));
        let _ = write!(out, " {:>width$}", avg, width = CELL_COLUMN);
    }
    out.push('\n');

    let (counts, no_data) = matrix.grade_counts();
    let tally: Vec<String> = Grade::ALL
        .iter()
        .filter_map(|g| counts.get(g).map(|n| format!("{g}:{n}")))
        .collect();
    let _ = writeln!(out, "\nGrades  {}  no data:{}", tally.join(" "), no_data);

    out
}

/// The winning weapon for one cell, then every weapon result behind it.
pub fn render_cell_details(matrix: &EfficiencyMatrix, unit_id: &UnitId, target: &str) -> String {
    let mut out = String::new();
    let Some(cell) = matrix.cell(unit_id, target) else {
        let _ = writeln!(out, "No cell for {} vs {}", unit_id, target);
        return out;
    };
    let Some(best) = cell.best() else {
        let _ = writeln!(out, "{} vs {}: no data", unit_id, target);
        return out;
    };

    let _ = writeln!(
        out,
        "{} vs {}: {} via {}",
        best.name,
        target,
        format_cpk_with_grade(best.cpk, true),
        best.weapon
    );
    for result in cell.details() {
        let _ = writeln!(
            out,
            "  {:<28} kills {:>6}  dmg {:>6.1}  cpk {:>6}",
            truncate(&result.weapon, 28),
            format_kills(result.kills),
            result.damage,
            format_cpk(result.cpk)
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rosterlab_core::model::{CombatResult, RollTarget, TargetProfile, WeaponProfile};
    use rosterlab_core::{ResolutionResponse, RosterStore, build_matrix};

    fn matrix() -> EfficiencyMatrix {
        let roster = RosterStore::from_weapons(vec![
            WeaponProfile::new("u1", "Intercessors", "Bolt rifle").with_unit(5, 80),
            WeaponProfile::new("u1", "Intercessors", "Grenade").with_unit(5, 80),
            WeaponProfile::new("u2", "Eradicators", "Melta rifle").with_unit(3, 95),
        ]);
        let targets = vec![
            TargetProfile::new("MEQ", 18, 4, 2, RollTarget::new(3).unwrap()),
            TargetProfile::new("Vehicle", 150, 10, 12, RollTarget::new(3).unwrap()),
        ];
        let response = ResolutionResponse::new()
            .with_target(
                "MEQ",
                vec![
                    CombatResult::new("u1", "Intercessors", "Bolt rifle").with_metrics(1.0, 2.0, 2.1, 2.0),
                    CombatResult::new("u1", "Intercessors", "Grenade").with_metrics(1.5, 2.0, 1.4, 1.0),
                ],
            )
            .with_target(
                "Vehicle",
                vec![CombatResult::new("u2", "Eradicators", "Melta rifle").with_metrics(0.5, 9.0, 0.9, 2.0)],
            );
        build_matrix(&roster.group_by_unit(), &targets, &response)
    }

    #[test]
    fn test_render_matrix_shows_grades_and_no_data() {
        let text = render_matrix(&matrix());

        assert!(text.contains("Intercessors (80)"));
        assert!(text.contains("A 1.40"));
        assert!(text.contains("S 0.90"));
        assert!(text.contains("n/a"));
        assert!(text.contains("no data:2"));
    }

    #[test]
    fn test_render_cell_details_lists_every_weapon() {
        let text = render_cell_details(&matrix(), &UnitId::new("u1"), "MEQ");

        assert!(text.contains("1.40 (A-tier"));
        assert!(text.contains("via Grenade"));
        assert!(text.contains("Bolt rifle"));
        assert!(text.contains("2.10"));
    }

    #[test]
    fn test_render_cell_details_no_data() {
        let text = render_cell_details(&matrix(), &UnitId::new("u2"), "MEQ");
        assert!(text.contains("no data"));
    }

    #[test]
    fn test_render_empty_listings() {
        assert_eq!(render_roster_list(&[]), "No saved rosters\n");
        assert_eq!(render_target_lists(&[]), "No saved target lists\n");
    }
}
