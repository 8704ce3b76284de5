//! Application state: the roster and target stores, the assumption flags and
//! the efficiency matrix computed from them.
//!
//! Every mutation goes through a method here. A method that changes any
//! matrix input bumps the data version, which discards the cached matrix.
//! Matrix requests are tagged with a [`MatrixSnapshot`] of the inputs they
//! were built from and a completion is applied only while its snapshot still
//! equals the current inputs.

use rosterlab_core::model::{TargetPatch, TargetProfile, UnitId, WeaponPatch, WeaponProfile};
use rosterlab_core::{
    Assumptions, EfficiencyMatrix, MatrixSnapshot, ResolutionRequest, ResolutionResponse,
    ResolveError, RosterStore, TargetStore, build_matrix,
};

use super::cache::CachedValue;

#[derive(Debug, Default)]
pub struct AppState {
    roster: RosterStore,
    targets: TargetStore,
    assumptions: Assumptions,

    /// Filename the roster was loaded from or last saved to
    pub roster_file: Option<String>,
    pub target_file: Option<String>,
    /// Unsaved edits per document
    roster_dirty: bool,
    targets_dirty: bool,

    selected_unit: Option<UnitId>,

    version: u64,
    matrix: CachedValue<EfficiencyMatrix>,
    pending: Option<MatrixSnapshot>,
    last_error: Option<ResolveError>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn roster(&self) -> &RosterStore {
        &self.roster
    }

    pub fn targets(&self) -> &TargetStore {
        &self.targets
    }

    pub fn assumptions(&self) -> Assumptions {
        self.assumptions
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn selected_unit(&self) -> Option<&UnitId> {
        self.selected_unit.as_ref()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.roster_dirty || self.targets_dirty
    }

    pub fn roster_has_unsaved_changes(&self) -> bool {
        self.roster_dirty
    }

    pub fn targets_have_unsaved_changes(&self) -> bool {
        self.targets_dirty
    }

    pub fn mark_roster_saved(&mut self, filename: String) {
        self.roster_file = Some(filename);
        self.roster_dirty = false;
    }

    pub fn mark_targets_saved(&mut self, filename: String) {
        self.target_file = Some(filename);
        self.targets_dirty = false;
    }

    /// Mark matrix inputs as modified (invalidates the matrix)
    pub fn mark_modified(&mut self) {
        self.version += 1;
        self.matrix.invalidate();
        self.last_error = None;
    }

    fn roster_edited(&mut self) {
        self.roster_dirty = true;
        self.mark_modified();
    }

    fn targets_edited(&mut self) {
        self.targets_dirty = true;
        self.mark_modified();
    }

    // ------------------------------------------------------------------
    // Whole-document replacement
    // ------------------------------------------------------------------

    /// Replace the roster, e.g. after loading a file.
    pub fn set_roster(&mut self, filename: Option<String>, weapons: Vec<WeaponProfile>) {
        self.roster.set_roster(weapons);
        self.roster_file = filename;
        self.selected_unit = None;
        self.roster_dirty = false;
        self.mark_modified();
    }

    pub fn set_target_list(&mut self, filename: Option<String>, targets: Vec<TargetProfile>) {
        self.targets.set_targets(targets);
        self.target_file = filename;
        self.targets_dirty = false;
        self.mark_modified();
    }

    // ------------------------------------------------------------------
    // Assumption flags
    // ------------------------------------------------------------------

    pub fn set_assume_cover(&mut self, value: bool) {
        if self.assumptions.assume_cover != value {
            self.assumptions.assume_cover = value;
            self.mark_modified();
        }
    }

    pub fn set_assume_half_range(&mut self, value: bool) {
        if self.assumptions.assume_half_range != value {
            self.assumptions.assume_half_range = value;
            self.mark_modified();
        }
    }

    pub fn set_assumptions(&mut self, assumptions: Assumptions) {
        self.set_assume_cover(assumptions.assume_cover);
        self.set_assume_half_range(assumptions.assume_half_range);
    }

    // ------------------------------------------------------------------
    // Roster edits
    // ------------------------------------------------------------------

    /// Add a weapon, to an existing unit when `unit_id` is given.
    pub fn add_weapon(&mut self, profile: WeaponProfile, unit_id: Option<&UnitId>) -> usize {
        let index = self.roster.add_weapon(profile, unit_id);
        self.roster_edited();
        index
    }

    pub fn update_weapon(&mut self, unit_id: &UnitId, index: usize, patch: &WeaponPatch) -> bool {
        let changed = self.roster.update_weapon(unit_id, index, patch);
        if changed {
            self.roster_edited();
        }
        changed
    }

    pub fn update_unit_attributes(&mut self, unit_id: &UnitId, patch: &WeaponPatch) -> usize {
        let updated = self.roster.update_unit_attributes(unit_id, patch);
        if updated > 0 {
            self.roster_edited();
        }
        updated
    }

    pub fn delete_weapon(&mut self, unit_id: &UnitId, index: usize) -> Option<WeaponProfile> {
        let removed = self.roster.delete_weapon(unit_id, index)?;
        if !self.roster.contains_unit(unit_id) && self.selected_unit.as_ref() == Some(unit_id) {
            self.selected_unit = None;
        }
        self.roster_edited();
        Some(removed)
    }

    /// Remove a unit and all its weapons; clears the selection if it pointed there.
    pub fn delete_unit(&mut self, unit_id: &UnitId) -> usize {
        let removed = self.roster.delete_unit(unit_id);
        if self.selected_unit.as_ref() == Some(unit_id) {
            self.selected_unit = None;
        }
        if removed > 0 {
            self.roster_edited();
        }
        removed
    }

    /// Select a unit for detail display. Unknown ids are refused.
    pub fn select_unit(&mut self, unit_id: Option<UnitId>) -> bool {
        match unit_id {
            Some(id) if !self.roster.contains_unit(&id) => false,
            other => {
                self.selected_unit = other;
                true
            }
        }
    }

    // ------------------------------------------------------------------
    // Target edits
    // ------------------------------------------------------------------

    pub fn add_target(&mut self, target: TargetProfile) {
        self.targets.add_target(target);
        self.targets_edited();
    }

    pub fn update_target(&mut self, name: &str, patch: &TargetPatch) -> bool {
        let changed = self.targets.update_target(name, patch);
        if changed {
            self.targets_edited();
        }
        changed
    }

    pub fn remove_target(&mut self, name: &str) -> Option<TargetProfile> {
        let removed = self.targets.remove_target(name)?;
        self.targets_edited();
        Some(removed)
    }

    // ------------------------------------------------------------------
    // Matrix lifecycle
    // ------------------------------------------------------------------

    /// The batched request for the current inputs
    pub fn current_request(&self) -> ResolutionRequest {
        ResolutionRequest::new(
            self.roster.weapons().to_vec(),
            self.targets.targets().to_vec(),
            self.assumptions,
        )
    }

    /// The matrix for the current inputs, if one has been computed
    pub fn matrix(&self) -> Option<&EfficiencyMatrix> {
        self.matrix.get(self.version)
    }

    pub fn is_matrix_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Error from the last failed request for the current inputs
    pub fn last_error(&self) -> Option<&ResolveError> {
        self.last_error.as_ref()
    }

    /// Snapshot the inputs for a new request.
    ///
    /// Returns `None` when there is nothing to do: either input is empty, the
    /// matrix is already current, or a request for these exact inputs is
    /// still outstanding. Otherwise the new snapshot replaces any pending one.
    pub fn begin_matrix_request(&mut self) -> Option<MatrixSnapshot> {
        if self.roster.is_empty() || self.targets.is_empty() {
            tracing::debug!("matrix request skipped: empty roster or target list");
            return None;
        }
        if self.matrix.is_valid(self.version) {
            return None;
        }

        let inputs = self.current_request();
        if self.pending.as_ref().is_some_and(|p| p.matches(&inputs)) {
            return None;
        }

        let snapshot = MatrixSnapshot::new(self.version, inputs);
        if let Some(previous) = self.pending.replace(snapshot.clone()) {
            tracing::debug!(
                superseded = previous.generation,
                generation = snapshot.generation,
                "replacing pending matrix request"
            );
        }
        self.last_error = None;
        Some(snapshot)
    }

    /// Clear the pending tag if it belongs to `snapshot`.
    fn settle(&mut self, snapshot: &MatrixSnapshot) {
        if self.pending.as_ref() == Some(snapshot) {
            self.pending = None;
        }
    }

    /// Apply a completed response. Returns false if it was stale and dropped.
    pub fn complete_matrix_request(
        &mut self,
        snapshot: &MatrixSnapshot,
        response: &ResolutionResponse,
    ) -> bool {
        self.settle(snapshot);

        let inputs = self.current_request();
        if !snapshot.matches(&inputs) {
            tracing::warn!(
                generation = snapshot.generation,
                current = self.version,
                "dropping stale matrix response"
            );
            return false;
        }
        if inputs.is_empty() {
            return false;
        }

        let units = self.roster.group_by_unit();
        let matrix = build_matrix(&units, self.targets.targets(), response);
        self.matrix.set(matrix, self.version);
        self.last_error = None;

        tracing::info!(
            generation = snapshot.generation,
            results = response.result_count(),
            "matrix updated"
        );
        true
    }

    /// Record a failed request. State other than the pending tag is left
    /// untouched; the error is kept only if the snapshot is still current.
    pub fn fail_matrix_request(&mut self, snapshot: &MatrixSnapshot, error: ResolveError) -> bool {
        self.settle(snapshot);

        if !snapshot.matches(&self.current_request()) {
            tracing::debug!(generation = snapshot.generation, error = %error, "ignoring stale failure");
            return false;
        }
        self.last_error = Some(error);
        true
    }

    /// Forget a cancelled request.
    pub fn cancel_matrix_request(&mut self, snapshot: &MatrixSnapshot) {
        self.settle(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rosterlab_core::Grade;
    use rosterlab_core::model::{CombatResult, RollTarget};

    fn weapon(unit: &str, name: &str, weapon: &str) -> WeaponProfile {
        WeaponProfile::new(unit, name, weapon).with_unit(5, 100)
    }

    fn target(name: &str) -> TargetProfile {
        TargetProfile::new(name, 100, 4, 2, RollTarget::new(3).unwrap())
    }

    fn loaded_state() -> AppState {
        let mut state = AppState::new();
        state.set_roster(
            Some("army".into()),
            vec![
                weapon("u1", "Intercessors", "Bolt rifle"),
                weapon("u1", "Intercessors", "Grenade"),
                weapon("u2", "Hellblasters", "Plasma"),
            ],
        );
        state.set_target_list(Some("default".into()), vec![target("MEQ"), target("GEQ")]);
        state
    }

    fn response_for(request: &ResolutionRequest, cpk: f64) -> ResolutionResponse {
        let mut response = ResolutionResponse::new();
        for t in &request.targets {
            let metrics = request
                .weapons
                .iter()
                .map(|w| {
                    CombatResult::new(w.unit_id.clone(), w.name.clone(), w.weapon.clone())
                        .with_metrics(1.0, 2.0, cpk, 1.0)
                })
                .collect();
            response.insert(t.name.clone(), metrics);
        }
        response
    }

    #[test]
    fn test_request_applies_when_current() {
        let mut state = loaded_state();
        let snapshot = state.begin_matrix_request().unwrap();
        assert!(state.is_matrix_pending());

        let response = response_for(&snapshot.inputs, 1.4);
        assert!(state.complete_matrix_request(&snapshot, &response));
        assert!(!state.is_matrix_pending());

        let matrix = state.matrix().unwrap();
        let cell = matrix.cell(&UnitId::new("u1"), "MEQ").unwrap();
        assert_eq!(cell.grade(), Some(Grade::A));
    }

    #[test]
    fn test_no_request_for_empty_inputs() {
        let mut state = AppState::new();
        assert!(state.begin_matrix_request().is_none());

        state.set_roster(None, vec![weapon("u1", "A", "Gun")]);
        assert!(state.begin_matrix_request().is_none());
        assert!(!state.is_matrix_pending());
    }

    #[test]
    fn test_duplicate_request_refused_while_pending() {
        let mut state = loaded_state();
        assert!(state.begin_matrix_request().is_some());
        assert!(state.begin_matrix_request().is_none());
    }

    #[test]
    fn test_no_request_when_matrix_current() {
        let mut state = loaded_state();
        let snapshot = state.begin_matrix_request().unwrap();
        state.complete_matrix_request(&snapshot, &response_for(&snapshot.inputs, 2.0));

        assert!(state.begin_matrix_request().is_none());
    }

    #[test]
    fn test_flag_toggle_invalidates_matrix() {
        let mut state = loaded_state();
        let snapshot = state.begin_matrix_request().unwrap();
        state.complete_matrix_request(&snapshot, &response_for(&snapshot.inputs, 2.0));
        assert!(state.matrix().is_some());

        state.set_assume_cover(true);
        assert!(state.matrix().is_none());

        // Setting the same value again is not a change
        let version = state.version();
        state.set_assume_cover(true);
        assert_eq!(state.version(), version);
    }

    #[test]
    fn test_half_range_toggle_invalidates_matrix() {
        let mut state = loaded_state();
        let snapshot = state.begin_matrix_request().unwrap();
        state.complete_matrix_request(&snapshot, &response_for(&snapshot.inputs, 2.0));
        assert!(state.matrix().is_some());

        state.set_assume_half_range(true);
        assert!(state.matrix().is_none());
        assert!(state.assumptions().assume_half_range);

        // The old response no longer matches the inputs
        assert!(!state.complete_matrix_request(&snapshot, &response_for(&snapshot.inputs, 2.0)));
        assert!(state.matrix().is_none());

        let version = state.version();
        state.set_assume_half_range(true);
        assert_eq!(state.version(), version);

        let fresh = state.begin_matrix_request().unwrap();
        assert!(fresh.inputs.assume_half_range);
        assert!(state.complete_matrix_request(&fresh, &response_for(&fresh.inputs, 2.0)));
        assert!(state.matrix().is_some());
    }

    #[test]
    fn test_stale_completion_is_dropped() {
        let mut state = loaded_state();
        let old = state.begin_matrix_request().unwrap();

        state.set_assume_half_range(true);
        let new = state.begin_matrix_request().unwrap();
        assert_ne!(old, new);

        // The old response arrives late and must not be applied
        assert!(!state.complete_matrix_request(&old, &response_for(&old.inputs, 1.0)));
        assert!(state.matrix().is_none());
        assert!(state.is_matrix_pending());

        assert!(state.complete_matrix_request(&new, &response_for(&new.inputs, 3.2)));
        let cell = state
            .matrix()
            .unwrap()
            .cell(&UnitId::new("u2"), "GEQ")
            .unwrap()
            .clone();
        assert_eq!(cell.grade(), Some(Grade::E));
    }

    #[test]
    fn test_stale_response_after_roster_edit() {
        let mut state = loaded_state();
        let snapshot = state.begin_matrix_request().unwrap();

        state.delete_unit(&UnitId::new("u2"));
        assert!(!state.complete_matrix_request(&snapshot, &response_for(&snapshot.inputs, 1.0)));
        assert!(state.matrix().is_none());
        // The stale request no longer blocks a new one
        assert!(!state.is_matrix_pending());
        assert!(state.begin_matrix_request().is_some());
    }

    #[test]
    fn test_reverted_inputs_accept_original_response() {
        let mut state = loaded_state();
        let snapshot = state.begin_matrix_request().unwrap();

        state.set_assume_cover(true);
        state.set_assume_cover(false);

        assert!(state.complete_matrix_request(&snapshot, &response_for(&snapshot.inputs, 1.0)));
        assert!(state.matrix().is_some());
    }

    #[test]
    fn test_failure_keeps_state_and_clears_pending() {
        let mut state = loaded_state();
        let snapshot = state.begin_matrix_request().unwrap();
        let weapons_before = state.roster().weapons().to_vec();

        assert!(state.fail_matrix_request(&snapshot, ResolveError::Transport("refused".into())));
        assert!(!state.is_matrix_pending());
        assert!(state.matrix().is_none());
        assert!(matches!(state.last_error(), Some(ResolveError::Transport(_))));
        assert_eq!(state.roster().weapons(), weapons_before.as_slice());

        // Retry is allowed after a failure
        assert!(state.begin_matrix_request().is_some());
        assert!(state.last_error().is_none());
    }

    #[test]
    fn test_identical_inputs_give_equal_matrices() {
        let mut first = loaded_state();
        let mut second = loaded_state();

        let a = first.begin_matrix_request().unwrap();
        let b = second.begin_matrix_request().unwrap();
        assert_eq!(a, b);

        first.complete_matrix_request(&a, &response_for(&a.inputs, 1.7));
        second.complete_matrix_request(&b, &response_for(&b.inputs, 1.7));
        assert_eq!(first.matrix(), second.matrix());
    }

    #[test]
    fn test_delete_unit_clears_selection() {
        let mut state = loaded_state();
        assert!(state.select_unit(Some(UnitId::new("u2"))));
        assert!(!state.select_unit(Some(UnitId::new("missing"))));

        assert_eq!(state.delete_unit(&UnitId::new("u2")), 1);
        assert!(state.selected_unit().is_none());
        assert!(state.has_unsaved_changes());
    }

    #[test]
    fn test_delete_last_weapon_clears_selection() {
        let mut state = loaded_state();
        state.select_unit(Some(UnitId::new("u2")));

        assert!(state.delete_weapon(&UnitId::new("u2"), 2).is_some());
        assert!(state.selected_unit().is_none());
    }

    #[test]
    fn test_edits_bump_version() {
        let mut state = loaded_state();
        let v0 = state.version();

        state.add_weapon(weapon("u3", "Terminators", "Storm bolter"), None);
        assert!(state.version() > v0);

        let v1 = state.version();
        assert!(!state.update_target("missing", &TargetPatch::default()));
        assert_eq!(state.version(), v1);

        assert!(state.remove_target("GEQ").is_some());
        assert!(state.version() > v1);
    }

    #[test]
    fn test_set_roster_resets_dirty() {
        let mut state = loaded_state();
        state.add_target(target("Vehicle"));
        state.add_weapon(weapon("u3", "Terminators", "Storm bolter"), None);
        assert!(state.roster_has_unsaved_changes());

        state.set_roster(Some("other".into()), vec![weapon("u9", "Scouts", "Sniper")]);
        assert!(!state.roster_has_unsaved_changes());
        assert!(state.targets_have_unsaved_changes());
        assert_eq!(state.roster_file.as_deref(), Some("other"));
    }
}
