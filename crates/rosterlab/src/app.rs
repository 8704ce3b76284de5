//! Application layer: persistence, the resolution worker and [`AppState`].
//!
//! `App` is the only caller of [`Storage`] and [`MatrixWorker`]. It feeds
//! loaded documents into the state manager and routes worker responses back
//! to it; the state manager decides what is stale.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::RecvTimeoutError;
use std::time::{Duration, Instant};

use rosterlab_core::{Assumptions, EfficiencyMatrix};

use crate::data::AppConfig;
use crate::platform::native::{DEFAULT_TARGET_LIST, sanitize_filename};
use crate::platform::{
    MatrixWorker, NativeStorage, NativeWorker, RosterSummary, Storage, StorageError,
    TargetListSummary, WorkerRequest, WorkerResponse,
};
use crate::resolver::HttpResolver;
use crate::state::{AppState, LoadError, MatrixError, SaveError};

pub struct App<S: Storage = NativeStorage, W: MatrixWorker = NativeWorker> {
    state: AppState,
    storage: S,
    pub(crate) worker: W,
    config: AppConfig,
    /// Where config.yaml is written back; `None` keeps settings in memory
    data_dir: Option<PathBuf>,
}

impl App {
    /// Create an app over a data directory, resolving through the HTTP service
    /// named in `config`.
    pub fn with_data_dir(data_dir: PathBuf, config: AppConfig) -> Self {
        let storage = NativeStorage::new(data_dir.clone());
        let resolver = HttpResolver::new(
            config.service_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        );
        let worker = NativeWorker::new(Arc::new(resolver));

        tracing::info!(
            data_dir = %data_dir.display(),
            service_url = %config.service_url,
            "App initialized"
        );

        let mut app = App::new(storage, worker, config);
        app.data_dir = Some(data_dir);
        app
    }
}

impl<S: Storage, W: MatrixWorker> App<S, W> {
    pub fn new(storage: S, worker: W, config: AppConfig) -> Self {
        let mut state = AppState::new();
        state.set_assumptions(Assumptions {
            assume_cover: config.assume_cover,
            assume_half_range: config.assume_half_range,
        });

        Self {
            state,
            storage,
            worker,
            config,
            data_dir: None,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Reopen the roster and target list from the last session.
    ///
    /// Failures are logged and leave the corresponding store empty. Without a
    /// remembered target list the `default` list is tried.
    pub fn restore_session(&mut self) {
        if let Err(e) = self.storage.init() {
            tracing::warn!(error = %e, "Failed to initialize storage");
            return;
        }

        if let Some(filename) = self.config.active_roster.clone()
            && let Err(e) = self.open_roster(&filename)
        {
            tracing::warn!(roster = %filename, error = %e, "Failed to restore roster");
        }

        let targets = self
            .config
            .active_targets
            .clone()
            .unwrap_or_else(|| DEFAULT_TARGET_LIST.to_string());
        match self.open_target_list(&targets) {
            Ok(()) => {}
            Err(LoadError::NotFound(_)) if self.config.active_targets.is_none() => {}
            Err(e) => tracing::warn!(targets = %targets, error = %e, "Failed to restore target list"),
        }
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    pub fn list_rosters(&self) -> Result<Vec<RosterSummary>, LoadError> {
        Ok(self.storage.list_rosters()?)
    }

    pub fn list_target_lists(&self) -> Result<Vec<TargetListSummary>, LoadError> {
        Ok(self.storage.list_target_lists()?)
    }

    pub fn open_roster(&mut self, filename: &str) -> Result<(), LoadError> {
        let file = self.storage.load_roster(filename)?;
        let filename = sanitize_filename(filename);

        self.state.set_roster(Some(filename.clone()), file.roster);
        self.config.active_roster = Some(filename);
        Ok(())
    }

    pub fn open_target_list(&mut self, filename: &str) -> Result<(), LoadError> {
        let file = self.storage.load_target_list(filename)?;
        let filename = sanitize_filename(filename);

        tracing::info!(targets = %filename, count = file.targets.len(), "Loaded target list");
        self.state.set_target_list(Some(filename.clone()), file.targets);
        self.config.active_targets = Some(filename);
        Ok(())
    }

    /// Save the roster back to the file it came from.
    pub fn save_roster(&mut self) -> Result<String, SaveError> {
        let filename = self.state.roster_file.clone().ok_or(SaveError::NoPath)?;
        let name = self
            .storage
            .load_roster(&filename)
            .map(|f| f.name)
            .unwrap_or_else(|_| filename.clone());
        self.save_roster_as(&filename, &name)
    }

    pub fn save_roster_as(&mut self, filename: &str, name: &str) -> Result<String, SaveError> {
        let saved = self
            .storage
            .save_roster(filename, name, self.state.roster().weapons())?;
        self.state.mark_roster_saved(saved.clone());
        self.config.active_roster = Some(saved.clone());
        Ok(saved)
    }

    pub fn save_target_list_as(&mut self, filename: &str, name: &str) -> Result<String, SaveError> {
        let saved = self
            .storage
            .save_target_list(filename, name, self.state.targets().targets())?;
        self.state.mark_targets_saved(saved.clone());
        self.config.active_targets = Some(saved.clone());
        Ok(saved)
    }

    /// Delete a saved roster. The in-memory roster is kept but forgets its file.
    pub fn delete_roster(&mut self, filename: &str) -> Result<(), SaveError> {
        self.storage.delete_roster(filename)?;

        let filename = sanitize_filename(filename);
        if self.state.roster_file.as_deref() == Some(filename.as_str()) {
            self.state.roster_file = None;
        }
        if self.config.active_roster.as_deref() == Some(filename.as_str()) {
            self.config.active_roster = None;
        }
        Ok(())
    }

    pub fn delete_target_list(&mut self, filename: &str) -> Result<(), SaveError> {
        self.storage.delete_target_list(filename)?;

        let filename = sanitize_filename(filename);
        if self.state.target_file.as_deref() == Some(filename.as_str()) {
            self.state.target_file = None;
        }
        if self.config.active_targets.as_deref() == Some(filename.as_str()) {
            self.config.active_targets = None;
        }
        Ok(())
    }

    /// Write the current settings and open filenames to config.yaml.
    pub fn persist_session(&self) -> Result<(), StorageError> {
        match &self.data_dir {
            Some(dir) => self.config.save(dir),
            None => Ok(()),
        }
    }

    // ------------------------------------------------------------------
    // Matrix
    // ------------------------------------------------------------------

    pub fn set_assumptions(&mut self, assumptions: Assumptions) {
        self.state.set_assumptions(assumptions);
        self.config.assume_cover = assumptions.assume_cover;
        self.config.assume_half_range = assumptions.assume_half_range;
    }

    /// Dispatch a request for the current inputs. Returns true if one was sent.
    pub fn request_matrix(&mut self) -> bool {
        let Some(snapshot) = self.state.begin_matrix_request() else {
            return false;
        };

        tracing::info!(generation = snapshot.generation, "Dispatching matrix request");
        if self.worker.send(WorkerRequest::Resolve {
            snapshot: snapshot.clone(),
        }) {
            true
        } else {
            tracing::error!("Resolution worker is not running");
            self.state.cancel_matrix_request(&snapshot);
            false
        }
    }

    /// Apply one worker response. Returns true if the matrix was replaced.
    pub fn handle_response(&mut self, response: WorkerResponse) -> bool {
        match response {
            WorkerResponse::Complete { snapshot, response } => {
                self.state.complete_matrix_request(&snapshot, &response)
            }
            WorkerResponse::Failed { snapshot, error } => {
                self.state.fail_matrix_request(&snapshot, error);
                false
            }
            WorkerResponse::Cancelled { snapshot } => {
                self.state.cancel_matrix_request(&snapshot);
                false
            }
        }
    }

    /// Drain worker responses without blocking. Returns true if the matrix changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Some(response) = self.worker.try_recv() {
            changed |= self.handle_response(response);
        }
        changed
    }

    pub fn cancel_matrix(&self) {
        self.worker.cancel();
    }

    /// Compute the matrix for the current inputs, blocking up to `timeout`.
    pub fn compute_matrix(&mut self, timeout: Duration) -> Result<&EfficiencyMatrix, MatrixError> {
        if self.state.roster().is_empty() || self.state.targets().is_empty() {
            return Err(MatrixError::EmptyInputs);
        }

        if self.state.matrix().is_none() {
            if !self.request_matrix() && !self.state.is_matrix_pending() {
                return Err(MatrixError::WorkerStopped);
            }

            let deadline = Instant::now() + timeout;
            while self.state.is_matrix_pending() {
                let remaining = deadline.saturating_duration_since(Instant::now());
                match self.worker.recv_timeout(remaining) {
                    Ok(response) => {
                        self.handle_response(response);
                    }
                    Err(RecvTimeoutError::Timeout) => return Err(MatrixError::Timeout),
                    Err(RecvTimeoutError::Disconnected) => return Err(MatrixError::WorkerStopped),
                }
            }
        }

        if let Some(error) = self.state.last_error() {
            return Err(MatrixError::Resolve(error.clone()));
        }
        self.state.matrix().ok_or(MatrixError::Cancelled)
    }
}
