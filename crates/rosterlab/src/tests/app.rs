use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use rosterlab_core::model::{
    CombatResult, DiceValue, RollTarget, TargetProfile, UnitId, WeaponProfile,
};
use rosterlab_core::{
    Assumptions, Grade, MatrixSnapshot, ResolutionRequest, ResolutionResponse, ResolveError,
};
use tempfile::TempDir;

use crate::App;
use crate::data::AppConfig;
use crate::platform::{MatrixWorker, NativeStorage, Storage, WorkerRequest, WorkerResponse};
use crate::state::{LoadError, MatrixError, SaveError};

const WAIT: Duration = Duration::from_millis(200);

type ResolveFn = Box<dyn Fn(&ResolutionRequest) -> Result<ResolutionResponse, ResolveError>>;

/// Resolves on `send` unless holding, in which case snapshots queue until
/// `release`.
struct StubWorker {
    resolve: ResolveFn,
    hold: Cell<bool>,
    held: RefCell<Vec<MatrixSnapshot>>,
    responses: RefCell<VecDeque<WorkerResponse>>,
    sent: Cell<usize>,
    cancelled: Cell<bool>,
}

impl StubWorker {
    fn new(
        resolve: impl Fn(&ResolutionRequest) -> Result<ResolutionResponse, ResolveError> + 'static,
    ) -> Self {
        Self {
            resolve: Box::new(resolve),
            hold: Cell::new(false),
            held: RefCell::new(Vec::new()),
            responses: RefCell::new(VecDeque::new()),
            sent: Cell::new(0),
            cancelled: Cell::new(false),
        }
    }

    fn with_cpk(cpk: f64) -> Self {
        Self::new(move |req| Ok(response_for(req, cpk)))
    }

    fn run(&self, snapshot: MatrixSnapshot) {
        let response = match (self.resolve)(&snapshot.inputs) {
            Ok(response) => WorkerResponse::Complete { snapshot, response },
            Err(error) => WorkerResponse::Failed { snapshot, error },
        };
        self.responses.borrow_mut().push_back(response);
    }

    fn release(&self) {
        let held: Vec<_> = self.held.borrow_mut().drain(..).collect();
        for snapshot in held {
            self.run(snapshot);
        }
    }
}

impl MatrixWorker for StubWorker {
    fn send(&self, request: WorkerRequest) -> bool {
        let WorkerRequest::Resolve { snapshot } = request else {
            return true;
        };
        self.sent.set(self.sent.get() + 1);
        self.cancelled.set(false);
        if self.hold.get() {
            self.held.borrow_mut().push(snapshot);
        } else {
            self.run(snapshot);
        }
        true
    }

    fn try_recv(&self) -> Option<WorkerResponse> {
        self.responses.borrow_mut().pop_front()
    }

    fn recv_timeout(&self, _timeout: Duration) -> Result<WorkerResponse, RecvTimeoutError> {
        self.try_recv().ok_or(RecvTimeoutError::Timeout)
    }

    fn cancel(&self) {
        self.cancelled.set(true);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }

    fn shutdown(&self) {}
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

fn weapons() -> Vec<WeaponProfile> {
    let stats = |w: WeaponProfile| {
        w.with_stats(DiceValue::Fixed(2), 3, 4, -1, DiceValue::Fixed(1))
    };
    vec![
        stats(WeaponProfile::new("u1", "Intercessors", "Bolt rifle").with_unit(5, 80)),
        stats(WeaponProfile::new("u2", "Eradicators", "Melta rifle").with_unit(3, 95)),
    ]
}

fn targets() -> Vec<TargetProfile> {
    vec![
        TargetProfile::new("MEQ", 18, 4, 2, RollTarget::new(3).unwrap()),
        TargetProfile::new("Vehicle", 150, 10, 12, RollTarget::new(3).unwrap()),
    ]
}

/// Data directory seeded with one roster and the default target list.
fn seeded_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    let storage = NativeStorage::new(dir.path().to_path_buf());
    storage.init().unwrap();
    storage.save_roster("marines", "Marines", &weapons()).unwrap();
    storage.save_target_list("default", "Default", &targets()).unwrap();
    dir
}

fn app(dir: &TempDir, worker: StubWorker) -> App<NativeStorage, StubWorker> {
    App::new(
        NativeStorage::new(dir.path().to_path_buf()),
        worker,
        AppConfig::default(),
    )
}

#[test]
fn test_open_and_compute_matrix() {
    let dir = seeded_dir();
    let mut app = app(&dir, StubWorker::with_cpk(1.4));
    app.open_roster("marines").unwrap();
    app.open_target_list("default").unwrap();

    let matrix = app.compute_matrix(WAIT).unwrap();
    assert_eq!(matrix.units().len(), 2);
    assert_eq!(matrix.targets(), ["MEQ", "Vehicle"]);
    let cell = matrix.cell(&UnitId::new("u2"), "Vehicle").unwrap();
    assert_eq!(cell.grade(), Some(Grade::A));

    assert_eq!(app.config().active_roster.as_deref(), Some("marines"));
    assert_eq!(app.config().active_targets.as_deref(), Some("default"));
}

#[test]
fn test_compute_matrix_reuses_current_result() {
    let dir = seeded_dir();
    let mut app = app(&dir, StubWorker::with_cpk(1.4));
    app.open_roster("marines").unwrap();
    app.open_target_list("default").unwrap();

    app.compute_matrix(WAIT).unwrap();
    app.compute_matrix(WAIT).unwrap();
    assert_eq!(app.worker.sent.get(), 1);

    app.set_assumptions(Assumptions {
        assume_cover: true,
        assume_half_range: false,
    });
    app.compute_matrix(WAIT).unwrap();
    assert_eq!(app.worker.sent.get(), 2);
    assert!(app.config().assume_cover);
}

#[test]
fn test_compute_matrix_empty_inputs() {
    let dir = seeded_dir();
    let mut app = app(&dir, StubWorker::with_cpk(1.4));
    app.open_roster("marines").unwrap();

    assert!(matches!(
        app.compute_matrix(WAIT),
        Err(MatrixError::EmptyInputs)
    ));
    assert_eq!(app.worker.sent.get(), 0);
}

#[test]
fn test_compute_matrix_reports_resolver_error() {
    let dir = seeded_dir();
    let worker = StubWorker::new(|_| {
        Err(ResolveError::Status {
            code: 422,
            message: "bad profile".into(),
        })
    });
    let mut app = app(&dir, worker);
    app.open_roster("marines").unwrap();
    app.open_target_list("default").unwrap();

    match app.compute_matrix(WAIT) {
        Err(MatrixError::Resolve(ResolveError::Status { code, .. })) => assert_eq!(code, 422),
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(app.state().matrix().is_none());
    assert!(!app.state().is_matrix_pending());
    assert_eq!(app.state().roster().len(), 2);
}

#[test]
fn test_compute_matrix_times_out_while_held() {
    let dir = seeded_dir();
    let worker = StubWorker::with_cpk(1.4);
    worker.hold.set(true);
    let mut app = app(&dir, worker);
    app.open_roster("marines").unwrap();
    app.open_target_list("default").unwrap();

    assert!(matches!(app.compute_matrix(WAIT), Err(MatrixError::Timeout)));
    assert!(app.state().is_matrix_pending());
}

#[test]
fn test_poll_drops_stale_response() {
    let dir = seeded_dir();
    let worker = StubWorker::with_cpk(1.4);
    worker.hold.set(true);
    let mut app = app(&dir, worker);
    app.open_roster("marines").unwrap();
    app.open_target_list("default").unwrap();

    assert!(app.request_matrix());
    // Already pending for these inputs
    assert!(!app.request_matrix());

    app.state_mut().remove_target("Vehicle");
    assert!(app.request_matrix());

    app.worker.release();
    assert!(app.poll());

    let matrix = app.state().matrix().unwrap();
    assert_eq!(matrix.targets(), ["MEQ"]);
    assert!(!app.state().is_matrix_pending());
}

#[test]
fn test_cancelled_response_clears_pending() {
    let dir = seeded_dir();
    let worker = StubWorker::with_cpk(1.4);
    worker.hold.set(true);
    let mut app = app(&dir, worker);
    app.open_roster("marines").unwrap();
    app.open_target_list("default").unwrap();

    assert!(app.request_matrix());
    let snapshot = app.worker.held.borrow_mut().remove(0);
    app.cancel_matrix();
    assert!(app.worker.is_cancelled());

    assert!(!app.handle_response(WorkerResponse::Cancelled { snapshot }));
    assert!(!app.state().is_matrix_pending());
    assert!(app.state().matrix().is_none());
}

#[test]
fn test_open_missing_roster() {
    let dir = seeded_dir();
    let mut app = app(&dir, StubWorker::with_cpk(1.0));

    assert!(matches!(app.open_roster("nope"), Err(LoadError::NotFound(_))));
    assert!(app.state().roster().is_empty());
}

#[test]
fn test_save_roster_requires_file() {
    let dir = seeded_dir();
    let mut app = app(&dir, StubWorker::with_cpk(1.0));
    app.state_mut().add_weapon(weapons().remove(0), None);

    assert!(matches!(app.save_roster(), Err(SaveError::NoPath)));

    let saved = app.save_roster_as("My List", "My List").unwrap();
    assert_eq!(saved, "my_list");
    assert!(!app.state().roster_has_unsaved_changes());
    assert_eq!(app.state().roster_file.as_deref(), Some("my_list"));
}

#[test]
fn test_save_roster_keeps_display_name() {
    let dir = seeded_dir();
    let mut app = app(&dir, StubWorker::with_cpk(1.0));
    app.open_roster("marines").unwrap();
    app.state_mut().delete_unit(&UnitId::new("u2"));

    assert_eq!(app.save_roster().unwrap(), "marines");

    let rosters = app.list_rosters().unwrap();
    let marines = rosters.iter().find(|r| r.filename == "marines").unwrap();
    assert_eq!(marines.name, "Marines");
    assert_eq!(marines.unit_count, 1);
}

#[test]
fn test_delete_roster_forgets_file() {
    let dir = seeded_dir();
    let mut app = app(&dir, StubWorker::with_cpk(1.0));
    app.open_roster("marines").unwrap();

    app.delete_roster("marines").unwrap();

    assert!(app.state().roster_file.is_none());
    assert!(app.config().active_roster.is_none());
    assert_eq!(app.state().roster().len(), 2);
    assert!(app.list_rosters().unwrap().is_empty());
}

#[test]
fn test_default_target_list_cannot_be_deleted() {
    let dir = seeded_dir();
    let mut app = app(&dir, StubWorker::with_cpk(1.0));
    app.open_target_list("default").unwrap();

    assert!(matches!(
        app.delete_target_list("default"),
        Err(SaveError::Protected(_))
    ));
    assert_eq!(app.state().target_file.as_deref(), Some("default"));
}

#[test]
fn test_save_and_delete_target_list() {
    let dir = seeded_dir();
    let mut app = app(&dir, StubWorker::with_cpk(1.0));
    app.open_target_list("default").unwrap();
    app.state_mut().remove_target("MEQ");

    let saved = app.save_target_list_as("Tanks", "Tanks").unwrap();
    assert_eq!(saved, "tanks");
    assert_eq!(app.list_target_lists().unwrap().len(), 2);

    app.delete_target_list("tanks").unwrap();
    assert!(app.state().target_file.is_none());
    assert!(app.config().active_targets.is_none());
    assert_eq!(app.list_target_lists().unwrap().len(), 1);
}

#[test]
fn test_restore_session_reopens_files() {
    let dir = seeded_dir();
    let config = AppConfig {
        active_roster: Some("marines".into()),
        ..AppConfig::default()
    };
    let mut app = App::new(
        NativeStorage::new(dir.path().to_path_buf()),
        StubWorker::with_cpk(1.0),
        config,
    );

    app.restore_session();

    assert_eq!(app.state().roster().len(), 2);
    assert_eq!(app.state().targets().len(), 2);
    assert_eq!(app.state().target_file.as_deref(), Some("default"));
}

#[test]
fn test_restore_session_tolerates_missing_roster() {
    let dir = seeded_dir();
    let config = AppConfig {
        active_roster: Some("gone".into()),
        assume_half_range: true,
        ..AppConfig::default()
    };
    let mut app = App::new(
        NativeStorage::new(dir.path().to_path_buf()),
        StubWorker::with_cpk(1.0),
        config,
    );

    app.restore_session();

    assert!(app.state().roster().is_empty());
    assert_eq!(app.state().targets().len(), 2);
    assert!(app.state().assumptions().assume_half_range);
}

#[test]
fn test_persist_session_without_data_dir_is_noop() {
    let dir = seeded_dir();
    let app = app(&dir, StubWorker::with_cpk(1.0));
    app.persist_session().unwrap();
    assert!(!AppConfig::path(dir.path()).exists());
}
