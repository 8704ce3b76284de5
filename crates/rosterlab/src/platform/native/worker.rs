//! Native worker running combat resolution on a std::thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rosterlab_core::{CombatResolver, MatrixSnapshot, ResolveError};

use crate::platform::worker::{MatrixWorker, WorkerRequest, WorkerResponse};

/// Resolver shared with the worker thread
pub type SharedResolver = Arc<dyn CombatResolver + Send + Sync>;

/// Background worker that resolves matrix requests on a separate thread.
///
/// Requests queued while a resolution is running are drained when it
/// finishes and only the newest one runs; the rest come back as
/// [`WorkerResponse::Cancelled`]. A call already handed to the resolver runs
/// to completion, cancelling only discards its result.
pub struct NativeWorker {
    request_tx: Sender<WorkerRequest>,
    response_rx: Receiver<WorkerResponse>,
    cancel_flag: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl NativeWorker {
    /// Create a new worker with a background thread
    pub fn new(resolver: SharedResolver) -> Self {
        let (request_tx, request_rx) = channel();
        let (response_tx, response_rx) = channel();
        let cancel_flag = Arc::new(AtomicBool::new(false));

        let ctx = WorkerContext {
            resolver,
            response_tx,
            cancel_flag: cancel_flag.clone(),
        };

        let thread = thread::spawn(move || {
            ctx.run(request_rx);
        });

        Self {
            request_tx,
            response_rx,
            cancel_flag,
            thread: Some(thread),
        }
    }
}

impl MatrixWorker for NativeWorker {
    fn send(&self, request: WorkerRequest) -> bool {
        // Clear cancel flag for new work
        self.cancel_flag.store(false, Ordering::SeqCst);
        self.request_tx.send(request).is_ok()
    }

    fn try_recv(&self) -> Option<WorkerResponse> {
        self.response_rx.try_recv().ok()
    }

    fn recv_timeout(&self, timeout: Duration) -> Result<WorkerResponse, RecvTimeoutError> {
        self.response_rx.recv_timeout(timeout)
    }

    fn cancel(&self) {
        self.cancel_flag.store(true, Ordering::SeqCst);
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_flag.load(Ordering::SeqCst)
    }

    fn shutdown(&self) {
        let _ = self.request_tx.send(WorkerRequest::Shutdown);
    }
}

impl Drop for NativeWorker {
    fn drop(&mut self) {
        self.shutdown();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Shared state for the background worker thread.
struct WorkerContext {
    resolver: SharedResolver,
    response_tx: Sender<WorkerResponse>,
    cancel_flag: Arc<AtomicBool>,
}

impl WorkerContext {
    fn run(&self, request_rx: Receiver<WorkerRequest>) {
        while let Ok(request) = request_rx.recv() {
            let WorkerRequest::Resolve { snapshot } = request else {
                break;
            };

            let (latest, shutdown) = self.drain_superseded(snapshot, &request_rx);
            self.resolve(latest);

            if shutdown {
                break;
            }
        }
        tracing::debug!("resolution worker stopped");
    }

    /// Take every queued request, keep the newest, cancel the rest.
    fn drain_superseded(
        &self,
        mut latest: MatrixSnapshot,
        request_rx: &Receiver<WorkerRequest>,
    ) -> (MatrixSnapshot, bool) {
        let mut shutdown = false;
        while let Ok(next) = request_rx.try_recv() {
            match next {
                WorkerRequest::Resolve { snapshot } => {
                    let superseded = std::mem::replace(&mut latest, snapshot);
                    tracing::debug!(
                        generation = superseded.generation,
                        newer = latest.generation,
                        "superseded resolution request"
                    );
                    let _ = self.response_tx.send(WorkerResponse::Cancelled {
                        snapshot: superseded,
                    });
                }
                WorkerRequest::Shutdown => {
                    shutdown = true;
                    break;
                }
            }
        }
        (latest, shutdown)
    }

    fn resolve(&self, snapshot: MatrixSnapshot) {
        if self.cancel_flag.load(Ordering::SeqCst) {
            let _ = self.response_tx.send(WorkerResponse::Cancelled { snapshot });
            return;
        }

        tracing::info!(
            generation = snapshot.generation,
            weapons = snapshot.inputs.weapons.len(),
            targets = snapshot.inputs.targets.len(),
            "Starting combat resolution"
        );

        let result = self.resolver.resolve(&snapshot.inputs);

        if self.cancel_flag.load(Ordering::SeqCst) {
            let _ = self.response_tx.send(WorkerResponse::Cancelled { snapshot });
            return;
        }

        let response = match result {
            Ok(response) => WorkerResponse::Complete { snapshot, response },
            Err(ResolveError::Cancelled) => WorkerResponse::Cancelled { snapshot },
            Err(error) => {
                tracing::warn!(generation = snapshot.generation, error = %error, "Combat resolution failed");
                WorkerResponse::Failed { snapshot, error }
            }
        };
        let _ = self.response_tx.send(response);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use rosterlab_core::model::{CombatResult, RollTarget, TargetProfile, WeaponProfile};
    use rosterlab_core::{Assumptions, ResolutionRequest, ResolutionResponse};

    const WAIT: Duration = Duration::from_secs(5);

    fn snapshot(generation: u64) -> MatrixSnapshot {
        let weapons = vec![WeaponProfile::new("u1", "Intercessors", "Bolt rifle").with_unit(5, 80)];
        let targets = vec![TargetProfile::new("MEQ", 18, 4, 2, RollTarget::new(3).unwrap())];
        MatrixSnapshot::new(
            generation,
            ResolutionRequest::new(weapons, targets, Assumptions::default()),
        )
    }

    fn echo_response(request: &ResolutionRequest) -> ResolutionResponse {
        let mut response = ResolutionResponse::new();
        for target in &request.targets {
            let metrics = request
                .weapons
                .iter()
                .map(|w| {
                    CombatResult::new(w.unit_id.clone(), w.name.clone(), w.weapon.clone())
                        .with_metrics(1.0, 2.0, 2.0, 1.0)
                })
                .collect();
            response.insert(target.name.clone(), metrics);
        }
        response
    }

    #[test]
    fn test_resolves_and_returns_snapshot() {
        let resolver: SharedResolver =
            Arc::new(|req: &ResolutionRequest| Ok::<_, ResolveError>(echo_response(req)));
        let worker = NativeWorker::new(resolver);

        assert!(worker.send(WorkerRequest::Resolve {
            snapshot: snapshot(1)
        }));

        match worker.recv_timeout(WAIT) {
            Ok(WorkerResponse::Complete { snapshot, response }) => {
                assert_eq!(snapshot.generation, 1);
                assert_eq!(response.results_for("MEQ").len(), 1);
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[test]
    fn test_resolver_error_is_reported() {
        let resolver: SharedResolver = Arc::new(|_: &ResolutionRequest| {
            Err::<ResolutionResponse, _>(ResolveError::Transport("connection refused".into()))
        });
        let worker = NativeWorker::new(resolver);

        worker.send(WorkerRequest::Resolve {
            snapshot: snapshot(3),
        });

        match worker.recv_timeout(WAIT) {
            Ok(WorkerResponse::Failed { snapshot, error }) => {
                assert_eq!(snapshot.generation, 3);
                assert!(matches!(error, ResolveError::Transport(_)));
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[test]
    fn test_queued_requests_last_wins() {
        let (started_tx, started_rx) = channel::<u64>();
        let (gate_tx, gate_rx) = channel::<()>();
        let started_tx = Mutex::new(started_tx);
        let gate_rx = Mutex::new(gate_rx);

        let resolver: SharedResolver = Arc::new(move |req: &ResolutionRequest| {
            let _ = started_tx.lock().unwrap().send(req.weapons.len() as u64);
            let _ = gate_rx.lock().unwrap().recv();
            Ok::<_, ResolveError>(echo_response(req))
        });
        let worker = NativeWorker::new(resolver);

        worker.send(WorkerRequest::Resolve {
            snapshot: snapshot(1),
        });
        started_rx.recv_timeout(WAIT).unwrap();

        // Both queue up behind the running request
        worker.send(WorkerRequest::Resolve {
            snapshot: snapshot(2),
        });
        worker.send(WorkerRequest::Resolve {
            snapshot: snapshot(3),
        });
        gate_tx.send(()).unwrap();
        gate_tx.send(()).unwrap();

        let mut seen = Vec::new();
        for _ in 0..3 {
            let response = worker.recv_timeout(WAIT).unwrap();
            let kind = match &response {
                WorkerResponse::Complete { .. } => "complete",
                WorkerResponse::Cancelled { .. } => "cancelled",
                WorkerResponse::Failed { .. } => "failed",
            };
            seen.push((response.snapshot().generation, kind));
        }

        assert_eq!(
            seen,
            vec![(1, "complete"), (2, "cancelled"), (3, "complete")]
        );
    }

    #[test]
    fn test_cancel_discards_result() {
        let (started_tx, started_rx) = channel::<()>();
        let (gate_tx, gate_rx) = channel::<()>();
        let started_tx = Mutex::new(started_tx);
        let gate_rx = Mutex::new(gate_rx);

        let resolver: SharedResolver = Arc::new(move |req: &ResolutionRequest| {
            let _ = started_tx.lock().unwrap().send(());
            let _ = gate_rx.lock().unwrap().recv();
            Ok::<_, ResolveError>(echo_response(req))
        });
        let worker = NativeWorker::new(resolver);

        worker.send(WorkerRequest::Resolve {
            snapshot: snapshot(7),
        });
        started_rx.recv_timeout(WAIT).unwrap();
        worker.cancel();
        assert!(worker.is_cancelled());
        gate_tx.send(()).unwrap();

        match worker.recv_timeout(WAIT) {
            Ok(WorkerResponse::Cancelled { snapshot }) => assert_eq!(snapshot.generation, 7),
            other => panic!("unexpected response: {other:?}"),
        }
    }
}
