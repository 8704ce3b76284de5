//! Background resolution worker abstraction.
//!
//! The worker runs combat resolution off the caller's thread. Every request
//! carries the [`MatrixSnapshot`] it was built from and every response hands
//! that snapshot back, so the state manager can drop responses for inputs
//! that have changed in the meantime.

use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use rosterlab_core::{MatrixSnapshot, ResolutionResponse, ResolveError};

/// Request sent to the background worker
#[derive(Debug)]
pub enum WorkerRequest {
    /// Resolve the snapshot's inputs
    Resolve { snapshot: MatrixSnapshot },
    /// Graceful shutdown
    Shutdown,
}

/// Response from the background worker
#[derive(Debug)]
pub enum WorkerResponse {
    Complete {
        snapshot: MatrixSnapshot,
        response: ResolutionResponse,
    },
    Failed {
        snapshot: MatrixSnapshot,
        error: ResolveError,
    },
    /// Cancelled, or superseded by a newer request before it ran
    Cancelled { snapshot: MatrixSnapshot },
}

impl WorkerResponse {
    pub fn snapshot(&self) -> &MatrixSnapshot {
        match self {
            WorkerResponse::Complete { snapshot, .. }
            | WorkerResponse::Failed { snapshot, .. }
            | WorkerResponse::Cancelled { snapshot } => snapshot,
        }
    }
}

/// Background resolution interface.
pub trait MatrixWorker {
    /// Queue a request. Returns false if the worker has stopped.
    fn send(&self, request: WorkerRequest) -> bool;

    /// Try to receive a response (non-blocking)
    fn try_recv(&self) -> Option<WorkerResponse>;

    /// Wait up to `timeout` for a response. `Disconnected` means the worker
    /// has stopped and nothing more will arrive.
    fn recv_timeout(&self, timeout: Duration) -> Result<WorkerResponse, RecvTimeoutError>;

    /// Request cancellation of the current operation
    fn cancel(&self);

    /// Check if cancellation was requested
    fn is_cancelled(&self) -> bool;

    /// Shutdown the worker
    fn shutdown(&self);
}
