//! Platform abstraction layer.
//!
//! - [`Storage`]: persistence for rosters and target lists
//! - [`MatrixWorker`]: background combat resolution
//!
//! The native implementations use the filesystem and a std::thread.

mod storage;
mod worker;

pub mod native;

pub use storage::{RosterSummary, Storage, StorageError, TargetListSummary};
pub use worker::{MatrixWorker, WorkerRequest, WorkerResponse};

pub use native::{NativeStorage, NativeWorker};
