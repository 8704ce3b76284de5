//! Native platform implementations using filesystem and threads.

mod storage;
mod worker;

pub use storage::{DEFAULT_ROSTER, DEFAULT_TARGET_LIST, NativeStorage, sanitize_filename};
pub use worker::{NativeWorker, SharedResolver};
