//! Roster efficiency analysis application
//!
//! Wraps `rosterlab_core` with everything needed to run it:
//! - A transactional state manager that owns the roster, targets and matrix
//! - A background worker that calls the combat resolution service
//! - An HTTP client for that service
//! - YAML persistence of rosters and target lists by filename
//! - File logging and `config.yaml` settings

pub mod app;
pub mod data;
pub mod logging;
pub mod platform;
pub mod report;
pub mod resolver;
pub mod state;
pub mod util;

#[cfg(test)]
mod tests;

pub use app::App;
pub use data::AppConfig;
pub use logging::init_logging;
pub use resolver::HttpResolver;
pub use state::AppState;
