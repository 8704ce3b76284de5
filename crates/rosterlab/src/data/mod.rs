//! Persisted documents and settings.

pub mod config;
pub mod files;

pub use config::AppConfig;
pub use files::{RosterFile, TargetListFile};
