//! Roster efficiency analysis library
//!
//! This crate holds the data model and engines behind roster analysis:
//! - A flat roster of weapon profiles, grouped into units on read
//! - Defensive target profiles for the active session
//! - Cost-per-kill grading (S through F)
//! - The unit × target efficiency matrix, reduced to the best weapon per cell
//!
//! Combat math itself is not part of this crate. Per-weapon results come from
//! an external service behind the [`resolution::CombatResolver`] trait.
//!
//! ```ignore
//! use rosterlab_core::{RosterStore, TargetStore, build_matrix};
//!
//! let units = roster.group_by_unit();
//! let response = resolver.resolve(&request)?;
//! let matrix = build_matrix(&units, targets.targets(), &response);
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod error;
pub mod grading;
pub mod matrix;
pub mod resolution;
pub mod roster;
pub mod targets;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use error::{ResolveError, ValidationError};
pub use grading::{Grade, classify, format_cpk_with_grade};
pub use matrix::{EfficiencyMatrix, GradedCell, MatrixCell, build_matrix};
pub use resolution::{
    Assumptions, CombatResolver, MatrixSnapshot, ResolutionRequest, ResolutionResponse,
};
pub use roster::{RosterStore, RosterTotals};
pub use targets::TargetStore;
