//! Contract with the external combat resolution service.
//!
//! The service turns (weapons, targets, assumption flags) into per-weapon
//! metrics. It is consumed as a black box through [`CombatResolver`]; one
//! batched request covers the whole roster against the whole target list.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ResolveError;
use crate::model::{CombatResult, NO_KILL_SENTINEL, TargetProfile, WeaponProfile};

/// Global assumptions applied to every weapon/target pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Assumptions {
    /// Targets get +1 to their armor save
    pub assume_cover: bool,
    /// Melta and rapid fire bonuses apply
    pub assume_half_range: bool,
}

/// One batched request: the whole roster against the whole target list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionRequest {
    pub weapons: Vec<WeaponProfile>,
    pub targets: Vec<TargetProfile>,
    #[serde(default)]
    pub assume_cover: bool,
    #[serde(default)]
    pub assume_half_range: bool,
}

impl ResolutionRequest {
    pub fn new(weapons: Vec<WeaponProfile>, targets: Vec<TargetProfile>, assumptions: Assumptions) -> Self {
        Self {
            weapons,
            targets,
            assume_cover: assumptions.assume_cover,
            assume_half_range: assumptions.assume_half_range,
        }
    }

    pub fn assumptions(&self) -> Assumptions {
        Assumptions {
            assume_cover: self.assume_cover,
            assume_half_range: self.assume_half_range,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.weapons.is_empty() || self.targets.is_empty()
    }
}

/// Aggregate over every weapon result against one target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetSummary {
    pub total_points: u32,
    pub total_kills: f64,
    /// `total_points / total_kills`, or the sentinel when nothing dies
    pub avg_cpk: f64,
}

/// Per-weapon metrics against one target
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetResults {
    #[serde(default)]
    pub metrics: Vec<CombatResult>,
}

impl TargetResults {
    pub fn summary(&self) -> TargetSummary {
        let total_points = self.metrics.iter().map(|m| m.pts).sum();
        let total_kills: f64 = self.metrics.iter().map(|m| m.kills).sum();
        let avg_cpk = if total_kills > 0.0 {
            f64::from(total_points) / total_kills
        } else {
            NO_KILL_SENTINEL
        };

        TargetSummary {
            total_points,
            total_kills,
            avg_cpk,
        }
    }
}

/// Multi-target response, keyed by target name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolutionResponse {
    #[serde(default)]
    pub targets: Vec<String>,
    #[serde(default)]
    pub results: BTreeMap<String, TargetResults>,
}

impl ResolutionResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or extend) the metric list for a target.
    pub fn insert(&mut self, target: impl Into<String>, metrics: Vec<CombatResult>) {
        let target = target.into();
        if !self.targets.contains(&target) {
            self.targets.push(target.clone());
        }
        self.results.entry(target).or_default().metrics.extend(metrics);
    }

    pub fn with_target(mut self, target: impl Into<String>, metrics: Vec<CombatResult>) -> Self {
        self.insert(target, metrics);
        self
    }

    /// Every weapon result against `target`; empty when the target is unknown.
    pub fn results_for(&self, target: &str) -> &[CombatResult] {
        self.results
            .get(target)
            .map(|r| r.metrics.as_slice())
            .unwrap_or(&[])
    }

    pub fn result_count(&self) -> usize {
        self.results.values().map(|r| r.metrics.len()).sum()
    }
}

/// A combat resolution backend.
pub trait CombatResolver {
    fn resolve(&self, request: &ResolutionRequest) -> Result<ResolutionResponse, ResolveError>;
}

impl<F> CombatResolver for F
where
    F: Fn(&ResolutionRequest) -> Result<ResolutionResponse, ResolveError>,
{
    fn resolve(&self, request: &ResolutionRequest) -> Result<ResolutionResponse, ResolveError> {
        self(request)
    }
}

/// The exact inputs a resolution request was built from.
///
/// A response is only applied while its snapshot still equals the current
/// inputs; anything else is stale and dropped. `generation` orders snapshots
/// for logging only, equality is decided on the inputs.
#[derive(Debug, Clone)]
pub struct MatrixSnapshot {
    pub generation: u64,
    pub inputs: ResolutionRequest,
}

impl MatrixSnapshot {
    pub fn new(generation: u64, inputs: ResolutionRequest) -> Self {
        Self { generation, inputs }
    }

    pub fn matches(&self, inputs: &ResolutionRequest) -> bool {
        &self.inputs == inputs
    }
}

impl PartialEq for MatrixSnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.inputs == other.inputs
    }
}
