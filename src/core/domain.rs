use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::actions::Action;

// --- Configuration Types ---

/// The immutable input bundle for one search. Created once per `start`,
/// never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub seed: Option<u64>,
    pub crafter: CrafterSettings,
    pub recipe: RecipeSettings,
    #[serde(default)]
    pub max_tricks_uses: i32,
    #[serde(default = "default_reliability")]
    pub reliability_percent: f64,
    #[serde(default)]
    pub use_conditions: bool,
    /// Optional explicit starting sequence. Empty means "build one heuristically".
    #[serde(default)]
    pub sequence: Vec<String>,
    pub solver: SolverSettings,
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    #[serde(default = "default_montecarlo_runs")]
    pub max_montecarlo_runs: u32,
    #[serde(default)]
    pub override_on_condition: bool,
    #[serde(default)]
    pub debug: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrafterSettings {
    pub level: u32,
    pub craftsmanship: f64,
    pub control: f64,
    pub cp: i32,
    pub actions: Vec<String>,
    #[serde(default)]
    pub recipe_class: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSettings {
    pub level: u32,
    pub difficulty: f64,
    pub durability: i32,
    #[serde(default)]
    pub start_quality: f64,
    pub max_quality: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverSettings {
    pub population: usize,
    pub generations: u32,
    pub penalty_weight: f64,
}

fn default_reliability() -> f64 {
    100.0
}

fn default_algorithm() -> String {
    "eaSimple".to_string()
}

fn default_montecarlo_runs() -> u32 {
    500
}

// --- Fitness & Individuals ---

/// A two-component maximize/maximize fitness vector. Validity is derived
/// from presence of the values, never stored redundantly.
///
/// Dominance is lexicographic over the components, matching the weighted
/// tuple comparison the evolutionary comparator expects.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Fitness {
    values: Option<(f64, f64)>,
}

impl Fitness {
    pub fn invalid() -> Self {
        Self { values: None }
    }

    pub fn valid(&self) -> bool {
        self.values.is_some()
    }

    pub fn values(&self) -> Option<(f64, f64)> {
        self.values
    }

    pub fn set(&mut self, values: (f64, f64)) {
        self.values = Some(values);
    }

    pub fn invalidate(&mut self) {
        self.values = None;
    }

    /// Strict dominance. Any valid fitness dominates an invalid one; an
    /// invalid fitness dominates nothing.
    pub fn dominates(&self, other: &Fitness) -> bool {
        match (self.values, other.values) {
            (Some(a), Some(b)) => a > b,
            (Some(_), None) => true,
            _ => false,
        }
    }
}

/// An ordered sequence of actions plus its attached fitness.
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    pub actions: Vec<&'static Action>,
    pub fitness: Fitness,
}

impl Individual {
    pub fn from_actions(actions: Vec<&'static Action>) -> Self {
        Self {
            actions,
            fitness: Fitness::invalid(),
        }
    }

    /// The sequence rendered as short display codes, the wire format for
    /// `bestSequence` in reports.
    pub fn short_names(&self) -> Vec<String> {
        self.actions.iter().map(|a| a.short_name.to_string()).collect()
    }
}

// --- Simulation-facing Types ---

/// Per-step stochastic modifier. `Normal` is the neutral value forced when
/// conditions are disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Normal,
    Good,
    Excellent,
    Poor,
}

impl Condition {
    pub fn quality_multiplier(&self) -> f64 {
        match self {
            Condition::Poor => 0.5,
            Condition::Normal => 1.0,
            Condition::Good => 1.5,
            Condition::Excellent => 4.0,
        }
    }

    /// One-letter code for trace tables.
    pub fn code(&self) -> char {
        match self {
            Condition::Normal => 'N',
            Condition::Good => 'G',
            Condition::Excellent => 'E',
            Condition::Poor => 'P',
        }
    }
}

/// The five feasibility predicates evaluated against a simulated end state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violations {
    pub progress_ok: bool,
    pub durability_ok: bool,
    pub cp_ok: bool,
    pub tricks_ok: bool,
    pub reliability_ok: bool,
}

impl Violations {
    /// Logical AND of all five predicates.
    pub fn feasible(&self) -> bool {
        self.progress_ok && self.durability_ok && self.cp_ok && self.tricks_ok && self.reliability_ok
    }
}

/// Derived end-state block carried by progress and success reports.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSummary {
    pub quality: f64,
    pub durability: i32,
    pub cp: i32,
    pub progress: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_percent: Option<f64>,
    pub hq_percent: u32,
    pub feasible: bool,
    pub violations: Violations,
    pub condition: Condition,
}

// --- Log Buffer ---

/// Append-only text accumulator for the report-facing log. Cleared at the
/// start of each externally requested resume to bound growth across
/// long-paused sessions.
#[derive(Debug, Default)]
pub struct LogBuffer {
    text: String,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&mut self, msg: impl AsRef<str>) {
        self.text.push_str(msg.as_ref());
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

// --- Error Taxonomy ---

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("No such algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("No supported actions in crafter action list")]
    NoActions,

    #[error("Solver setup failed: {0}")]
    Setup(String),

    #[error("No active solver session")]
    NoSession,

    #[error("{0}")]
    Internal(String),
}
