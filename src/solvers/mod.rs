use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::core::actions::Action;
use crate::core::domain::{Individual, SolverError};
use crate::engine::evaluator;
use crate::engine::sim::Synth;

pub mod easimple;

// --- Toolbox ---

/// Session-bound operator kit: the resolved action set, random-sequence
/// generation, the evaluation binding, and the single shared RNG. Every
/// random draw an algorithm makes goes through here.
pub struct Toolbox {
    pub actions: Vec<&'static Action>,
    /// Exclusive upper bound for random sequence lengths.
    pub seq_max_length: usize,
    pub synth: Synth,
    pub penalty_weight: f64,
    pub rng: ChaCha8Rng,
}

impl Toolbox {
    pub fn new(
        actions: Vec<&'static Action>,
        seq_max_length: usize,
        synth: Synth,
        penalty_weight: f64,
        rng: ChaCha8Rng,
    ) -> Self {
        Self {
            actions,
            seq_max_length,
            synth,
            penalty_weight,
            rng,
        }
    }

    pub fn random_action(&mut self) -> &'static Action {
        self.actions[self.rng.gen_range(0..self.actions.len())]
    }

    /// A sequence of uniformly random length in `[0, seq_max_length)` with
    /// every position drawn uniformly from the action set.
    pub fn random_sequence(&mut self) -> Vec<&'static Action> {
        let len = self.rng.gen_range(0..self.seq_max_length);
        (0..len).map(|_| self.random_action()).collect()
    }

    pub fn individual(&mut self) -> Individual {
        Individual::from_actions(self.random_sequence())
    }

    pub fn population(&mut self, size: usize) -> Vec<Individual> {
        (0..size).map(|_| self.individual()).collect()
    }

    /// Scores one individual, attaching the fitness vector.
    pub fn evaluate(&self, individual: &mut Individual) {
        let values =
            evaluator::evaluate_sequence(&individual.actions, &self.synth, self.penalty_weight);
        individual.fitness.set(values);
    }
}

// --- Hall of Fame ---

/// Bounded archive of the best individuals ever observed, ranked by
/// fitness dominance. Updates are monotonic: the champion is never
/// replaced by a worse individual.
#[derive(Debug)]
pub struct HallOfFame {
    capacity: usize,
    entries: Vec<Individual>,
}

impl HallOfFame {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn update(&mut self, population: &[Individual]) {
        for candidate in population {
            if !candidate.fitness.valid() {
                continue;
            }

            let dominated_slot = self
                .entries
                .iter()
                .position(|e| candidate.fitness.dominates(&e.fitness));

            if self.entries.len() < self.capacity {
                let insert_at = dominated_slot.unwrap_or(self.entries.len());
                self.entries.insert(insert_at, candidate.clone());
            } else if let Some(at) = dominated_slot {
                self.entries.insert(at, candidate.clone());
                self.entries.truncate(self.capacity);
            }
        }
    }

    pub fn champion(&self) -> Option<&Individual> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// --- Algorithm Registry ---

/// One pluggable evolutionary strategy. Crossover and mutation rates are
/// owned by the controller, not the strategy.
pub trait EaAlgorithm: Send + Sync {
    fn name(&self) -> &'static str;

    /// One-time validation and priming of the initial population. Failure
    /// aborts `start` without retaining a session.
    fn setup(
        &self,
        population: &mut [Individual],
        toolbox: &mut Toolbox,
        hof: &mut HallOfFame,
    ) -> Result<(), SolverError>;

    /// Advances the population by one generation, updating the archive
    /// with the best individual observed.
    fn step(
        &self,
        population: Vec<Individual>,
        toolbox: &mut Toolbox,
        crossover_rate: f64,
        mutation_rate: f64,
        hof: &mut HallOfFame,
    ) -> Vec<Individual>;
}

/// Fixed registry of known strategies. Unknown names are a fatal
/// configuration error at start time.
pub fn algorithm_by_name(name: &str) -> Option<&'static dyn EaAlgorithm> {
    static EA_SIMPLE: easimple::SimpleEa = easimple::SimpleEa;

    match name {
        "eaSimple" => Some(&EA_SIMPLE),
        _ => None,
    }
}
