use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::core::domain::{Individual, SolverError};
use crate::solvers::{EaAlgorithm, HallOfFame, Toolbox};

const TOURNAMENT_SIZE: usize = 3;
const INSERT_RATE: f64 = 0.1;
const DELETE_RATE: f64 = 0.1;

/// The classic simple generational EA: tournament selection, one-point
/// crossover on adjacent pairs, light per-gene mutation with occasional
/// insertion and deletion, then re-evaluation of whatever the operators
/// invalidated.
pub struct SimpleEa;

impl EaAlgorithm for SimpleEa {
    fn name(&self) -> &'static str {
        "eaSimple"
    }

    fn setup(
        &self,
        population: &mut [Individual],
        toolbox: &mut Toolbox,
        hof: &mut HallOfFame,
    ) -> Result<(), SolverError> {
        if population.is_empty() {
            return Err(SolverError::Setup("initial population is empty".into()));
        }
        if toolbox.actions.is_empty() {
            return Err(SolverError::Setup(
                "toolbox has no actions to draw from".into(),
            ));
        }

        for individual in population.iter_mut() {
            if !individual.fitness.valid() {
                toolbox.evaluate(individual);
            }
        }
        hof.update(population);

        Ok(())
    }

    fn step(
        &self,
        population: Vec<Individual>,
        toolbox: &mut Toolbox,
        crossover_rate: f64,
        mutation_rate: f64,
        hof: &mut HallOfFame,
    ) -> Vec<Individual> {
        let mut offspring: Vec<Individual> = (0..population.len())
            .map(|_| tournament(&population, TOURNAMENT_SIZE, &mut toolbox.rng).clone())
            .collect();

        for i in (1..offspring.len()).step_by(2) {
            if toolbox.rng.gen::<f64>() < crossover_rate {
                let (left, right) = offspring.split_at_mut(i);
                let first = &mut left[i - 1];
                let second = &mut right[0];
                if crossover_one_point(&mut first.actions, &mut second.actions, &mut toolbox.rng) {
                    first.fitness.invalidate();
                    second.fitness.invalidate();
                }
            }
        }

        for individual in &mut offspring {
            if toolbox.rng.gen::<f64>() < mutation_rate {
                mutate(individual, toolbox);
                individual.fitness.invalidate();
            }
        }

        for individual in &mut offspring {
            if !individual.fitness.valid() {
                toolbox.evaluate(individual);
            }
        }
        hof.update(&offspring);

        offspring
    }
}

fn tournament<'a>(
    population: &'a [Individual],
    size: usize,
    rng: &mut ChaCha8Rng,
) -> &'a Individual {
    let mut best = &population[rng.gen_range(0..population.len())];
    for _ in 1..size {
        let candidate = &population[rng.gen_range(0..population.len())];
        if candidate.fitness.dominates(&best.fitness) {
            best = candidate;
        }
    }
    best
}

/// One-point crossover on variable-length sequences: each parent is cut at
/// an independent interior point and the tails are swapped. Sequences
/// shorter than two actions are left untouched.
fn crossover_one_point(
    a: &mut Vec<&'static crate::core::actions::Action>,
    b: &mut Vec<&'static crate::core::actions::Action>,
    rng: &mut ChaCha8Rng,
) -> bool {
    if a.len() < 2 || b.len() < 2 {
        return false;
    }

    let cut_a = rng.gen_range(1..a.len());
    let cut_b = rng.gen_range(1..b.len());
    let tail_a = a.split_off(cut_a);
    let tail_b = b.split_off(cut_b);
    a.extend(tail_b);
    b.extend(tail_a);

    true
}

fn mutate(individual: &mut Individual, toolbox: &mut Toolbox) {
    let len = individual.actions.len();
    if len > 0 {
        let gene_rate = (2.0 / len as f64).min(1.0);
        for i in 0..len {
            if toolbox.rng.gen::<f64>() < gene_rate {
                individual.actions[i] = toolbox.random_action();
            }
        }
    }

    if individual.actions.len() < toolbox.seq_max_length
        && toolbox.rng.gen::<f64>() < INSERT_RATE
    {
        let at = toolbox.rng.gen_range(0..=individual.actions.len());
        let action = toolbox.random_action();
        individual.actions.insert(at, action);
    }

    if !individual.actions.is_empty() && toolbox.rng.gen::<f64>() < DELETE_RATE {
        let at = toolbox.rng.gen_range(0..individual.actions.len());
        individual.actions.remove(at);
    }
}
