use std::time::Instant;

use crossbeam_channel::{Receiver, Sender};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::core::actions::{action_by_name, resolve_actions, Action};
use crate::core::domain::{Individual, LogBuffer, Settings, SolverError, StateSummary};
use crate::engine::evaluator::hq_percent_from_quality;
use crate::engine::heuristic;
use crate::engine::sim::{self, Crafter, Recipe, SimOptions, Synth};
use crate::solvers::{algorithm_by_name, EaAlgorithm, HallOfFame, Toolbox};

/// Variation rates are owned by the controller, not the strategy.
const CROSSOVER_RATE: f64 = 0.5;
const MUTATION_RATE: f64 = 0.2;

// --- Wire Types ---

/// Inbound requests. Exactly one request is processed at a time; a new
/// `Start` discards any prior session.
#[derive(Debug)]
pub enum Request {
    Start(Box<Settings>),
    Advance,
    Resume,
    Finish,
}

/// Outbound reports, one per request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Report {
    #[serde(rename_all = "camelCase")]
    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        log: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Progress {
        generations_completed: u32,
        max_generations: u32,
        state: StateSummary,
        best_sequence: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    Success {
        log: String,
        state: StateSummary,
        best_sequence: Vec<String>,
    },
}

// --- Session ---

/// Everything a running search owns: configuration, the simulation context
/// pair, the population, the archive, the generation counters, and the
/// single seeded RNG (inside the toolbox) shared by the oracle, the seeder
/// and the evolutionary operators.
pub struct Session {
    pub settings: Settings,
    pub algorithm: &'static dyn EaAlgorithm,
    pub synth: Synth,
    pub synth_no_conditions: Synth,
    pub population: Vec<Individual>,
    pub toolbox: Toolbox,
    pub hof: HallOfFame,
    pub generation: u32,
    pub max_generations: u32,
    pub start_time: Instant,
}

impl Session {
    /// Builds a fresh session: resolves actions, derives the context pair,
    /// seeds the RNG, picks or builds the starting sequence, constructs the
    /// initial population (size − 1 random plus the seed, unmutated, last)
    /// and primes the selected algorithm. Does not run a generation.
    pub fn initialize(settings: Settings, log: &mut LogBuffer) -> Result<Self, SolverError> {
        let seed = settings.seed.unwrap_or_else(rand::random);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let actions = resolve_actions(&settings.crafter.actions, log);
        if actions.is_empty() {
            return Err(SolverError::NoActions);
        }

        let crafter = Crafter::new(&settings.crafter, actions.clone());
        let recipe = Recipe::from(&settings.recipe);
        let synth = Synth::new(
            crafter,
            recipe,
            settings.max_tricks_uses,
            settings.reliability_percent / 100.0,
            settings.use_conditions,
        );
        let synth_no_conditions = synth.without_conditions();

        let mut sequence: Vec<&'static Action> = settings
            .sequence
            .iter()
            .filter_map(|name| action_by_name(name))
            .collect();
        if sequence.is_empty() {
            sequence = heuristic::build_and_log(&synth, &mut rng, log);
        }
        let seq_max_length = sequence.len().max(50);

        let mut toolbox = Toolbox::new(
            actions,
            seq_max_length,
            synth.clone(),
            settings.solver.penalty_weight,
            rng,
        );
        let mut population = toolbox.population(settings.solver.population.saturating_sub(1));
        population.push(Individual::from_actions(sequence));

        let mut hof = HallOfFame::new(1);

        log.write(format!(
            "Seed: {}, Use Conditions: {}\n\n",
            seed, synth.use_conditions
        ));

        let algorithm = algorithm_by_name(&settings.algorithm)
            .ok_or_else(|| SolverError::UnknownAlgorithm(settings.algorithm.clone()))?;

        if let Err(err) = algorithm.setup(&mut population, &mut toolbox, &mut hof) {
            log.write(format!("\n\n{}\n", err));
            return Err(err);
        }

        let max_generations = settings.solver.generations;

        Ok(Self {
            settings,
            algorithm,
            synth,
            synth_no_conditions,
            population,
            toolbox,
            hof,
            generation: 0,
            max_generations,
            start_time: Instant::now(),
        })
    }
}

// --- Controller ---

/// Message-driven lifecycle state machine: Uninitialized (no session) →
/// Ready (session present, one generation per advance) → Finished. Errors
/// never cross the request boundary; each becomes one error report, and the
/// session is left as it was when the error occurred.
#[derive(Default)]
pub struct SolverWorker {
    pub session: Option<Session>,
    pub log: LogBuffer,
}

impl SolverWorker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&mut self, request: Request) -> Report {
        let result = match request {
            Request::Start(settings) => self.start(*settings),
            Request::Advance => self.advance(),
            Request::Resume => self.resume(),
            Request::Finish => self.finish(),
        };

        match result {
            Ok(report) => report,
            Err(err) => {
                log::error!("request failed: {}", err);
                let log = (!self.log.is_empty()).then(|| self.log.text().to_string());
                Report::Error {
                    message: err.to_string(),
                    log,
                }
            }
        }
    }

    fn start(&mut self, settings: Settings) -> Result<Report, SolverError> {
        self.session = None;
        self.log.clear();

        let session = Session::initialize(settings, &mut self.log)?;
        self.session = Some(session);

        self.run_one_generation()
    }

    fn advance(&mut self) -> Result<Report, SolverError> {
        self.run_one_generation()
    }

    fn resume(&mut self) -> Result<Report, SolverError> {
        let session = self.session.as_mut().ok_or(SolverError::NoSession)?;
        if session.generation >= session.max_generations {
            // Growth, not replacement: extend by the originally configured
            // generation count.
            session.max_generations += session.settings.solver.generations;
        }
        self.log.clear();

        self.run_one_generation()
    }

    fn run_one_generation(&mut self) -> Result<Report, SolverError> {
        let session = self.session.as_mut().ok_or(SolverError::NoSession)?;

        session.generation += 1;
        let population = std::mem::take(&mut session.population);
        session.population = session.algorithm.step(
            population,
            &mut session.toolbox,
            CROSSOVER_RATE,
            MUTATION_RATE,
            &mut session.hof,
        );

        let generations_completed = session.generation;
        let max_generations = session.max_generations;

        let Session {
            hof,
            toolbox,
            synth_no_conditions,
            ..
        } = session;
        let champion = hof.champion().ok_or_else(|| {
            SolverError::Internal("hall of fame is empty after a generation".into())
        })?;
        let state = derive_state(champion, synth_no_conditions, None, &mut toolbox.rng);

        Ok(Report::Progress {
            generations_completed,
            max_generations,
            state,
            best_sequence: champion.short_names(),
        })
    }

    fn finish(&mut self) -> Result<Report, SolverError> {
        let session = self.session.as_mut().ok_or(SolverError::NoSession)?;
        let log = &mut self.log;

        let debug = session.settings.debug;
        let mc_runs = session.settings.max_montecarlo_runs;
        let champion = session
            .hof
            .champion()
            .cloned()
            .ok_or_else(|| SolverError::Internal("hall of fame is empty".into()))?;

        log.write("Genetic Algorithm Result\n");
        log.write("========================\n");
        sim::simulate_expected(&champion.actions, &session.synth, debug, Some(log));

        log.write("\nMonte Carlo Result\n");
        log.write("==================\n");
        let mc = sim::monte_carlo(
            &champion.actions,
            &session.synth,
            mc_runs,
            &mut session.toolbox.rng,
            debug,
            Some(log),
        );

        if debug {
            log.write("\nMonte Carlo Example\n");
            log.write("===================\n");
            let opts = SimOptions {
                assume_success: false,
                override_on_condition: session.settings.override_on_condition,
                verbose: true,
            };
            sim::simulate(
                &champion.actions,
                &session.synth,
                opts,
                &mut session.toolbox.rng,
                Some(log),
            );
        }

        // Conditions stay disabled for the final state so the reported
        // numbers are deterministic; only the Monte Carlo percentage is
        // overlaid on top.
        let state = derive_state(
            &champion,
            &session.synth_no_conditions,
            Some(mc.success_percent),
            &mut session.toolbox.rng,
        );

        let elapsed = session.start_time.elapsed().as_millis();
        log.write(format!("\nElapsed time: {} ms", elapsed));

        Ok(Report::Success {
            log: log.text().to_string(),
            state,
            best_sequence: champion.short_names(),
        })
    }
}

/// Re-simulates the champion once through the given context and derives the
/// report-facing end state.
fn derive_state(
    champion: &Individual,
    synth: &Synth,
    success_percent: Option<f64>,
    rng: &mut ChaCha8Rng,
) -> StateSummary {
    let opts = SimOptions {
        assume_success: true,
        ..Default::default()
    };
    let state = sim::simulate(&champion.actions, synth, opts, rng, None);
    let chk = state.check_violations(synth);

    StateSummary {
        quality: state.quality,
        durability: state.durability,
        cp: state.cp,
        progress: state.progress,
        success_percent,
        hq_percent: hq_percent_from_quality(state.quality / synth.recipe.max_quality * 100.0),
        feasible: chk.feasible(),
        violations: chk,
        condition: state.condition,
    }
}

// --- Run Loop ---

/// Synchronous request loop: one request at a time, no internal
/// parallelism, no preemption within a generation. Terminates when the
/// request channel closes or every report receiver is gone.
pub fn run(requests: Receiver<Request>, reports: Sender<Report>) {
    let mut worker = SolverWorker::new();
    for request in requests {
        let report = worker.handle(request);
        if reports.send(report).is_err() {
            break;
        }
    }
}
