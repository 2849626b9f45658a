use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::core::actions::{action_by_name, Action, ActionKind};
use crate::core::domain::{Condition, CrafterSettings, LogBuffer, RecipeSettings, Violations};

// --- Context ---

#[derive(Debug, Clone)]
pub struct Crafter {
    pub level: u32,
    pub craftsmanship: f64,
    pub control: f64,
    pub cp: i32,
    pub actions: Vec<&'static Action>,
    pub class: String,
}

impl Crafter {
    pub fn new(settings: &CrafterSettings, actions: Vec<&'static Action>) -> Self {
        Self {
            level: settings.level,
            craftsmanship: settings.craftsmanship,
            control: settings.control,
            cp: settings.cp,
            actions,
            class: settings.recipe_class.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Recipe {
    pub level: u32,
    pub difficulty: f64,
    pub durability: i32,
    pub start_quality: f64,
    pub max_quality: f64,
}

impl From<&RecipeSettings> for Recipe {
    fn from(settings: &RecipeSettings) -> Self {
        Self {
            level: settings.level,
            difficulty: settings.difficulty,
            durability: settings.durability,
            start_quality: settings.start_quality,
            max_quality: settings.max_quality,
        }
    }
}

/// Reusable simulation context binding crafter, recipe and tuning. Two
/// variants exist per search: one with stochastic conditions enabled and
/// one without, for robustness evaluation and deterministic reporting
/// respectively.
#[derive(Debug, Clone)]
pub struct Synth {
    pub crafter: Crafter,
    pub recipe: Recipe,
    pub max_tricks_uses: i32,
    /// Required reliability as a fraction in [0, 1].
    pub reliability_index: f64,
    pub use_conditions: bool,
}

impl Synth {
    pub fn new(
        crafter: Crafter,
        recipe: Recipe,
        max_tricks_uses: i32,
        reliability_index: f64,
        use_conditions: bool,
    ) -> Self {
        Self {
            crafter,
            recipe,
            max_tricks_uses,
            reliability_index,
            use_conditions,
        }
    }

    /// Same context with the stochastic condition model switched off.
    pub fn without_conditions(&self) -> Self {
        Self {
            use_conditions: false,
            ..self.clone()
        }
    }

    fn effective_recipe_level(&self, ingenuity_active: bool) -> f64 {
        let level = self.recipe.level as f64;
        if ingenuity_active {
            (level - 5.0).max(1.0)
        } else {
            level
        }
    }

    fn level_correction(&self, ingenuity_active: bool) -> f64 {
        let diff = self.crafter.level as f64 - self.effective_recipe_level(ingenuity_active);
        1.0 + 0.025 * diff.clamp(-10.0, 10.0)
    }

    pub fn base_progress(&self, ingenuity_active: bool) -> f64 {
        (self.crafter.craftsmanship * 0.21 + 2.0) * self.level_correction(ingenuity_active)
    }

    pub fn base_quality(&self, effective_control: f64, ingenuity_active: bool) -> f64 {
        (effective_control * 0.36 + 34.0) * self.level_correction(ingenuity_active)
    }
}

// --- State ---

/// Active effect counters. A duration of N means the effect applies to the
/// N steps following the cast.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Buffs {
    pub steady_hand: u8,
    pub great_strides: u8,
    pub waste_not: u8,
    pub manipulation: u8,
    pub ingenuity: u8,
    /// Stacks are fractional so the expected-value trace can accumulate
    /// partial stacks from uncertain touches.
    pub inner_quiet: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CraftState {
    pub step: u32,
    pub progress: f64,
    pub quality: f64,
    pub durability: i32,
    pub cp: i32,
    pub condition: Condition,
    pub trick_uses: i32,
    pub wasted_actions: u32,
    /// Product of per-step success probabilities of executed actions.
    pub reliability: f64,
    pub min_durability: i32,
    pub min_cp: i32,
    pub buffs: Buffs,
}

impl CraftState {
    pub fn from_synth(synth: &Synth) -> Self {
        Self {
            step: 0,
            progress: 0.0,
            quality: synth.recipe.start_quality,
            durability: synth.recipe.durability,
            cp: synth.crafter.cp,
            condition: Condition::Normal,
            trick_uses: 0,
            wasted_actions: 0,
            reliability: 1.0,
            min_durability: synth.recipe.durability,
            min_cp: synth.crafter.cp,
            buffs: Buffs::default(),
        }
    }

    /// The five feasibility predicates against this end state.
    pub fn check_violations(&self, synth: &Synth) -> Violations {
        Violations {
            progress_ok: self.progress >= synth.recipe.difficulty,
            durability_ok: self.min_durability >= 0,
            cp_ok: self.min_cp >= 0,
            tricks_ok: self.trick_uses <= synth.max_tricks_uses,
            reliability_ok: self.reliability >= synth.reliability_index,
        }
    }

    fn craft_over(&self, synth: &Synth) -> bool {
        self.progress >= synth.recipe.difficulty || self.durability <= 0
    }

    fn success_probability(&self, action: &Action) -> f64 {
        let bonus = if self.buffs.steady_hand > 0 { 0.2 } else { 0.0 };
        (action.success_probability + bonus).min(1.0)
    }
}

// --- Traces ---

#[derive(Debug, Clone, Copy, Default)]
pub struct SimOptions {
    /// Force every success roll and pin the condition at Normal; used for
    /// the deterministic display trace.
    pub assume_success: bool,
    /// Substitute Tricks of the Trade on a Good condition (debug trace only).
    pub override_on_condition: bool,
    /// Write a step table into the log.
    pub verbose: bool,
}

/// Runs one trace of the sequence. Success rolls and condition rolls (when
/// the context enables them) consume the shared session RNG; with
/// `assume_success` every roll is forced and the condition stays Normal, so
/// no randomness is drawn and repeated invocations are byte-identical.
pub fn simulate(
    sequence: &[&'static Action],
    synth: &Synth,
    opts: SimOptions,
    rng: &mut ChaCha8Rng,
    mut log: Option<&mut LogBuffer>,
) -> CraftState {
    let mut state = CraftState::from_synth(synth);

    if opts.verbose {
        if let Some(log) = log.as_deref_mut() {
            write_table_header(log);
        }
    }

    for &planned in sequence {
        if state.craft_over(synth) {
            state.wasted_actions += 1;
            continue;
        }

        let action = substitute_on_condition(&state, synth, planned, &opts);

        let p = state.success_probability(action);
        let weight = if opts.assume_success || rng.gen::<f64>() < p {
            1.0
        } else {
            0.0
        };
        let cond_mult = if synth.use_conditions {
            state.condition.quality_multiplier()
        } else {
            1.0
        };

        apply_action(&mut state, action, synth, p, weight, cond_mult);

        if opts.verbose {
            if let Some(log) = log.as_deref_mut() {
                write_table_row(log, &state, action);
            }
        }

        if synth.use_conditions && !opts.assume_success {
            advance_condition(&mut state, rng);
        }
    }

    state
}

/// Expected-value trace: every gain is weighted by its success probability
/// and conditions stay neutral. Pure in its inputs; this is the evaluator's
/// deterministic view of a sequence.
pub fn simulate_expected(
    sequence: &[&'static Action],
    synth: &Synth,
    verbose: bool,
    mut log: Option<&mut LogBuffer>,
) -> CraftState {
    let mut state = CraftState::from_synth(synth);

    if verbose {
        if let Some(log) = log.as_deref_mut() {
            write_table_header(log);
        }
    }

    for &action in sequence {
        if state.craft_over(synth) {
            state.wasted_actions += 1;
            continue;
        }

        let p = state.success_probability(action);
        apply_action(&mut state, action, synth, p, p, 1.0);

        if verbose {
            if let Some(log) = log.as_deref_mut() {
                write_table_row(log, &state, action);
            }
        }
    }

    state
}

// --- Monte Carlo ---

#[derive(Debug, Clone, Copy)]
pub struct MonteCarloResult {
    pub success_percent: f64,
    pub mean_quality: f64,
}

/// Repeated stochastic simulation of one fixed sequence. A run counts as a
/// success when the progress, durability, CP and trick predicates all hold;
/// reliability is a property of the whole distribution, not of one sample.
pub fn monte_carlo(
    sequence: &[&'static Action],
    synth: &Synth,
    runs: u32,
    rng: &mut ChaCha8Rng,
    verbose: bool,
    mut log: Option<&mut LogBuffer>,
) -> MonteCarloResult {
    let runs = runs.max(1);
    let mut successes = 0u32;
    let mut quality_sum = 0.0;

    for run in 0..runs {
        let state = simulate(sequence, synth, SimOptions::default(), rng, None);
        let chk = state.check_violations(synth);
        let success = chk.progress_ok && chk.durability_ok && chk.cp_ok && chk.tricks_ok;
        if success {
            successes += 1;
        }
        quality_sum += state.quality;

        if verbose {
            if let Some(log) = log.as_deref_mut() {
                log.write(format!(
                    "Run {:>4}: progress {:>4.0}, quality {:>4.0}, {}\n",
                    run + 1,
                    state.progress,
                    state.quality,
                    if success { "completed" } else { "failed" }
                ));
            }
        }
    }

    let result = MonteCarloResult {
        success_percent: successes as f64 / runs as f64 * 100.0,
        mean_quality: quality_sum / runs as f64,
    };

    if let Some(log) = log {
        log.write(format!(
            "{} of {} runs completed the synthesis ({:.1}%)\n",
            successes, runs, result.success_percent
        ));
        log.write(format!("Mean quality: {:.1}\n", result.mean_quality));
    }

    result
}

// --- Internals ---

fn substitute_on_condition(
    state: &CraftState,
    synth: &Synth,
    planned: &'static Action,
    opts: &SimOptions,
) -> &'static Action {
    if opts.override_on_condition
        && !opts.assume_success
        && state.condition == Condition::Good
        && state.trick_uses < synth.max_tricks_uses
    {
        action_by_name("tricksOfTheTrade").unwrap_or(planned)
    } else {
        planned
    }
}

/// Executes one action against the state. `p` is the effective success
/// probability, `weight` scales uncertain gains (1.0 or 0.0 for a trace,
/// `p` itself for the expected-value view), `cond_mult` the condition's
/// quality multiplier.
fn apply_action(
    state: &mut CraftState,
    action: &'static Action,
    synth: &Synth,
    p: f64,
    weight: f64,
    cond_mult: f64,
) {
    // Availability gates; an unavailable action wastes the step at no cost.
    match action.kind {
        ActionKind::TricksOfTheTrade
            if !matches!(state.condition, Condition::Good | Condition::Excellent) =>
        {
            state.wasted_actions += 1;
            return;
        }
        ActionKind::ByregotsBlessing | ActionKind::Rumination
            if state.buffs.inner_quiet.is_none() =>
        {
            state.wasted_actions += 1;
            return;
        }
        _ => {}
    }

    let manipulation_active = state.buffs.manipulation > 0;
    let ingenuity_active = state.buffs.ingenuity > 0;
    let iq_stacks = state.buffs.inner_quiet.unwrap_or(0.0).min(10.0);

    state.step += 1;
    state.cp -= action.cp_cost;
    state.min_cp = state.min_cp.min(state.cp);
    state.reliability *= p;

    match action.kind {
        ActionKind::Synthesis => {
            state.progress +=
                synth.base_progress(ingenuity_active) * action.progress_efficiency * weight;
        }
        ActionKind::Touch => {
            let control = synth.crafter.control * (1.0 + 0.2 * iq_stacks);
            let mut gain =
                synth.base_quality(control, ingenuity_active) * action.quality_efficiency;
            gain *= cond_mult * weight;
            if state.buffs.great_strides > 0 {
                gain *= 2.0;
                state.buffs.great_strides = 0;
            }
            state.quality = (state.quality + gain).min(synth.recipe.max_quality);
            if state.buffs.inner_quiet.is_some() && weight > 0.0 {
                state.buffs.inner_quiet = Some((iq_stacks + weight).min(10.0));
            }
        }
        ActionKind::ByregotsBlessing => {
            let control = synth.crafter.control * (1.0 + 0.2 * iq_stacks);
            let mut gain = synth.base_quality(control, ingenuity_active)
                * action.quality_efficiency
                * (1.0 + 0.2 * iq_stacks);
            gain *= cond_mult * weight;
            if state.buffs.great_strides > 0 {
                gain *= 2.0;
                state.buffs.great_strides = 0;
            }
            state.quality = (state.quality + gain).min(synth.recipe.max_quality);
            state.buffs.inner_quiet = None;
        }
        ActionKind::MastersMend => {
            state.durability = (state.durability + 30).min(synth.recipe.durability);
        }
        ActionKind::SteadyHand => state.buffs.steady_hand = 6,
        ActionKind::InnerQuiet => state.buffs.inner_quiet = Some(0.0),
        ActionKind::GreatStrides => state.buffs.great_strides = 4,
        ActionKind::WasteNot => state.buffs.waste_not = 5,
        ActionKind::Manipulation => state.buffs.manipulation = 4,
        ActionKind::Ingenuity => state.buffs.ingenuity = 6,
        ActionKind::TricksOfTheTrade => {
            state.cp = (state.cp + 20).min(synth.crafter.cp);
            state.trick_uses += 1;
        }
        ActionKind::Rumination => {
            state.cp = (state.cp + (15.0 * iq_stacks) as i32).min(synth.crafter.cp);
            state.buffs.inner_quiet = None;
        }
        ActionKind::Observe => {}
    }

    // Durability loss, halved under Waste Not.
    let mut durability_cost = action.durability_cost;
    if state.buffs.waste_not > 0 && durability_cost > 0 {
        durability_cost = (durability_cost + 1) / 2;
    }
    state.durability -= durability_cost;
    state.min_durability = state.min_durability.min(state.durability);

    // Manipulation only regenerates while the craft continues, and never on
    // its own cast turn.
    if manipulation_active && state.durability > 0 && state.progress < synth.recipe.difficulty {
        state.durability = (state.durability + 10).min(synth.recipe.durability);
    }

    tick_buffs(&mut state.buffs);
}

fn tick_buffs(buffs: &mut Buffs) {
    buffs.steady_hand = buffs.steady_hand.saturating_sub(1);
    buffs.great_strides = buffs.great_strides.saturating_sub(1);
    buffs.waste_not = buffs.waste_not.saturating_sub(1);
    buffs.manipulation = buffs.manipulation.saturating_sub(1);
    buffs.ingenuity = buffs.ingenuity.saturating_sub(1);
}

fn advance_condition(state: &mut CraftState, rng: &mut ChaCha8Rng) {
    state.condition = match state.condition {
        Condition::Excellent => Condition::Poor,
        Condition::Good | Condition::Poor => Condition::Normal,
        Condition::Normal => {
            let roll: f64 = rng.gen();
            if roll < 0.04 {
                Condition::Excellent
            } else if roll < 0.27 {
                Condition::Good
            } else {
                Condition::Normal
            }
        }
    }
}

fn write_table_header(log: &mut LogBuffer) {
    log.write(format!(
        "{:>4}  {:<20} {:>5} {:>5} {:>8} {:>8}  {}\n",
        "#", "Action", "DUR", "CP", "QUAL", "PROG", "COND"
    ));
}

fn write_table_row(log: &mut LogBuffer, state: &CraftState, action: &Action) {
    log.write(format!(
        "{:>4}  {:<20} {:>5} {:>5} {:>8.0} {:>8.0}  {}\n",
        state.step,
        action.short_name,
        state.durability,
        state.cp,
        state.quality,
        state.progress,
        state.condition.code()
    ));
}
