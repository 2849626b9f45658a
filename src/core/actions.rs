use crate::core::domain::LogBuffer;

// --- Action Catalog ---

/// What an action does when it lands. Synthesis and touch actions carry
/// their efficiency in the action record; everything else is a special
/// effect handled by the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Adds progress.
    Synthesis,
    /// Adds quality.
    Touch,
    /// Quality scaled by Inner Quiet stacks, consumes them.
    ByregotsBlessing,
    /// Restores 30 durability.
    MastersMend,
    /// +20% success probability for 5 turns.
    SteadyHand,
    /// Starts quality stacking.
    InnerQuiet,
    /// Doubles the next quality gain, lasts 3 turns.
    GreatStrides,
    /// Halves durability loss for 4 turns.
    WasteNot,
    /// Restores 10 durability per turn for 3 turns.
    Manipulation,
    /// Softens the recipe level penalty for 5 turns.
    Ingenuity,
    /// Restores 20 CP; usable on a good condition only, capped per search.
    TricksOfTheTrade,
    /// Converts Inner Quiet stacks back into CP.
    Rumination,
    /// Does nothing.
    Observe,
}

/// One atomic move in the crafting simulation. `short_name` is the stable
/// display code used in configuration, reports, and catalog ordering.
#[derive(Debug, PartialEq)]
pub struct Action {
    pub short_name: &'static str,
    pub full_name: &'static str,
    pub durability_cost: i32,
    pub cp_cost: i32,
    pub success_probability: f64,
    /// Multiplier on the base progress gain (synthesis actions).
    pub progress_efficiency: f64,
    /// Multiplier on the base quality gain (touch actions).
    pub quality_efficiency: f64,
    pub kind: ActionKind,
}

macro_rules! action {
    ($short:literal, $full:literal, dur: $dur:literal, cp: $cp:literal, p: $p:literal, prog: $prog:literal, qual: $qual:literal, $kind:ident) => {
        Action {
            short_name: $short,
            full_name: $full,
            durability_cost: $dur,
            cp_cost: $cp,
            success_probability: $p,
            progress_efficiency: $prog,
            quality_efficiency: $qual,
            kind: ActionKind::$kind,
        }
    };
}

/// Every action the simulator understands. Configuration entries not in
/// this table are unsupported.
pub static ALL_ACTIONS: &[Action] = &[
    action!("basicSynth", "Basic Synthesis", dur: 10, cp: 0, p: 0.90, prog: 1.0, qual: 0.0, Synthesis),
    action!("basicTouch", "Basic Touch", dur: 10, cp: 18, p: 0.70, prog: 0.0, qual: 1.0, Touch),
    action!("byregotsBlessing", "Byregot's Blessing", dur: 10, cp: 24, p: 0.90, prog: 0.0, qual: 1.0, ByregotsBlessing),
    action!("carefulSynthesis", "Careful Synthesis", dur: 10, cp: 0, p: 1.0, prog: 0.9, qual: 0.0, Synthesis),
    action!("greatStrides", "Great Strides", dur: 0, cp: 32, p: 1.0, prog: 0.0, qual: 0.0, GreatStrides),
    action!("hastyTouch", "Hasty Touch", dur: 10, cp: 0, p: 0.50, prog: 0.0, qual: 1.0, Touch),
    action!("ingenuity", "Ingenuity", dur: 0, cp: 24, p: 1.0, prog: 0.0, qual: 0.0, Ingenuity),
    action!("innerQuiet", "Inner Quiet", dur: 0, cp: 18, p: 1.0, prog: 0.0, qual: 0.0, InnerQuiet),
    action!("manipulation", "Manipulation", dur: 0, cp: 88, p: 1.0, prog: 0.0, qual: 0.0, Manipulation),
    action!("mastersMend", "Master's Mend", dur: 0, cp: 92, p: 1.0, prog: 0.0, qual: 0.0, MastersMend),
    action!("observe", "Observe", dur: 0, cp: 7, p: 1.0, prog: 0.0, qual: 0.0, Observe),
    action!("rapidSynthesis", "Rapid Synthesis", dur: 10, cp: 0, p: 0.50, prog: 2.5, qual: 0.0, Synthesis),
    action!("rumination", "Rumination", dur: 0, cp: 0, p: 1.0, prog: 0.0, qual: 0.0, Rumination),
    action!("standardTouch", "Standard Touch", dur: 10, cp: 32, p: 0.80, prog: 0.0, qual: 1.25, Touch),
    action!("steadyHand", "Steady Hand", dur: 0, cp: 22, p: 1.0, prog: 0.0, qual: 0.0, SteadyHand),
    action!("tricksOfTheTrade", "Tricks of the Trade", dur: 0, cp: 0, p: 1.0, prog: 0.0, qual: 0.0, TricksOfTheTrade),
    action!("wasteNot", "Waste Not", dur: 0, cp: 56, p: 1.0, prog: 0.0, qual: 0.0, WasteNot),
];

pub fn action_by_name(name: &str) -> Option<&'static Action> {
    ALL_ACTIONS.iter().find(|a| a.short_name == name)
}

// --- Resolver ---

/// Validates requested action names against the catalog. Unknown entries
/// are dropped after a warning, never fatal. The result is sorted by short
/// display code so downstream tie-breaking is seed-independent.
pub fn resolve_actions(names: &[String], log: &mut LogBuffer) -> Vec<&'static Action> {
    let mut resolved = Vec::with_capacity(names.len());

    for name in names {
        match action_by_name(name) {
            Some(action) => resolved.push(action),
            None => {
                log::warn!("unsupported action in configuration: {}", name);
                log.write(format!("Action is unsupported: {}\n", name));
            }
        }
    }

    resolved.sort_by(|a, b| a.short_name.cmp(b.short_name));
    resolved
}
