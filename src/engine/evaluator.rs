use crate::core::actions::Action;
use crate::engine::sim::{self, Synth};

/// Scores one candidate sequence as a two-component maximize/maximize
/// fitness vector.
///
/// The first objective is quality minus the weighted sum of constraint
/// shortfalls (progress deficit, durability and CP overdrafts, excess
/// trick uses, reliability shortfall, and a small wasted-action term); the
/// second is progress capped at the recipe difficulty, so a sequence that
/// finishes the craft always dominates one that does not at equal quality
/// score. Uses the expected-value trace, so the result is a pure function
/// of its inputs.
pub fn evaluate_sequence(
    sequence: &[&'static Action],
    synth: &Synth,
    penalty_weight: f64,
) -> (f64, f64) {
    let state = sim::simulate_expected(sequence, synth, false, None);
    let chk = state.check_violations(synth);
    let difficulty = synth.recipe.difficulty;

    let mut penalties = state.wasted_actions as f64 / 20.0;
    if !chk.progress_ok {
        penalties += difficulty - state.progress.min(difficulty);
    }
    if !chk.durability_ok {
        penalties += (-state.min_durability) as f64;
    }
    if !chk.cp_ok {
        penalties += (-state.min_cp) as f64;
    }
    if !chk.tricks_ok {
        penalties += (state.trick_uses - synth.max_tricks_uses) as f64;
    }
    if !chk.reliability_ok {
        penalties += (synth.reliability_index - state.reliability) * 100.0;
    }

    let fitness = state.quality - penalty_weight * penalties;
    (fitness, state.progress.min(difficulty))
}

// Quality% -> HQ% breakpoints, linearly interpolated between entries.
const HQ_CURVE: &[(f64, f64)] = &[
    (0.0, 1.0),
    (5.0, 2.0),
    (10.0, 3.0),
    (20.0, 5.0),
    (30.0, 7.0),
    (40.0, 10.0),
    (50.0, 14.0),
    (55.0, 18.0),
    (60.0, 22.0),
    (65.0, 27.0),
    (70.0, 32.0),
    (75.0, 38.0),
    (80.0, 46.0),
    (85.0, 56.0),
    (90.0, 68.0),
    (95.0, 83.0),
    (98.0, 92.0),
    (100.0, 100.0),
];

/// HQ-probability percentage from a final-quality percentage. Fixed
/// monotonic lookup curve.
pub fn hq_percent_from_quality(quality_percent: f64) -> u32 {
    let q = quality_percent.clamp(0.0, 100.0);

    for window in HQ_CURVE.windows(2) {
        let (x0, y0) = window[0];
        let (x1, y1) = window[1];
        if q <= x1 {
            let t = (q - x0) / (x1 - x0);
            return (y0 + t * (y1 - y0)).round() as u32;
        }
    }

    100
}
