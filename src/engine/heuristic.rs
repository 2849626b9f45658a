use rand_chacha::ChaCha8Rng;

use crate::core::actions::Action;
use crate::core::domain::LogBuffer;
use crate::engine::sim::{self, SimOptions, Synth};

/// Builds a default starting sequence from the context alone: opener buffs,
/// quality filler under the CP and durability budget (with one mend when it
/// pays for itself), then enough synthesis steps to complete the craft.
/// Deterministic in the context.
pub fn heuristic_sequence_builder(synth: &Synth) -> Vec<&'static Action> {
    let find = |name: &str| {
        synth
            .crafter
            .actions
            .iter()
            .copied()
            .find(|a| a.short_name == name)
    };

    let mut sequence: Vec<&'static Action> = Vec::new();
    let mut cp = synth.crafter.cp;
    let mut durability = synth.recipe.durability;

    for name in ["innerQuiet", "steadyHand"] {
        if let Some(action) = find(name) {
            if cp >= action.cp_cost {
                sequence.push(action);
                cp -= action.cp_cost;
            }
        }
    }

    let Some(progress_action) = ["carefulSynthesis", "basicSynth", "rapidSynthesis"]
        .iter()
        .find_map(|n| find(n))
    else {
        return sequence;
    };

    let progress_gain = synth.base_progress(false) * progress_action.progress_efficiency;
    let progress_steps = if progress_gain > 0.0 {
        (synth.recipe.difficulty / progress_gain).ceil().max(1.0) as i32
    } else {
        1
    };
    let reserve = progress_steps * progress_action.durability_cost;

    let touch = ["basicTouch", "hastyTouch", "standardTouch"]
        .iter()
        .find_map(|n| find(n));
    let mend = find("mastersMend");

    if let Some(touch) = touch {
        let mut mended = false;
        loop {
            if durability - reserve >= touch.durability_cost && cp >= touch.cp_cost {
                sequence.push(touch);
                cp -= touch.cp_cost;
                durability -= touch.durability_cost;
            } else if !mended {
                mended = true;
                if let Some(mend) = mend {
                    if cp >= mend.cp_cost && durability < synth.recipe.durability {
                        sequence.push(mend);
                        cp -= mend.cp_cost;
                        durability = (durability + 30).min(synth.recipe.durability);
                        continue;
                    }
                }
                break;
            } else {
                break;
            }
        }
    }

    if sequence.iter().any(|a| a.short_name == "innerQuiet") {
        if let Some(blessing) = find("byregotsBlessing") {
            if cp >= blessing.cp_cost && durability - reserve >= blessing.durability_cost {
                sequence.push(blessing);
            }
        }
    }

    for _ in 0..progress_steps {
        sequence.push(progress_action);
    }

    sequence
}

/// Builds the heuristic seed and validates it with one deterministic trace,
/// logging the sequence and all five feasibility outcomes. Infeasibility is
/// informational only; the sequence is used as a seed regardless.
pub fn build_and_log(
    synth: &Synth,
    rng: &mut ChaCha8Rng,
    log: &mut LogBuffer,
) -> Vec<&'static Action> {
    let sequence = heuristic_sequence_builder(synth);

    log.write("No initial sequence provided; seeding with the following heuristic sequence:\n\n");
    let names: Vec<&str> = sequence.iter().map(|a| a.full_name).collect();
    log.write(names.join(" | "));
    log.write("\n\n");

    let opts = SimOptions {
        assume_success: true,
        ..Default::default()
    };
    let state = sim::simulate(&sequence, synth, opts, rng, None);
    let chk = state.check_violations(synth);

    log.write("Heuristic sequence feasibility:\n");
    log.write(format!(
        "Progress: {}, Durability: {}, CP: {}, Tricks: {}, Reliability: {}\n\n",
        chk.progress_ok, chk.durability_ok, chk.cp_ok, chk.tricks_ok, chk.reliability_ok
    ));

    sequence
}
