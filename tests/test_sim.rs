use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use craftopt::core::actions::{action_by_name, Action};
use craftopt::core::domain::{Condition, LogBuffer};
use craftopt::engine::evaluator;
use craftopt::engine::sim::{self, SimOptions};

mod common;

fn seq(names: &[&str]) -> Vec<&'static Action> {
    names
        .iter()
        .map(|n| action_by_name(n).expect("unknown action in test sequence"))
        .collect()
}

fn deterministic_opts() -> SimOptions {
    SimOptions {
        assume_success: true,
        ..Default::default()
    }
}

#[test]
fn test_deterministic_trace_is_repeatable() {
    let synth = common::test_synth();
    let sequence = seq(&["innerQuiet", "basicTouch", "basicTouch", "basicSynth", "basicSynth"]);
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    let first = sim::simulate(&sequence, &synth, deterministic_opts(), &mut rng, None);
    let second = sim::simulate(&sequence, &synth, deterministic_opts(), &mut rng, None);

    assert_eq!(first, second);
}

#[test]
fn test_two_synthesis_steps_complete_the_test_recipe() {
    let synth = common::test_synth();
    let mut rng = ChaCha8Rng::seed_from_u64(0);

    let state = sim::simulate(
        &seq(&["basicSynth", "basicSynth"]),
        &synth,
        deterministic_opts(),
        &mut rng,
        None,
    );
    let chk = state.check_violations(&synth);

    assert!(chk.progress_ok, "progress {} too low", state.progress);
    assert!(chk.durability_ok);
    assert!(chk.cp_ok);
}

#[test]
fn test_cp_overdraft_is_flagged() {
    let synth = common::test_synth();
    let mut rng = ChaCha8Rng::seed_from_u64(0);

    // Three mends cost 276 CP against a pool of 250.
    let state = sim::simulate(
        &seq(&["mastersMend", "mastersMend", "mastersMend"]),
        &synth,
        deterministic_opts(),
        &mut rng,
        None,
    );
    let chk = state.check_violations(&synth);

    assert!(state.min_cp < 0);
    assert!(!chk.cp_ok);
    assert!(chk.durability_ok);
}

#[test]
fn test_durability_overdraft_is_flagged() {
    let mut settings = common::test_settings();
    settings.recipe.durability = 55;
    let synth = common::synth_from(&settings);
    let mut rng = ChaCha8Rng::seed_from_u64(0);

    let state = sim::simulate(
        &seq(&["basicTouch"; 6]),
        &synth,
        deterministic_opts(),
        &mut rng,
        None,
    );
    let chk = state.check_violations(&synth);

    assert_eq!(state.min_durability, -5);
    assert!(!chk.durability_ok);
}

#[test]
fn test_masters_mend_restores_durability_up_to_cap() {
    let synth = common::test_synth();
    let mut rng = ChaCha8Rng::seed_from_u64(0);

    let state = sim::simulate(
        &seq(&["basicTouch", "mastersMend"]),
        &synth,
        deterministic_opts(),
        &mut rng,
        None,
    );

    assert_eq!(state.durability, synth.recipe.durability);
}

#[test]
fn test_tricks_wasted_without_good_condition() {
    // Conditions are off, so the condition never leaves Normal and Tricks
    // of the Trade can never fire.
    let mut settings = common::test_settings();
    settings.crafter.actions.push("tricksOfTheTrade".to_string());
    settings.max_tricks_uses = 2;
    let synth = common::synth_from(&settings);
    let mut rng = ChaCha8Rng::seed_from_u64(0);

    let state = sim::simulate(
        &seq(&["tricksOfTheTrade"]),
        &synth,
        deterministic_opts(),
        &mut rng,
        None,
    );

    assert_eq!(state.trick_uses, 0);
    assert_eq!(state.wasted_actions, 1);
    assert_eq!(state.cp, synth.crafter.cp);
}

#[test]
fn test_actions_after_completion_are_wasted() {
    let synth = common::test_synth();
    let state = sim::simulate_expected(
        &seq(&["basicSynth", "basicSynth", "basicTouch"]),
        &synth,
        false,
        None,
    );

    assert!(state.progress >= synth.recipe.difficulty);
    assert_eq!(state.wasted_actions, 1);
}

#[test]
fn test_expected_trace_is_pure() {
    let synth = common::test_synth();
    let sequence = seq(&["innerQuiet", "steadyHand", "hastyTouch", "basicSynth", "basicSynth"]);

    let first = sim::simulate_expected(&sequence, &synth, false, None);
    let second = sim::simulate_expected(&sequence, &synth, false, None);

    assert_eq!(first, second);
}

#[test]
fn test_reliability_tracks_success_probabilities() {
    let synth = common::test_synth();
    let mut rng = ChaCha8Rng::seed_from_u64(0);

    // Two basic synths at 0.9 each: reliability 0.81.
    let state = sim::simulate(
        &seq(&["basicSynth", "basicSynth"]),
        &synth,
        deterministic_opts(),
        &mut rng,
        None,
    );

    assert!((state.reliability - 0.81).abs() < 1e-9);
}

#[test]
fn test_assume_success_draws_no_randomness_with_conditions_on() {
    let mut settings = common::test_settings();
    settings.use_conditions = true;
    let synth = common::synth_from(&settings);

    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let mut untouched = rng.clone();

    let state = sim::simulate(
        &seq(&["basicTouch", "basicTouch", "basicSynth", "basicSynth"]),
        &synth,
        deterministic_opts(),
        &mut rng,
        None,
    );

    assert_eq!(state.condition, Condition::Normal);
    assert_eq!(rng.gen::<u64>(), untouched.gen::<u64>());
}

#[test]
fn test_monte_carlo_verbose_logs_each_run() {
    let synth = common::test_synth();
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let mut log = LogBuffer::new();

    sim::monte_carlo(
        &seq(&["carefulSynthesis", "carefulSynthesis"]),
        &synth,
        8,
        &mut rng,
        true,
        Some(&mut log),
    );

    let run_lines = log.text().lines().filter(|l| l.starts_with("Run")).count();
    assert_eq!(run_lines, 8);
    assert!(log.text().contains("8 of 8 runs completed the synthesis"));
}

#[test]
fn test_monte_carlo_success_percent_bounds() {
    let synth = common::test_synth();
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    let good = sim::monte_carlo(
        &seq(&["carefulSynthesis", "carefulSynthesis"]),
        &synth,
        50,
        &mut rng,
        false,
        None,
    );
    assert!((0.0..=100.0).contains(&good.success_percent));
    // Careful Synthesis never misses; every run completes.
    assert_eq!(good.success_percent, 100.0);

    let empty = sim::monte_carlo(&[], &synth, 50, &mut rng, false, None);
    assert_eq!(empty.success_percent, 0.0);
}

#[test]
fn test_hq_curve_is_monotonic() {
    assert_eq!(evaluator::hq_percent_from_quality(0.0), 1);
    assert_eq!(evaluator::hq_percent_from_quality(100.0), 100);

    let mut last = 0;
    for q in 0..=100 {
        let hq = evaluator::hq_percent_from_quality(q as f64);
        assert!(hq >= last, "curve dipped at {}%", q);
        last = hq;
    }
}

#[test]
fn test_evaluator_prefers_completing_sequences() {
    let settings = common::test_settings();
    let synth = common::test_synth();

    let complete = evaluator::evaluate_sequence(
        &seq(&["basicSynth", "basicSynth"]),
        &synth,
        settings.solver.penalty_weight,
    );
    let incomplete = evaluator::evaluate_sequence(
        &seq(&["basicTouch"]),
        &synth,
        settings.solver.penalty_weight,
    );

    assert!(complete > incomplete, "{:?} vs {:?}", complete, incomplete);
}
