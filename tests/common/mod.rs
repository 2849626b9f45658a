#![allow(dead_code)]

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use craftopt::core::actions::resolve_actions;
use craftopt::core::domain::{
    CrafterSettings, LogBuffer, RecipeSettings, Settings, SolverSettings,
};
use craftopt::engine::sim::{Crafter, Recipe, Synth};
use craftopt::solvers::Toolbox;

pub fn basic_actions() -> Vec<String> {
    [
        "basicSynth",
        "basicTouch",
        "byregotsBlessing",
        "carefulSynthesis",
        "greatStrides",
        "hastyTouch",
        "innerQuiet",
        "mastersMend",
        "steadyHand",
        "wasteNot",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// A low-level recipe the basic action set can comfortably solve.
pub fn test_settings() -> Settings {
    Settings {
        seed: Some(42),
        crafter: CrafterSettings {
            level: 16,
            craftsmanship: 136.0,
            control: 110.0,
            cp: 250,
            actions: basic_actions(),
            recipe_class: "Weaver".to_string(),
        },
        recipe: RecipeSettings {
            level: 12,
            difficulty: 55.0,
            durability: 60,
            start_quality: 0.0,
            max_quality: 512.0,
        },
        max_tricks_uses: 0,
        reliability_percent: 60.0,
        use_conditions: false,
        sequence: Vec::new(),
        solver: SolverSettings {
            population: 20,
            generations: 5,
            penalty_weight: 10000.0,
        },
        algorithm: "eaSimple".to_string(),
        max_montecarlo_runs: 40,
        override_on_condition: false,
        debug: false,
    }
}

pub fn synth_from(settings: &Settings) -> Synth {
    let mut log = LogBuffer::new();
    let actions = resolve_actions(&settings.crafter.actions, &mut log);
    Synth::new(
        Crafter::new(&settings.crafter, actions),
        Recipe::from(&settings.recipe),
        settings.max_tricks_uses,
        settings.reliability_percent / 100.0,
        settings.use_conditions,
    )
}

pub fn test_synth() -> Synth {
    synth_from(&test_settings())
}

pub fn test_toolbox(seed: u64) -> Toolbox {
    let settings = test_settings();
    let synth = synth_from(&settings);
    let actions = synth.crafter.actions.clone();
    Toolbox::new(
        actions,
        50,
        synth,
        settings.solver.penalty_weight,
        ChaCha8Rng::seed_from_u64(seed),
    )
}
