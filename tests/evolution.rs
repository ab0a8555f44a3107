use std::sync::mpsc;
use std::sync::Arc;

use genprog::config::AppConfig;
use genprog::data::Dataset;
use genprog::engines::evaluation::AbsErrorEvaluator;
use genprog::engines::generation::{ChannelProgressCallback, EvolutionEngine, ProgressMessage};
use genprog::functions::{SymbolFactory, SymbolSet, Variable};

fn small_config(seed: u64) -> AppConfig {
    let mut config = AppConfig::default();
    config.evolution.population_size = 60;
    config.evolution.num_generations = 12;
    config.evolution.seed = Some(seed);
    config.evolution.arl = true;
    config.evolution.arl_interval = 4;
    config.representation.code_length = 30;
    config.representation.patch_length = 5;
    config.cache.bits = 12;
    config
}

fn regression_set() -> SymbolSet {
    let factory = SymbolFactory::new();
    let mut sset = SymbolSet::new();
    for name in ["FADD", "FSUB", "FMUL"] {
        factory.insert(&mut sset, name, &[0], 1.0).unwrap();
    }
    factory.insert(&mut sset, "REAL", &[0], 1.0).unwrap();
    sset.insert(Box::new(Variable::new("X", 0, 0)), 2.0).unwrap();
    sset
}

fn regression_data() -> Arc<Dataset> {
    let points: Vec<f64> = (-8..=8).map(|i| f64::from(i) / 2.0).collect();
    Arc::new(Dataset::from_fn(&points, |x| x * x + x))
}

#[test]
fn elitist_run_never_loses_its_best() {
    let (tx, rx) = mpsc::channel();
    let mut engine = EvolutionEngine::new(
        small_config(11),
        regression_set(),
        AbsErrorEvaluator::new(regression_data()),
    )
    .unwrap();

    let summary = engine.run(ChannelProgressCallback::new(tx)).unwrap();
    assert_eq!(summary.generations, 12);
    assert!(!summary.best_program.is_empty());

    let messages: Vec<ProgressMessage> = rx.try_iter().collect();
    let starts = messages
        .iter()
        .filter(|m| matches!(m, ProgressMessage::GenerationStart(_)))
        .count();
    assert_eq!(starts, 12);

    let bests: Vec<_> = messages
        .iter()
        .filter_map(|m| match m {
            ProgressMessage::GenerationComplete { best_fitness, .. } => Some(best_fitness.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(bests.len(), 12);
    for pair in bests.windows(2) {
        assert!(pair[1] >= pair[0]);
    }
    assert_eq!(bests.last(), Some(&summary.best_fitness));

    let hof = engine.get_hall_of_fame();
    assert!(!hof.is_empty());
    assert_eq!(hof.best().map(|e| &e.fitness), Some(&summary.best_fitness));

    // Every generation after the first re-evaluates the elite.
    assert!(summary.cache.hits > 0);
}

#[test]
fn same_seed_same_run() {
    let run = |seed| {
        let mut engine = EvolutionEngine::new(
            small_config(seed),
            regression_set(),
            AbsErrorEvaluator::new(regression_data()),
        )
        .unwrap();
        let (tx, _rx) = mpsc::channel();
        engine.run(ChannelProgressCallback::new(tx)).unwrap()
    };

    let a = run(5);
    let b = run(5);
    assert_eq!(a.best_program, b.best_program);
    assert_eq!(a.best_fitness, b.best_fitness);
    assert_eq!(a.learned_symbols, b.learned_symbols);
}

#[test]
fn invalid_configuration_is_rejected() {
    let mut config = small_config(1);
    config.evolution.tournament_size = 0;
    let res = EvolutionEngine::new(
        config,
        regression_set(),
        AbsErrorEvaluator::new(regression_data()),
    );
    assert!(res.is_err());
}
