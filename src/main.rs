use std::sync::Arc;

use genprog::config::ConfigManager;
use genprog::data::Dataset;
use genprog::engines::evaluation::AbsErrorEvaluator;
use genprog::engines::generation::{ConsoleProgressCallback, EvolutionEngine};
use genprog::functions::{SymbolFactory, SymbolSet, Variable};

/// Symbolic regression of `x^2 + 2x + 1`.
fn main() -> anyhow::Result<()> {
    env_logger::init();

    let manager = ConfigManager::new();
    if let Some(path) = std::env::args().nth(1) {
        manager.load_from_file(&path)?;
        log::info!("Loaded configuration from {}", path);
    } else {
        manager.update(|c| {
            c.evolution.population_size = 200;
            c.evolution.num_generations = 50;
            c.evolution.max_stagnation = 20;
            c.representation.code_length = 40;
            c.representation.patch_length = 5;
        })?;
    }
    let config = manager.get();

    let mut sset = SymbolSet::new();
    let factory = SymbolFactory::new();
    for name in ["FADD", "FSUB", "FMUL", "FDIV"] {
        factory.insert(&mut sset, name, &[0], 1.0)?;
    }
    factory.insert(&mut sset, "REAL", &[0], 1.0)?;
    sset.insert(Box::new(Variable::new("X", 0, 0)), 2.0)?;

    let points: Vec<f64> = (-10..=10).map(|i| f64::from(i) / 2.0).collect();
    let data = Arc::new(Dataset::from_fn(&points, |x| x * x + 2.0 * x + 1.0));

    let mut engine = EvolutionEngine::new(config, sset, AbsErrorEvaluator::new(data))?;
    let summary = engine.run(ConsoleProgressCallback)?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
