use log::info;

use super::evolution_engine::ProgressCallback;
use crate::engines::evaluation::proxy::CacheStats;
use crate::types::Fitness;

pub struct ConsoleProgressCallback;

impl ProgressCallback for ConsoleProgressCallback {
    fn on_generation_start(&mut self, generation: usize) {
        info!("Generation {} starting...", generation + 1);
    }

    fn on_generation_complete(&mut self, generation: usize, best_fitness: &Fitness, hof_size: usize) {
        info!(
            "Generation {} complete. Best fitness: {}, Hall of Fame size: {}",
            generation + 1,
            best_fitness,
            hof_size
        );
    }

    fn on_population_evaluated(&mut self, evaluated: usize, cache: CacheStats) {
        info!(
            "  Evaluated {} individuals (cache hit rate {:.1}%)",
            evaluated,
            100.0 * cache.hit_rate()
        );
    }

    fn on_symbols_learned(&mut self, names: &[String]) {
        info!("  Learned {}", names.join(", "));
    }
}

/// Forwards progress events through a channel (e.g. to a monitoring
/// thread).
pub struct ChannelProgressCallback {
    sender: std::sync::mpsc::Sender<ProgressMessage>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressMessage {
    GenerationStart(usize),
    GenerationComplete { generation: usize, best_fitness: Fitness, hof_size: usize },
    PopulationEvaluated { evaluated: usize, cache: CacheStats },
    SymbolsLearned(Vec<String>),
}

impl ChannelProgressCallback {
    pub fn new(sender: std::sync::mpsc::Sender<ProgressMessage>) -> Self {
        Self { sender }
    }
}

impl ProgressCallback for ChannelProgressCallback {
    fn on_generation_start(&mut self, generation: usize) {
        let _ = self.sender.send(ProgressMessage::GenerationStart(generation));
    }

    fn on_generation_complete(&mut self, generation: usize, best_fitness: &Fitness, hof_size: usize) {
        let _ = self.sender.send(ProgressMessage::GenerationComplete {
            generation,
            best_fitness: best_fitness.clone(),
            hof_size,
        });
    }

    fn on_population_evaluated(&mut self, evaluated: usize, cache: CacheStats) {
        let _ = self
            .sender
            .send(ProgressMessage::PopulationEvaluated { evaluated, cache });
    }

    fn on_symbols_learned(&mut self, names: &[String]) {
        let _ = self.sender.send(ProgressMessage::SymbolsLearned(names.to_vec()));
    }
}
