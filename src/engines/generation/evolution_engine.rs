use chrono::{DateTime, Utc};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::AppConfig;
use crate::engines::evaluation::evaluator::Evaluator;
use crate::engines::evaluation::proxy::{CacheStats, EvaluatorProxy};
use crate::engines::generation::{
    arl::Arl,
    hall_of_fame::HallOfFame,
    individual::Individual,
    operators::{by_fitness, crossover, mutate, random_population, tournament_selection},
};
use crate::error::{GpError, Result};
use crate::functions::registry::SymbolSet;
use crate::types::Fitness;

const HALL_OF_FAME_SIZE: usize = 10;

pub trait ProgressCallback: Send {
    fn on_generation_start(&mut self, generation: usize);
    fn on_generation_complete(&mut self, generation: usize, best_fitness: &Fitness, hall_of_fame_size: usize);
    fn on_population_evaluated(&mut self, evaluated: usize, cache: CacheStats);
    fn on_symbols_learned(&mut self, names: &[String]);
}

/// Outcome of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionSummary {
    pub best_program: String,
    pub best_fitness: Fitness,
    pub accuracy: Option<f64>,
    pub generations: usize,
    pub learned_symbols: Vec<String>,
    pub cache: CacheStats,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

pub struct EvolutionEngine<E: Evaluator> {
    config: AppConfig,
    sset: SymbolSet,
    proxy: EvaluatorProxy<E>,
    hall_of_fame: HallOfFame,
    arl: Arl,
    rng: StdRng,
}

impl<E: Evaluator> EvolutionEngine<E> {
    pub fn new(config: AppConfig, sset: SymbolSet, evaluator: E) -> Result<Self> {
        config.validate()?;
        if !sset.check() {
            return Err(GpError::Generation(
                "the symbol set can't generate well formed programs".to_string(),
            ));
        }

        let rng = match config.evolution.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let proxy = EvaluatorProxy::new(evaluator, config.cache.bits)?
            .with_verify_hits(config.cache.verify_hits);

        Ok(Self {
            arl: Arl::new(config.evolution.adf_args),
            config,
            sset,
            proxy,
            hall_of_fame: HallOfFame::new(HALL_OF_FAME_SIZE),
            rng,
        })
    }

    /// Run the evolution process
    pub fn run<C: ProgressCallback>(&mut self, mut callback: C) -> Result<EvolutionSummary> {
        let started_at = Utc::now();
        let timer = Instant::now();
        let evo = self.config.evolution.clone();

        let mut population = random_population(
            evo.population_size,
            &self.sset,
            &self.config.representation,
            &mut self.rng,
        )?;

        let mut best: Option<(Individual, Fitness)> = None;
        let mut last_improvement = 0;
        let mut generations = 0;
        let mut learned_symbols = Vec::new();

        for generation in 0..evo.num_generations {
            callback.on_generation_start(generation);

            let fitness = self.proxy.evaluate_all(&population, &self.sset);
            callback.on_population_evaluated(population.len(), self.proxy.info());

            let evaluated: Vec<(Individual, Fitness)> = population.into_iter().zip(fitness).collect();

            for (ind, f) in &evaluated {
                self.hall_of_fame.try_add(ind, f, generation);
            }

            let Some(gen_best) = evaluated.iter().max_by(|a, b| by_fitness(&a.1, &b.1)) else {
                return Err(GpError::Generation("empty population".to_string()));
            };
            let improved = best
                .as_ref()
                .map_or(true, |(_, f)| by_fitness(&gen_best.1, f).is_gt());
            if improved {
                best = Some(gen_best.clone());
                last_improvement = generation;
            }

            callback.on_generation_complete(generation, &gen_best.1, self.hall_of_fame.len());
            generations = generation + 1;

            if evo.max_stagnation > 0 && generation - last_improvement >= evo.max_stagnation {
                info!("Stopping after {} generations without improvement", evo.max_stagnation);
                break;
            }

            // Check termination
            if generation + 1 == evo.num_generations {
                break;
            }

            if evo.arl && generations % evo.arl_interval == 0 {
                if let Some((best_ind, _)) = &best {
                    let names = self.learn(best_ind)?;
                    if !names.is_empty() {
                        callback.on_symbols_learned(&names);
                        learned_symbols.extend(names);
                    }
                }
            }

            population = self.create_next_generation(&evaluated);
        }

        let (best_ind, best_fitness) = best.ok_or_else(|| {
            GpError::Generation("no individual has been evaluated".to_string())
        })?;

        Ok(EvolutionSummary {
            best_program: best_ind.in_line(&self.sset).to_string(),
            accuracy: self.proxy.accuracy(&best_ind, &self.sset),
            best_fitness,
            generations,
            learned_symbols,
            cache: self.proxy.info(),
            started_at,
            elapsed_ms: timer.elapsed().as_millis() as u64,
        })
    }

    fn learn(&mut self, best: &Individual) -> Result<Vec<String>> {
        self.sset.scale_adf_weights();

        let added = self
            .arl
            .run(best, &mut self.sset, &mut self.proxy, &mut self.rng)?;

        let names = added
            .iter()
            .filter_map(|&op| self.sset.decode(op).map(|s| s.name().to_string()))
            .collect();
        if !self.sset.check() {
            warn!("Symbol set inconsistent after learning");
        }
        Ok(names)
    }

    fn create_next_generation(&mut self, evaluated: &[(Individual, Fitness)]) -> Vec<Individual> {
        let evo = &self.config.evolution;
        let kind = self.config.representation.crossover;
        let mut next_generation = Vec::with_capacity(evo.population_size);

        // Elitism: copy top performers
        let mut sorted: Vec<&(Individual, Fitness)> = evaluated.iter().collect();
        sorted.sort_by(|a, b| by_fitness(&b.1, &a.1));
        next_generation.extend(sorted.iter().take(evo.elitism_count).map(|(ind, _)| ind.clone()));

        // Generate offspring
        while next_generation.len() < evo.population_size {
            let mut child = if self.rng.gen::<f64>() < evo.crossover_rate {
                let parent1 = tournament_selection(evaluated, evo.tournament_size, &mut self.rng);
                let parent2 = tournament_selection(evaluated, evo.tournament_size, &mut self.rng);
                crossover(&parent1, &parent2, kind, &mut self.rng)
            } else {
                // Reproduction (copy)
                tournament_selection(evaluated, evo.tournament_size, &mut self.rng)
            };

            mutate(&mut child, evo.mutation_rate, &self.sset, &mut self.rng);
            next_generation.push(child);
        }

        for ind in next_generation.iter_mut() {
            ind.inc_age();
        }
        next_generation
    }

    pub fn get_hall_of_fame(&self) -> &HallOfFame {
        &self.hall_of_fame
    }

    pub fn symbols(&self) -> &SymbolSet {
        &self.sset
    }

    pub fn proxy(&self) -> &EvaluatorProxy<E> {
        &self.proxy
    }
}
