use std::cmp::Ordering;

use rand::Rng;

use super::individual::{CrossoverKind, Individual};
use crate::config::RepresentationConfig;
use crate::error::Result;
use crate::functions::registry::SymbolSet;
use crate::types::Fitness;

pub(crate) fn by_fitness(a: &Fitness, b: &Fitness) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

/// Tournament selection: pick best of K random candidates
pub fn tournament_selection<R: Rng>(
    population: &[(Individual, Fitness)],
    tournament_size: usize,
    rng: &mut R,
) -> Individual {
    let mut best_idx = rng.gen_range(0..population.len());

    for _ in 1..tournament_size {
        let idx = rng.gen_range(0..population.len());
        if by_fitness(&population[idx].1, &population[best_idx].1) == Ordering::Greater {
            best_idx = idx;
        }
    }

    population[best_idx].0.clone()
}

/// Offspring of two parents of identical shape.
pub fn crossover<R: Rng>(
    parent1: &Individual,
    parent2: &Individual,
    kind: CrossoverKind,
    rng: &mut R,
) -> Individual {
    parent1.crossover(parent2, kind, rng)
}

/// Mutation: per active gene with probability `mutation_rate`. Returns the
/// number of genes changed.
pub fn mutate<R: Rng>(
    individual: &mut Individual,
    mutation_rate: f64,
    sset: &SymbolSet,
    rng: &mut R,
) -> usize {
    individual.mutation(mutation_rate, sset, rng)
}

/// Generate random population
pub fn random_population<R: Rng>(
    size: usize,
    sset: &SymbolSet,
    repr: &RepresentationConfig,
    rng: &mut R,
) -> Result<Vec<Individual>> {
    (0..size)
        .map(|_| Individual::random(sset, repr.code_length, repr.patch_length, rng))
        .collect()
}
