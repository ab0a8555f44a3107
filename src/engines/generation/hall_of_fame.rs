use std::collections::HashSet;

use super::individual::Individual;
use super::operators::by_fitness;
use crate::types::Fitness;
use crate::utils::Signature;

#[derive(Clone, Debug)]
pub struct EliteIndividual {
    pub individual: Individual,
    pub fitness: Fitness,
    pub signature: Signature, // For deduplication
    pub generation: usize,
}

/// Best distinct individuals seen during a run, sorted by decreasing
/// fitness.
pub struct HallOfFame {
    individuals: Vec<EliteIndividual>,
    max_size: usize,
    seen_signatures: HashSet<Signature>,
}

impl HallOfFame {
    pub fn new(max_size: usize) -> Self {
        Self {
            individuals: Vec::new(),
            max_size,
            seen_signatures: HashSet::new(),
        }
    }

    /// Attempt to add an individual to the Hall of Fame
    pub fn try_add(&mut self, individual: &Individual, fitness: &Fitness, generation: usize) -> bool {
        let signature = individual.signature();
        if self.seen_signatures.contains(&signature) {
            return false; // Duplicate, reject
        }

        // Full and not better than the worst: skip the clone.
        if self.individuals.len() >= self.max_size {
            match self.individuals.last() {
                Some(worst) if by_fitness(fitness, &worst.fitness).is_gt() => {}
                _ => return false,
            }
        }

        self.individuals.push(EliteIndividual {
            individual: individual.clone(),
            fitness: fitness.clone(),
            signature,
            generation,
        });
        self.seen_signatures.insert(signature);
        self.sort_and_trim();
        true
    }

    fn sort_and_trim(&mut self) {
        // Sort by fitness (descending)
        self.individuals.sort_by(|a, b| by_fitness(&b.fitness, &a.fitness));

        while self.individuals.len() > self.max_size {
            if let Some(removed) = self.individuals.pop() {
                self.seen_signatures.remove(&removed.signature);
            }
        }
    }

    pub fn best(&self) -> Option<&EliteIndividual> {
        self.individuals.first()
    }

    pub fn get_all(&self) -> &[EliteIndividual] {
        &self.individuals
    }

    /// Get top N individuals
    pub fn get_top_n(&self, n: usize) -> &[EliteIndividual] {
        &self.individuals[..n.min(self.individuals.len())]
    }

    /// Filter by minimum fitness threshold
    pub fn filter_by_threshold(&self, min_fitness: f64) -> Vec<EliteIndividual> {
        self.individuals
            .iter()
            .filter(|e| e.fitness.main() >= min_fitness)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::primitives::Add;
    use crate::functions::registry::SymbolSet;
    use crate::functions::terminals::Number;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn population(n: usize) -> Vec<Individual> {
        let mut sset = SymbolSet::new();
        sset.insert(Box::new(Add::new(0)), 1.0).unwrap();
        sset.insert(Box::new(Number::new(0, 0.0, 1000.0)), 1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(10);
        (0..n)
            .map(|_| Individual::random(&sset, 8, 2, &mut rng).unwrap())
            .collect()
    }

    #[test]
    fn test_duplicates_are_rejected() {
        let pop = population(1);
        let mut hof = HallOfFame::new(5);
        assert!(hof.try_add(&pop[0], &Fitness::from(1.0), 0));
        assert!(!hof.try_add(&pop[0], &Fitness::from(2.0), 1));
        assert_eq!(hof.len(), 1);
    }

    #[test]
    fn test_keeps_the_best_sorted() {
        let pop = population(10);
        let mut hof = HallOfFame::new(3);
        for (i, ind) in pop.iter().enumerate() {
            hof.try_add(ind, &Fitness::from(i as f64), 0);
        }

        assert_eq!(hof.len(), 3);
        let fits: Vec<f64> = hof.get_all().iter().map(|e| e.fitness.main()).collect();
        assert_eq!(fits, vec![9.0, 8.0, 7.0]);
        assert_eq!(hof.best().unwrap().signature, pop[9].signature());
        assert_eq!(hof.filter_by_threshold(8.0).len(), 2);
        assert_eq!(hof.get_top_n(10).len(), 3);
    }
}
