use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::evaluator::Evaluator;
use crate::data::TranspositionTable;
use crate::engines::generation::individual::Individual;
use crate::error::Result;
use crate::functions::registry::SymbolSet;
use crate::types::Fitness;
use crate::utils::Signature;

/// Cache usage counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub probes: u64,
    pub hits: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        if self.probes == 0 {
            0.0
        } else {
            self.hits as f64 / self.probes as f64
        }
    }
}

/// Evaluator front end memoizing fitness by individual signature.
pub struct EvaluatorProxy<E: Evaluator> {
    eva: E,
    cache: TranspositionTable,
    verify_hits: bool,
}

impl<E: Evaluator> EvaluatorProxy<E> {
    /// `bits` is the cache size exponent (`2^bits` slots).
    pub fn new(eva: E, bits: u32) -> Result<Self> {
        Ok(Self {
            eva,
            cache: TranspositionTable::new(bits)?,
            verify_hits: false,
        })
    }

    /// In debug builds, recompute the fitness of every cache hit and report
    /// signature collisions.
    pub fn with_verify_hits(mut self, verify: bool) -> Self {
        self.verify_hits = verify;
        self
    }

    pub fn evaluator(&self) -> &E {
        &self.eva
    }

    pub fn cache(&self) -> &TranspositionTable {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut TranspositionTable {
        &mut self.cache
    }

    fn verify(&self, prg: &Individual, sset: &SymbolSet, cached: &Fitness) {
        if cfg!(debug_assertions) && self.verify_hits {
            let real = self.eva.evaluate(prg, sset);
            if real != *cached {
                warn!(
                    "Signature collision on {}: cached {} vs real {}",
                    prg.signature(),
                    cached,
                    real
                );
            }
        }
    }

    pub fn evaluate(&mut self, prg: &Individual, sset: &SymbolSet) -> Fitness {
        let h = prg.signature();

        if let Some(f) = self.cache.find(&h) {
            self.verify(prg, sset, &f);
            return f;
        }

        let f = self.eva.evaluate(prg, sset);
        self.cache.insert(h, f.clone());
        f
    }

    /// Evaluates a whole population. Cache misses are computed in parallel;
    /// lookups and inserts happen on the calling thread.
    pub fn evaluate_all(&mut self, population: &[Individual], sset: &SymbolSet) -> Vec<Fitness> {
        let mut fitness: Vec<Option<Fitness>> = Vec::with_capacity(population.len());
        for prg in population {
            let cached = self.cache.find(&prg.signature());
            if let Some(f) = &cached {
                self.verify(prg, sset, f);
            }
            fitness.push(cached);
        }

        // Copies of the same program are evaluated once.
        let mut misses: HashMap<Signature, Vec<usize>> = HashMap::new();
        let mut order = Vec::new();
        for (i, prg) in population.iter().enumerate() {
            if fitness[i].is_none() {
                let h = prg.signature();
                let copies = misses.entry(h).or_default();
                if copies.is_empty() {
                    order.push(h);
                }
                copies.push(i);
            }
        }

        let eva = &self.eva;
        let computed: Vec<(Signature, Fitness)> = order
            .par_iter()
            .map(|h| {
                let first = misses[h][0];
                (*h, eva.evaluate(&population[first], sset))
            })
            .collect();

        debug!(
            "Evaluated {} individuals ({} distinct misses)",
            population.len(),
            computed.len()
        );

        for (h, f) in computed {
            for &i in &misses[&h] {
                fitness[i] = Some(f.clone());
            }
            self.cache.insert(h, f);
        }

        fitness.into_iter().map(Option::unwrap_or_default).collect()
    }

    /// Uncached approximate evaluation.
    pub fn fast(&self, prg: &Individual, sset: &SymbolSet) -> Fitness {
        self.eva.fast(prg, sset)
    }

    pub fn accuracy(&self, prg: &Individual, sset: &SymbolSet) -> Option<f64> {
        self.eva.accuracy(prg, sset)
    }

    /// Forgets every cached fitness.
    pub fn clear_all(&mut self) {
        self.cache.clear();
    }

    /// Forgets the cached fitness of `prg`.
    pub fn clear(&mut self, prg: &Individual) {
        self.cache.clear_hash(&prg.signature());
    }

    pub fn info(&self) -> CacheStats {
        CacheStats {
            probes: self.cache.probes(),
            hits: self.cache.hits(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::functions::primitives::Add;
    use crate::functions::terminals::Number;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Fitness = effective size, counting the evaluations.
    struct SizeEvaluator {
        calls: AtomicUsize,
    }

    impl Evaluator for SizeEvaluator {
        fn evaluate(&self, prg: &Individual, _sset: &SymbolSet) -> Fitness {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Fitness::from(prg.eff_size() as f64)
        }
    }

    fn set() -> SymbolSet {
        let mut sset = SymbolSet::new();
        sset.insert(Box::new(Add::new(0)), 1.0).unwrap();
        sset.insert(Box::new(Number::new(0, 0.0, 1.0)), 1.0).unwrap();
        sset
    }

    #[test]
    fn test_second_evaluation_hits_the_cache() {
        let sset = set();
        let mut rng = StdRng::seed_from_u64(4);
        let prg = Individual::random(&sset, 10, 2, &mut rng).unwrap();

        let mut proxy = EvaluatorProxy::new(SizeEvaluator { calls: AtomicUsize::new(0) }, 8)
            .unwrap()
            .with_verify_hits(true);
        let f1 = proxy.evaluate(&prg, &sset);
        let f2 = proxy.evaluate(&prg, &sset);

        assert_eq!(f1, f2);
        assert_eq!(proxy.info(), CacheStats { probes: 2, hits: 1 });

        proxy.clear(&prg);
        proxy.evaluate(&prg, &sset);
        assert_eq!(proxy.info().hits, 1);
    }

    #[test]
    fn test_evaluate_all_matches_serial_evaluation() {
        let sset = set();
        let mut rng = StdRng::seed_from_u64(8);
        let mut population: Vec<Individual> = (0..30)
            .map(|_| Individual::random(&sset, 12, 3, &mut rng).unwrap())
            .collect();
        population.push(population[0].clone());

        let mut proxy =
            EvaluatorProxy::new(SizeEvaluator { calls: AtomicUsize::new(0) }, 16).unwrap();
        let all = proxy.evaluate_all(&population, &sset);

        assert_eq!(all.len(), population.len());
        for (prg, f) in population.iter().zip(&all) {
            assert_eq!(*f, Fitness::from(prg.eff_size() as f64));
        }

        proxy.evaluate_all(&population, &sset);
        assert!(proxy.info().hits >= population.len() as u64 - 1);

        proxy.clear_all();
        assert_eq!(proxy.info(), CacheStats::default());
    }

    #[test]
    fn test_copies_in_a_population_are_evaluated_once() {
        let sset = set();
        let mut rng = StdRng::seed_from_u64(15);
        let a = Individual::random(&sset, 12, 3, &mut rng).unwrap();
        let mut b = Individual::random(&sset, 12, 3, &mut rng).unwrap();
        while b.signature() == a.signature() {
            b = Individual::random(&sset, 12, 3, &mut rng).unwrap();
        }
        let population = vec![a.clone(), b.clone(), a.clone(), a, b];

        let mut proxy =
            EvaluatorProxy::new(SizeEvaluator { calls: AtomicUsize::new(0) }, 16).unwrap();
        let all = proxy.evaluate_all(&population, &sset);

        assert_eq!(proxy.evaluator().calls.load(Ordering::SeqCst), 2);
        for (prg, f) in population.iter().zip(&all) {
            assert_eq!(*f, Fitness::from(prg.eff_size() as f64));
        }
    }
}
