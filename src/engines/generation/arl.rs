//! Adaptive Representation through Learning.
//!
//! Sub-programs of a good individual whose removal causes a large fitness
//! loss are promoted to new symbols: ADTs when no argument is requested,
//! ADFs (with some terminals turned into formal arguments) otherwise.

use log::debug;
use rand::Rng;
use std::collections::HashSet;

use super::individual::Individual;
use crate::engines::evaluation::evaluator::Evaluator;
use crate::engines::evaluation::proxy::EvaluatorProxy;
use crate::error::Result;
use crate::functions::adf::{Adf, Adt};
use crate::functions::registry::SymbolSet;
use crate::types::{Category, Opcode};
use crate::utils::Signature;

/// Maximum effective size of a block (plus the number of ADF arguments).
const MAX_BLOCK_SIZE: usize = 5;

const ADT_WEIGHT: f64 = 1.0;
const ADF_WEIGHT: f64 = 0.1;

pub struct Arl {
    adf_args: usize,
    learned: HashSet<Signature>,
}

impl Arl {
    pub fn new(adf_args: usize) -> Self {
        Self {
            adf_args,
            learned: HashSet::new(),
        }
    }

    /// Number of blocks promoted so far.
    pub fn learned(&self) -> usize {
        self.learned.len()
    }

    /// Mines the blocks of `best` and registers the useful ones in `sset`.
    /// Returns the opcodes of the new symbols.
    pub fn run<E: Evaluator, R: Rng>(
        &mut self,
        best: &Individual,
        sset: &mut SymbolSet,
        proxy: &mut EvaluatorProxy<E>,
        rng: &mut R,
    ) -> Result<Vec<Opcode>> {
        let base = proxy.evaluate(best, sset).main();
        if !base.is_finite() {
            return Ok(Vec::new());
        }

        let mut candidates = Vec::new();
        for l in best.blocks() {
            let block = best.get_block(l);
            if block.eff_size() > MAX_BLOCK_SIZE + self.adf_args {
                continue;
            }

            let destroyed = best.destroy_block(l.index, sset, rng);
            let delta = base - proxy.evaluate(&destroyed, sset).main();
            if delta.is_finite() && (base / 10.0).abs() < delta {
                debug!("ARL candidate at {} (delta {})", l, delta);
                candidates.push(block);
            }
        }

        let mut added = Vec::new();
        for block in candidates {
            if !self.learned.insert(block.signature()) {
                continue;
            }

            let id = sset.len();
            let op = if self.adf_args > 0 {
                let (generalized, replaced) = block.generalize(self.adf_args, sset, rng);
                if replaced.is_empty() {
                    continue;
                }
                let args: Vec<Category> = replaced.iter().map(|l| l.category).collect();
                let adf = Adf::new(id, generalized.compact(sset), args)?;
                sset.insert(Box::new(adf), ADF_WEIGHT)?
            } else {
                let adt = Adt::new(id, block.compact(sset))?;
                sset.insert(Box::new(adt), ADT_WEIGHT)?
            };

            debug!("ARL: new symbol {}", op);
            added.push(op);
        }

        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Dataset;
    use crate::engines::evaluation::evaluator::AbsErrorEvaluator;
    use crate::engines::generation::gene::{Gene, Locus};
    use crate::functions::primitives::{Add, Mul};
    use crate::functions::terminals::{Number, Variable};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn setup() -> (SymbolSet, Individual, EvaluatorProxy<AbsErrorEvaluator>) {
        let mut sset = SymbolSet::new();
        let add = sset.insert(Box::new(Add::new(0)), 1.0).unwrap();
        let mul = sset.insert(Box::new(Mul::new(0)), 1.0).unwrap();
        let x = sset.insert(Box::new(Variable::new("X", 0, 0)), 1.0).unwrap();
        let num = sset.insert(Box::new(Number::new(0, 0.0, 1.0)), 1.0).unwrap();

        // X * X + X * 1: the exact target.
        let best = Individual::from_genes(
            &sset,
            vec![
                Gene::function(add, &[Locus::new(1, 0), Locus::new(2, 0)]),
                Gene::function(mul, &[Locus::new(3, 0), Locus::new(3, 0)]),
                Gene::function(mul, &[Locus::new(3, 0), Locus::new(4, 0)]),
                Gene::terminal(x),
                Gene::parametric(num, 1.0),
            ],
        )
        .unwrap();

        let data = Arc::new(Dataset::from_fn(&[-2.0, -1.0, 0.5, 1.0, 3.0], |x| x * x + x));
        let proxy = EvaluatorProxy::new(AbsErrorEvaluator::new(data), 10).unwrap();
        (sset, best, proxy)
    }

    #[test]
    fn test_useful_block_becomes_adt() {
        let (mut sset, best, mut proxy) = setup();
        let mut rng = StdRng::seed_from_u64(3);
        let mut arl = Arl::new(0);

        let added = arl.run(&best, &mut sset, &mut proxy, &mut rng).unwrap();
        assert_eq!(added.len(), 1);
        assert_eq!(sset.adts(), added.as_slice());
        assert!(sset.decode(added[0]).unwrap().name().starts_with("ADT_"));
        assert!(sset.check());

        // The same block isn't learned twice.
        let again = arl.run(&best, &mut sset, &mut proxy, &mut rng).unwrap();
        assert!(again.is_empty());
        assert_eq!(arl.learned(), 1);
    }

    #[test]
    fn test_adf_learning_generalizes_terminals() {
        let (mut sset, best, mut proxy) = setup();
        let mut rng = StdRng::seed_from_u64(3);
        let mut arl = Arl::new(1);

        let added = arl.run(&best, &mut sset, &mut proxy, &mut rng).unwrap();
        assert_eq!(added.len(), 1);
        let s = sset.decode(added[0]).unwrap();
        assert!(s.name().starts_with("ADF_"));
        assert_eq!(s.arity(), 1);
        assert_eq!(sset.weight(added[0]), 10);
    }
}
