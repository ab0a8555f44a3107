use arrayvec::ArrayVec;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::functions::traits::Symbol;
use crate::types::{Category, Index, Opcode};

/// Maximum number of arguments of a function.
pub const K_ARGS: usize = 4;

/// Address of a gene: row index plus category (column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Locus {
    pub index: Index,
    pub category: Category,
}

impl Locus {
    pub const fn new(index: Index, category: Category) -> Self {
        Self { index, category }
    }
}

impl fmt::Display for Locus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.index, self.category)
    }
}

/// Argument loci of a function gene.
pub type ArgPack = ArrayVec<Locus, K_ARGS>;

/// What a gene carries besides its symbol.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneData {
    /// Plain terminal (variable, argument placeholder, ADT...).
    Leaf,
    /// Parametric terminal: the value is stored per use.
    Param(f64),
    /// Function: one locus per argument, all strictly after the gene.
    Args(ArgPack),
}

/// A gene is one node-slot of a genome: a symbol (by opcode, the symbol set
/// owns the symbol itself) plus its arguments or parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Gene {
    pub sym: Opcode,
    pub data: GeneData,
}

impl Gene {
    pub fn terminal(sym: Opcode) -> Self {
        Self { sym, data: GeneData::Leaf }
    }

    pub fn parametric(sym: Opcode, param: f64) -> Self {
        Self {
            sym,
            data: GeneData::Param(param),
        }
    }

    /// Function gene. Loci exceeding `K_ARGS` are dropped (and flagged in
    /// debug builds).
    pub fn function(sym: Opcode, args: &[Locus]) -> Self {
        debug_assert!(args.len() <= K_ARGS);
        Self {
            sym,
            data: GeneData::Args(args.iter().copied().take(K_ARGS).collect()),
        }
    }

    /// Random gene for symbol `s`: function arguments are drawn uniformly in
    /// `[from, sup)`, parametric terminals get a fresh parameter.
    pub fn random<R: Rng>(op: Opcode, s: &dyn Symbol, from: Index, sup: Index, rng: &mut R) -> Self {
        if s.arity() > 0 {
            debug_assert!(from < sup);
            let args: ArgPack = s
                .arg_categories()
                .iter()
                .take(K_ARGS)
                .map(|&c| Locus::new(rng.gen_range(from..sup), c))
                .collect();
            Self {
                sym: op,
                data: GeneData::Args(args),
            }
        } else if s.parametric() {
            Self::parametric(op, s.init(rng))
        } else {
            Self::terminal(op)
        }
    }

    /// Argument loci (empty for terminals).
    pub fn args(&self) -> &[Locus] {
        match &self.data {
            GeneData::Args(a) => a.as_slice(),
            _ => &[],
        }
    }

    pub fn args_mut(&mut self) -> &mut [Locus] {
        match &mut self.data {
            GeneData::Args(a) => a.as_mut_slice(),
            _ => &mut [],
        }
    }

    pub fn arg_locus(&self, i: usize) -> Option<Locus> {
        self.args().get(i).copied()
    }

    pub fn param(&self) -> Option<f64> {
        match self.data {
            GeneData::Param(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self.data, GeneData::Args(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::primitives::Add;
    use crate::functions::terminals::Number;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_function_gene_points_forward() {
        let mut rng = StdRng::seed_from_u64(1);
        let add = Add::new(0);
        for _ in 0..50 {
            let g = Gene::random(3, &add, 5, 10, &mut rng);
            assert_eq!(g.args().len(), 2);
            assert!(g.args().iter().all(|l| (5..10).contains(&l.index) && l.category == 0));
        }
    }

    #[test]
    fn test_random_parametric_gene_has_param() {
        let mut rng = StdRng::seed_from_u64(1);
        let n = Number::new(0, 1.0, 2.0);
        let g = Gene::random(1, &n, 0, 0, &mut rng);
        assert!(g.param().is_some());
        assert!(g.args().is_empty());
    }

    #[test]
    fn test_locus_order_is_index_major() {
        assert!(Locus::new(1, 5) < Locus::new(2, 0));
        assert!(Locus::new(1, 0) < Locus::new(1, 1));
    }
}
