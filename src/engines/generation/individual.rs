use log::error;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::io::{Read, Write};
use std::ops::Index;
use std::sync::OnceLock;

use super::gene::{Gene, GeneData, Locus, K_ARGS};
use crate::error::{GpError, Result};
use crate::functions::registry::SymbolSet;
use crate::types::{Category, Index as Row, Opcode};
use crate::utils::{murmur3_128, Matrix, Signature, Tokens};

/// Seed of the signature hash.
const SIGNATURE_SEED: u64 = 1973;

/// Recombination operator used to build offspring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossoverKind {
    #[default]
    Uniform,
    OnePoint,
    TwoPoint,
}

/// A program encoded as a matrix of genes (rows x categories).
///
/// Every function gene references loci in strictly greater rows, so the
/// genome is a forward-only DAG and the evaluation always terminates. The
/// program starts at `best`; genes not reachable from there are introns.
#[derive(Debug, Clone)]
pub struct Individual {
    genome: Matrix<Gene>,
    best: Locus,
    age: u32,
    signature: OnceLock<Signature>,
}

impl Default for Individual {
    fn default() -> Self {
        Self {
            genome: Matrix::new(0, 0, Gene::terminal(0)),
            best: Locus::new(0, 0),
            age: 0,
            signature: OnceLock::new(),
        }
    }
}

impl PartialEq for Individual {
    fn eq(&self, other: &Self) -> bool {
        self.best == other.best && self.age == other.age && self.genome == other.genome
    }
}

impl Index<Locus> for Individual {
    type Output = Gene;

    fn index(&self, l: Locus) -> &Gene {
        &self.genome[l]
    }
}

/// Active loci of an individual in ascending order.
pub struct ActiveLoci<'a> {
    prg: &'a Individual,
    frontier: BTreeSet<Locus>,
}

impl Iterator for ActiveLoci<'_> {
    type Item = Locus;

    fn next(&mut self) -> Option<Locus> {
        let l = self.frontier.pop_first()?;
        self.frontier.extend(self.prg[l].args().iter().copied());
        Some(l)
    }
}

impl Individual {
    /// Random individual of `code_length` rows with one column per category
    /// of `sset`. The last `patch_length` rows contain terminals only.
    pub fn random<R: Rng>(
        sset: &SymbolSet,
        code_length: usize,
        patch_length: usize,
        rng: &mut R,
    ) -> Result<Self> {
        if patch_length == 0 || patch_length > code_length {
            return Err(GpError::Generation(format!(
                "patch length must be in [1, {}] (got {})",
                code_length, patch_length
            )));
        }
        let categories = sset.categories();
        if categories == 0 || !sset.enough_terminals() {
            return Err(GpError::Generation(
                "symbol set doesn't contain enough terminals".to_string(),
            ));
        }

        let patch_start = code_length - patch_length;
        let mut genes = Vec::with_capacity(code_length * categories);

        for i in 0..code_length {
            for c in 0..categories as Category {
                let drawn = if i < patch_start {
                    sset.roulette_category(c, rng)
                } else {
                    sset.roulette_terminal(c, rng)
                };
                let op = drawn
                    .ok_or_else(|| GpError::Generation(format!("no symbol for category {}", c)))?;

                let s = sset
                    .decode(op)
                    .ok_or_else(|| GpError::InvalidSymbol(op.to_string()))?;
                genes.push(Gene::random(op, s, i + 1, code_length, rng));
            }
        }

        let genome = Matrix::from_vec(genes, categories)
            .ok_or_else(|| GpError::Generation("empty genome".to_string()))?;
        let ind = Self {
            genome,
            best: Locus::new(0, 0),
            age: 0,
            signature: OnceLock::new(),
        };
        debug_assert!(ind.check(sset));
        Ok(ind)
    }

    /// Deterministic individual with one explicit gene per row. The other
    /// categories of each row hold filler terminals; the program starts at
    /// the first gene.
    pub fn from_genes(sset: &SymbolSet, genes: Vec<Gene>) -> Result<Self> {
        let categories = sset.categories();
        if genes.is_empty() || categories == 0 {
            return Err(GpError::Generation(
                "an individual needs at least one gene and one category".to_string(),
            ));
        }

        let fillers = (0..categories as Category)
            .map(|c| {
                sset.filler(c).ok_or_else(|| {
                    GpError::Generation(format!("no filler terminal for category {}", c))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let rows = genes.len();
        let mut genome = Matrix::new(rows, categories, fillers[0].clone());
        let mut best = Locus::new(0, 0);

        for (i, gene) in genes.into_iter().enumerate() {
            let s = sset
                .decode(gene.sym)
                .ok_or_else(|| GpError::InvalidSymbol(gene.sym.to_string()))?;
            let c = if s.argument().is_some() { 0 } else { s.category() };
            if c as usize >= categories {
                return Err(GpError::InvalidSymbol(s.name().to_string()));
            }

            for (col, filler) in fillers.iter().enumerate() {
                genome[(i, col)] = filler.clone();
            }
            genome[(i, c as usize)] = gene;

            if i == 0 {
                best = Locus::new(0, c);
            }
        }

        let ind = Self {
            genome,
            best,
            age: 0,
            signature: OnceLock::new(),
        };
        if !ind.check(sset) {
            return Err(GpError::Generation("malformed gene list".to_string()));
        }
        Ok(ind)
    }

    /// Number of rows.
    pub fn size(&self) -> usize {
        self.genome.rows()
    }

    /// Number of categories (columns).
    pub fn categories(&self) -> usize {
        self.genome.cols()
    }

    pub fn is_empty(&self) -> bool {
        self.genome.is_empty()
    }

    /// Starting locus of the active code.
    pub fn best(&self) -> Locus {
        self.best
    }

    /// Category of the value produced by the individual.
    pub fn category(&self) -> Category {
        self.best.category
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn inc_age(&mut self) {
        self.age += 1;
    }

    pub fn get(&self, l: Locus) -> Option<&Gene> {
        self.genome.get(l.index, l.category as usize)
    }

    pub fn active(&self) -> ActiveLoci<'_> {
        let mut frontier = BTreeSet::new();
        if !self.is_empty() {
            frontier.insert(self.best);
        }
        ActiveLoci {
            prg: self,
            frontier,
        }
    }

    /// Number of active genes.
    pub fn eff_size(&self) -> usize {
        self.active().count()
    }

    pub fn signature(&self) -> Signature {
        *self.signature.get_or_init(|| self.hash())
    }

    /// Structural hash of the active code. Each locus hashes its opcode, its
    /// parameter and the hashes of its arguments, so shared sub-expressions
    /// are packed once.
    fn hash(&self) -> Signature {
        if self.is_empty() {
            return Signature::default();
        }

        let active: Vec<Locus> = self.active().collect();
        let mut sigs: HashMap<Locus, Signature> = HashMap::with_capacity(active.len());
        let mut bytes = Vec::with_capacity(4 + 16 * K_ARGS);

        for &l in active.iter().rev() {
            let g = &self[l];
            bytes.clear();
            bytes.extend_from_slice(&g.sym.to_le_bytes());
            match &g.data {
                GeneData::Leaf => {}
                GeneData::Param(p) => bytes.extend_from_slice(&p.to_le_bytes()),
                GeneData::Args(args) => {
                    for a in args {
                        let s = sigs.get(a).copied().unwrap_or_default();
                        bytes.extend_from_slice(&s.data[0].to_le_bytes());
                        bytes.extend_from_slice(&s.data[1].to_le_bytes());
                    }
                }
            }
            sigs.insert(l, murmur3_128(&bytes, SIGNATURE_SEED));
        }

        sigs.get(&self.best).copied().unwrap_or_default()
    }

    /// Replaces the gene at `l` in place.
    pub fn set(&mut self, l: Locus, gene: Gene) {
        self.genome[l] = gene;
        self.signature = OnceLock::new();
    }

    /// Copy of the individual with the gene at `l` replaced.
    pub fn replace(&self, l: Locus, gene: Gene) -> Self {
        let mut ret = self.clone();
        ret.set(l, gene);
        ret
    }

    /// Mutates each active gene with probability `p`, returning the number of
    /// genes actually changed. The last row only receives terminals.
    pub fn mutation<R: Rng>(&mut self, p: f64, sset: &SymbolSet, rng: &mut R) -> usize {
        let p = p.clamp(0.0, 1.0);
        let size = self.size();
        let loci: Vec<Locus> = self.active().collect();
        let mut changed = 0;

        for l in loci {
            if !rng.gen_bool(p) {
                continue;
            }

            let op = if l.index + 1 < size {
                sset.roulette_category(l.category, rng)
            } else {
                sset.roulette_terminal(l.category, rng)
            };
            let Some((op, s)) = op.and_then(|op| sset.decode(op).map(|s| (op, s))) else {
                continue;
            };

            let gene = Gene::random(op, s, l.index + 1, size, rng);
            if gene != self.genome[l] {
                self.genome[l] = gene;
                changed += 1;
            }
        }

        if changed > 0 {
            self.signature = OnceLock::new();
        }
        debug_assert!(self.check(sset));
        changed
    }

    /// Offspring built by the requested recombination operator.
    pub fn crossover<R: Rng>(&self, other: &Self, kind: CrossoverKind, rng: &mut R) -> Self {
        match kind {
            CrossoverKind::Uniform => self.uniform_crossover(other, rng),
            CrossoverKind::OnePoint => self.one_point_crossover(other, rng),
            CrossoverKind::TwoPoint => self.two_point_crossover(other, rng),
        }
    }

    fn offspring(&self, other: &Self) -> Self {
        let mut child = self.clone();
        child.age = self.age.max(other.age);
        child.signature = OnceLock::new();
        child
    }

    fn same_shape(&self, other: &Self) -> bool {
        self.size() == other.size() && self.categories() == other.categories()
    }

    /// Each gene comes from either parent with the same probability.
    pub fn uniform_crossover<R: Rng>(&self, other: &Self, rng: &mut R) -> Self {
        debug_assert!(self.same_shape(other));
        let mut child = self.offspring(other);
        if !self.same_shape(other) {
            return child;
        }

        for (dst, src) in child.genome.iter_mut().zip(other.genome.iter()) {
            if rng.gen_bool(0.5) {
                *dst = src.clone();
            }
        }
        if rng.gen_bool(0.5) {
            child.best = other.best;
        }
        child
    }

    /// Rows before a random cut come from `self`, the others from `other`.
    pub fn one_point_crossover<R: Rng>(&self, other: &Self, rng: &mut R) -> Self {
        debug_assert!(self.same_shape(other));
        let mut child = self.offspring(other);
        if !self.same_shape(other) || self.size() < 2 {
            return child;
        }

        let cut = rng.gen_range(1..self.size());
        child.copy_rows(other, cut, self.size());
        child
    }

    /// Rows in `[cut1, cut2)` come from `other`, the others from `self`.
    pub fn two_point_crossover<R: Rng>(&self, other: &Self, rng: &mut R) -> Self {
        debug_assert!(self.same_shape(other));
        let mut child = self.offspring(other);
        if !self.same_shape(other) || self.size() < 2 {
            return child;
        }

        let cut1 = rng.gen_range(0..self.size() - 1);
        let cut2 = rng.gen_range(cut1 + 1..self.size());
        child.copy_rows(other, cut1, cut2);
        child
    }

    fn copy_rows(&mut self, from: &Self, start: Row, end: Row) {
        for i in start..end {
            for c in 0..self.categories() {
                self.genome[(i, c)] = from.genome[(i, c)].clone();
            }
        }
    }

    /// Number of loci holding different genes.
    pub fn distance(&self, other: &Self) -> usize {
        debug_assert!(self.same_shape(other));
        self.genome
            .iter()
            .zip(other.genome.iter())
            .filter(|(a, b)| a != b)
            .count()
    }

    /// New individual with the genes of `row_of` moved to their new rows
    /// (arguments remapped accordingly). Unused cells hold filler terminals.
    fn rebuild(&self, sset: &SymbolSet, rows: usize, row_of: &HashMap<Locus, Row>) -> Self {
        let cols = self.categories();
        let fillers: Vec<Gene> = (0..cols as Category)
            .map(|c| sset.filler(c).unwrap_or_else(|| Gene::terminal(0)))
            .collect();

        let mut genome = Matrix::new(rows.max(1), cols, Gene::terminal(0));
        for i in 0..genome.rows() {
            for (c, f) in fillers.iter().enumerate() {
                genome[(i, c)] = f.clone();
            }
        }

        for (&l, &row) in row_of {
            let mut g = self[l].clone();
            for a in g.args_mut() {
                if let Some(&r) = row_of.get(a) {
                    a.index = r;
                }
            }
            genome[(row, l.category as usize)] = g;
        }

        Self {
            genome,
            best: Locus::new(row_of.get(&self.best).copied().unwrap_or(0), self.best.category),
            age: self.age,
            signature: OnceLock::new(),
        }
    }

    /// Copy containing only the active rows, renumbered from 0. Same value,
    /// same effective size.
    pub fn compact(&self, sset: &SymbolSet) -> Self {
        if self.is_empty() {
            return self.clone();
        }

        let active: Vec<Locus> = self.active().collect();
        let rows: BTreeSet<Row> = active.iter().map(|l| l.index).collect();
        let new_row: HashMap<Row, Row> = rows.iter().enumerate().map(|(n, &r)| (r, n)).collect();
        let row_of: HashMap<Locus, Row> = active.iter().map(|&l| (l, new_row[&l.index])).collect();

        let ret = self.rebuild(sset, rows.len(), &row_of);
        debug_assert!(ret.check(sset));
        ret
    }

    /// Like `compact` but with one active gene per row: active functions
    /// first, then active terminals. Returns the new individual and the rows
    /// of the first and last active terminal.
    pub fn optimize(&self, sset: &SymbolSet) -> (Self, (Row, Row)) {
        if self.is_empty() {
            return (self.clone(), (0, 0));
        }

        let (functions, terminals): (Vec<Locus>, Vec<Locus>) =
            self.active().partition(|&l| self[l].is_function());

        let row_of: HashMap<Locus, Row> = functions
            .iter()
            .chain(terminals.iter())
            .enumerate()
            .map(|(row, &l)| (l, row))
            .collect();

        let first = functions.len();
        let last = first + terminals.len().saturating_sub(1);
        let ret = self.rebuild(sset, row_of.len(), &row_of);
        debug_assert!(ret.check(sset));
        (ret, (first, last))
    }

    /// Replaces up to `max_args` randomly chosen active terminals with ADF
    /// argument placeholders. Returns the new individual and the replaced
    /// loci (the `i`-th locus became `ARG_i`).
    pub fn generalize<R: Rng>(
        &self,
        max_args: usize,
        sset: &SymbolSet,
        rng: &mut R,
    ) -> (Self, Vec<Locus>) {
        let mut terminals: Vec<Locus> = self
            .active()
            .filter(|&l| {
                !self[l].is_function()
                    && sset
                        .decode(self[l].sym)
                        .map_or(false, |s| s.argument().is_none())
            })
            .collect();

        terminals.shuffle(rng);
        terminals.truncate(max_args.min(K_ARGS));

        let mut ret = self.clone();
        for (i, &l) in terminals.iter().enumerate() {
            if let Some(arg) = sset.arg(i) {
                ret.set(l, Gene::terminal(arg));
            }
        }
        (ret, terminals)
    }

    /// Active loci whose subtree has depth at least 3 (a terminal has depth
    /// 1), in ascending order. These are the candidate building blocks.
    pub fn blocks(&self) -> Vec<Locus> {
        let active: Vec<Locus> = self.active().collect();
        let mut depth: HashMap<Locus, usize> = HashMap::with_capacity(active.len());

        for &l in active.iter().rev() {
            let d = 1 + self[l]
                .args()
                .iter()
                .map(|a| depth.get(a).copied().unwrap_or(0))
                .max()
                .unwrap_or(0);
            depth.insert(l, d);
        }

        active.into_iter().filter(|l| depth[l] >= 3).collect()
    }

    /// The sub-program starting at `l`.
    pub fn get_block(&self, l: Locus) -> Self {
        let mut ret = self.clone();
        ret.best = l;
        ret.signature = OnceLock::new();
        ret
    }

    /// Copy where every gene of row `index` is replaced by a random terminal
    /// of the same category.
    pub fn destroy_block<R: Rng>(&self, index: Row, sset: &SymbolSet, rng: &mut R) -> Self {
        let mut ret = self.clone();
        for c in 0..self.categories() as Category {
            let Some(op) = sset.roulette_terminal(c, rng) else {
                continue;
            };
            if let Some(s) = sset.decode(op) {
                let g = Gene::random(op, s, index + 1, self.size(), rng);
                ret.set(Locus::new(index, c), g);
            }
        }
        ret
    }

    /// Structural consistency check.
    pub fn check(&self, sset: &SymbolSet) -> bool {
        if self.is_empty() {
            return true;
        }

        let rows = self.size();
        let cols = self.categories();

        if self.best.index >= rows || self.best.category as usize >= cols {
            error!("Best locus {} out of range", self.best);
            return false;
        }

        for i in 0..rows {
            for c in 0..cols {
                let l = Locus::new(i, c as Category);
                let g = &self[l];
                let Some(s) = sset.decode(g.sym) else {
                    error!("Unknown opcode {} at locus {}", g.sym, l);
                    return false;
                };

                if s.argument().is_none() && s.category() as usize != c {
                    error!("Category mismatch at locus {}: {} has category {}", l, s.name(), s.category());
                    return false;
                }

                let well_formed = match &g.data {
                    GeneData::Leaf => s.arity() == 0 && !s.parametric(),
                    GeneData::Param(_) => s.arity() == 0 && s.parametric(),
                    GeneData::Args(args) => args.len() == s.arity() && s.arity() > 0,
                };
                if !well_formed {
                    error!("Arity mismatch at locus {} ({})", l, s.name());
                    return false;
                }

                for (j, a) in g.args().iter().enumerate() {
                    if a.index <= i || a.index >= rows {
                        error!("Argument {} of locus {} doesn't point forward", a, l);
                        return false;
                    }
                    if a.category != s.arg_categories()[j] {
                        error!("Argument {} of locus {} has the wrong category", a, l);
                        return false;
                    }
                }

                if i + 1 == rows && s.arity() > 0 {
                    error!("Last row contains a function at locus {}", l);
                    return false;
                }
            }
        }

        if let Some(sig) = self.signature.get() {
            if *sig != self.hash() {
                error!("Cached signature doesn't match the genome");
                return false;
            }
        }

        true
    }

    /// Writes the individual in textual form:
    ///
    /// ```text
    /// age
    /// rows categories
    /// best_index best_category
    /// opcode [parameter] [argument indices...]     (one line per gene)
    /// ```
    ///
    /// Argument categories aren't stored: they're rederived from the symbol.
    pub fn save<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "{}", self.age)?;
        writeln!(out, "{} {}", self.size(), self.categories())?;
        writeln!(out, "{} {}", self.best.index, self.best.category)?;

        for g in self.genome.iter() {
            write!(out, "{}", g.sym)?;
            match &g.data {
                GeneData::Leaf => {}
                GeneData::Param(p) => write!(out, " {}", p)?,
                GeneData::Args(args) => {
                    for a in args {
                        write!(out, " {}", a.index)?;
                    }
                }
            }
            writeln!(out)?;
        }
        Ok(())
    }

    /// Reads an individual saved by `save`. Every opcode must decode against
    /// `sset`. On error `self` is left untouched.
    pub fn load<R: Read>(&mut self, input: &mut R, sset: &SymbolSet) -> Result<()> {
        let mut text = String::new();
        input.read_to_string(&mut text)?;
        let mut t = Tokens::new(&text);

        let age: u32 = t.next("age")?;
        let rows: usize = t.next("rows")?;
        let cols: usize = t.next("categories")?;
        let best = Locus::new(t.next("best index")?, t.next("best category")?);

        if rows == 0 || cols == 0 {
            return Err(GpError::Load("empty genome".to_string()));
        }
        if cols != sset.categories() {
            return Err(GpError::Load(format!(
                "{} categories, the symbol set has {}",
                cols,
                sset.categories()
            )));
        }
        let size = rows
            .checked_mul(cols)
            .ok_or_else(|| GpError::Load(format!("genome too large ({} x {})", rows, cols)))?;

        // Every gene takes at least one token: bounds the allocation.
        let mut genes = Vec::with_capacity(size.min(text.len()));
        for _ in 0..size {
            let sym: Opcode = t.next("opcode")?;
            let s = sset
                .decode(sym)
                .ok_or_else(|| GpError::Load(format!("unknown opcode {}", sym)))?;

            let gene = if s.arity() > 0 {
                let mut args = Vec::with_capacity(s.arity());
                for &c in s.arg_categories() {
                    args.push(Locus::new(t.next("argument index")?, c));
                }
                Gene::function(sym, &args)
            } else if s.parametric() {
                Gene::parametric(sym, t.next("parameter")?)
            } else {
                Gene::terminal(sym)
            };
            genes.push(gene);
        }

        let genome = Matrix::from_vec(genes, cols)
            .ok_or_else(|| GpError::Load("empty genome".to_string()))?;
        let loaded = Self {
            genome,
            best,
            age,
            signature: OnceLock::new(),
        };
        if !loaded.check(sset) {
            return Err(GpError::Load("inconsistent individual".to_string()));
        }

        *self = loaded;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::evaluation::interpreter::Interpreter;
    use crate::functions::primitives::{Add, Mul, Sub};
    use crate::functions::terminals::{Number, Variable};
    use crate::types::Value;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn regression_set() -> SymbolSet {
        let mut sset = SymbolSet::new();
        sset.insert(Box::new(Add::new(0)), 1.0).unwrap();
        sset.insert(Box::new(Sub::new(0)), 1.0).unwrap();
        sset.insert(Box::new(Mul::new(0)), 1.0).unwrap();
        sset.insert(Box::new(Variable::new("X", 0, 0)), 1.0).unwrap();
        sset.insert(Box::new(Number::new(0, -5.0, 5.0)), 1.0).unwrap();
        sset
    }

    fn eval(ind: &Individual, sset: &SymbolSet, x: f64) -> Option<Value> {
        let example = [Value::Float(x)];
        Interpreter::new(ind, sset).with_example(Some(&example)).run()
    }

    #[test]
    fn test_random_individuals_are_well_formed() {
        let sset = regression_set();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let ind = Individual::random(&sset, 30, 5, &mut rng).unwrap();
            assert!(ind.check(&sset));
            assert_eq!(ind.size(), 30);
            assert!(ind.eff_size() >= 1);
        }
    }

    #[test]
    fn test_random_rejects_bad_patch() {
        let sset = regression_set();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(Individual::random(&sset, 10, 0, &mut rng).is_err());
        assert!(Individual::random(&sset, 10, 11, &mut rng).is_err());
    }

    #[test]
    fn test_active_loci_are_ascending_and_unique() {
        let sset = regression_set();
        let mut rng = StdRng::seed_from_u64(7);
        let ind = Individual::random(&sset, 40, 5, &mut rng).unwrap();
        let active: Vec<Locus> = ind.active().collect();
        assert_eq!(active[0], ind.best());
        assert!(active.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_mutation_keeps_forward_references() {
        let sset = regression_set();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let mut ind = Individual::random(&sset, 20, 3, &mut rng).unwrap();
            let before = ind.signature();
            let n = ind.mutation(0.5, &sset, &mut rng);
            assert!(ind.check(&sset));
            if n == 0 {
                assert_eq!(before, ind.signature());
            }
        }
    }

    #[test]
    fn test_crossover_preserves_shape_and_age() {
        let sset = regression_set();
        let mut rng = StdRng::seed_from_u64(9);
        let mut a = Individual::random(&sset, 20, 3, &mut rng).unwrap();
        let b = Individual::random(&sset, 20, 3, &mut rng).unwrap();
        a.inc_age();
        a.inc_age();

        for kind in [CrossoverKind::Uniform, CrossoverKind::OnePoint, CrossoverKind::TwoPoint] {
            for _ in 0..20 {
                let child = a.crossover(&b, kind, &mut rng);
                assert!(child.check(&sset));
                assert_eq!(child.size(), 20);
                assert_eq!(child.age(), 2);
                // Every gene comes from one of the parents.
                for i in 0..child.size() {
                    let l = Locus::new(i, 0);
                    assert!(child[l] == a[l] || child[l] == b[l]);
                }
            }
        }
    }

    #[test]
    fn test_compact_preserves_value_and_is_idempotent() {
        let sset = regression_set();
        let mut rng = StdRng::seed_from_u64(21);
        for _ in 0..30 {
            let ind = Individual::random(&sset, 30, 5, &mut rng).unwrap();
            let c1 = ind.compact(&sset);
            let c2 = c1.compact(&sset);

            assert!(c1.check(&sset));
            assert_eq!(c1.eff_size(), ind.eff_size());
            assert_eq!(c2.eff_size(), c1.eff_size());
            assert_eq!(c1.signature(), ind.signature());
            assert_eq!(c2, c1);
            for x in [-1.0, 0.5, 3.0] {
                assert_eq!(eval(&c1, &sset, x), eval(&ind, &sset, x));
            }
        }
    }

    #[test]
    fn test_optimize_clusters_terminals() {
        let sset = regression_set();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..30 {
            let ind = Individual::random(&sset, 30, 5, &mut rng).unwrap();
            let (opt, (first, last)) = ind.optimize(&sset);

            assert!(opt.check(&sset));
            assert_eq!(opt.size(), ind.eff_size());
            assert_eq!(last + 1, opt.size());
            for l in opt.active() {
                assert_eq!(opt[l].is_function(), l.index < first);
            }
            assert_eq!(eval(&opt, &sset, 2.0), eval(&ind, &sset, 2.0));
        }
    }

    #[test]
    fn test_blocks_have_depth_three() {
        let sset = regression_set();
        let add = sset.decode_name("FADD").unwrap();
        let x = sset.decode_name("X").unwrap();

        // ADD(ADD(X, X), X): only the root is deep enough.
        let ind = Individual::from_genes(
            &sset,
            vec![
                Gene::function(add, &[Locus::new(1, 0), Locus::new(2, 0)]),
                Gene::function(add, &[Locus::new(2, 0), Locus::new(2, 0)]),
                Gene::terminal(x),
            ],
        )
        .unwrap();

        assert_eq!(ind.blocks(), vec![Locus::new(0, 0)]);
        let block = ind.get_block(Locus::new(1, 0));
        assert_eq!(block.eff_size(), 2);
        assert_eq!(eval(&block, &sset, 3.0), Some(Value::Float(6.0)));
    }

    #[test]
    fn test_generalize_replaces_terminals_with_arguments() {
        let sset = regression_set();
        let mut rng = StdRng::seed_from_u64(8);
        let ind = Individual::random(&sset, 30, 5, &mut rng).unwrap();
        let (gen, replaced) = ind.generalize(2, &sset, &mut rng);

        assert!(replaced.len() <= 2);
        assert!(gen.check(&sset));
        for (i, &l) in replaced.iter().enumerate() {
            assert_eq!(sset.decode(gen[l].sym).unwrap().argument(), Some(i));
        }
    }

    #[test]
    fn test_destroy_block_puts_terminals() {
        let sset = regression_set();
        let mut rng = StdRng::seed_from_u64(13);
        let ind = Individual::random(&sset, 20, 3, &mut rng).unwrap();
        let d = ind.destroy_block(0, &sset, &mut rng);
        assert!(d.check(&sset));
        assert_eq!(d.eff_size(), 1);
    }

    #[test]
    fn test_signature_ignores_introns() {
        let sset = regression_set();
        let add = sset.decode_name("FADD").unwrap();
        let num = sset.decode_name("REAL").unwrap();

        let ind = Individual::from_genes(
            &sset,
            vec![
                Gene::function(add, &[Locus::new(1, 0), Locus::new(1, 0)]),
                Gene::parametric(num, 1.0),
                Gene::parametric(num, 2.0),
            ],
        )
        .unwrap();

        let changed_intron = ind.replace(Locus::new(2, 0), Gene::parametric(num, 9.0));
        assert_eq!(ind.signature(), changed_intron.signature());
        assert_eq!(ind.distance(&changed_intron), 1);

        let changed_active = ind.replace(Locus::new(1, 0), Gene::parametric(num, 9.0));
        assert_ne!(ind.signature(), changed_active.signature());
    }

    #[test]
    fn test_check_detects_backward_reference() {
        let sset = regression_set();
        let add = sset.decode_name("FADD").unwrap();
        let x = sset.decode_name("X").unwrap();

        let mut ind = Individual::from_genes(
            &sset,
            vec![
                Gene::function(add, &[Locus::new(1, 0), Locus::new(2, 0)]),
                Gene::terminal(x),
                Gene::terminal(x),
            ],
        )
        .unwrap();
        assert!(ind.check(&sset));

        ind.set(Locus::new(1, 0), Gene::function(add, &[Locus::new(0, 0), Locus::new(2, 0)]));
        assert!(!ind.check(&sset));
    }

    #[test]
    fn test_save_load_round_trip() {
        let sset = regression_set();
        let mut rng = StdRng::seed_from_u64(77);
        let mut ind = Individual::random(&sset, 25, 4, &mut rng).unwrap();
        ind.inc_age();

        let mut buf = Vec::new();
        ind.save(&mut buf).unwrap();

        let mut loaded = Individual::default();
        loaded.load(&mut buf.as_slice(), &sset).unwrap();
        assert_eq!(loaded, ind);
        assert_eq!(loaded.signature(), ind.signature());
        assert_eq!(eval(&loaded, &sset, 1.25), eval(&ind, &sset, 1.25));
    }

    #[test]
    fn test_failed_load_leaves_target_untouched() {
        let sset = regression_set();
        let mut rng = StdRng::seed_from_u64(2);
        let mut ind = Individual::random(&sset, 10, 2, &mut rng).unwrap();
        let original = ind.clone();

        let mut truncated: &[u8] = b"0\n10 1\n0 0\n4 1 2\n";
        assert!(ind.load(&mut truncated, &sset).is_err());
        assert_eq!(ind, original);

        let mut unknown: &[u8] = b"0\n1 1\n0 0\n999\n";
        assert!(ind.load(&mut unknown, &sset).is_err());
        assert_eq!(ind, original);
    }

    #[test]
    fn test_load_rejects_bad_shapes() {
        let sset = regression_set();
        let mut rng = StdRng::seed_from_u64(3);
        let mut ind = Individual::random(&sset, 10, 2, &mut rng).unwrap();
        let original = ind.clone();

        let headers: [&[u8]; 5] = [
            b"0\n4611686018427387904 8\n0 0\n5\n",
            b"0\n100000000000 1\n0 0\n5\n",
            b"0\n0 1\n0 0\n",
            b"0\n3 0\n0 0\n",
            b"0\n1 2\n0 0\n5 5\n",
        ];
        for mut h in headers {
            assert!(ind.load(&mut h, &sset).is_err());
            assert_eq!(ind, original);
        }
    }
}
