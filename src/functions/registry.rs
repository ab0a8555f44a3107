use log::error;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use std::collections::BTreeSet;
use std::fmt;

use super::terminals::Argument;
use super::traits::{Symbol, BASE_WEIGHT};
use crate::engines::generation::gene::{Gene, K_ARGS};
use crate::error::{GpError, Result};
use crate::types::{Category, Opcode};

struct Entry {
    symbol: Box<dyn Symbol>,
    weight: u32,
}

/// A view over a subset of the symbols with a weighted wheel for each of
/// the drawable groups.
#[derive(Default)]
struct Collection {
    symbols: Vec<Opcode>,
    terminals: Vec<Opcode>,
    adf: Vec<Opcode>,
    adt: Vec<Opcode>,
    symbols_wheel: Option<WeightedIndex<u32>>,
    terminals_wheel: Option<WeightedIndex<u32>>,
}

impl Collection {
    fn build<'a>(entries: &[Entry], opcodes: impl Iterator<Item = &'a Opcode>) -> Self {
        let mut c = Collection::default();

        for &op in opcodes {
            let s = entries[op as usize].symbol.as_ref();
            c.symbols.push(op);
            if s.is_terminal() {
                c.terminals.push(op);
                if s.auto_defined() {
                    c.adt.push(op);
                }
            } else if s.auto_defined() {
                c.adf.push(op);
            }
        }

        // `WeightedIndex::new` fails for empty or all-zero weights: such a
        // group simply can't be drawn from.
        let wheel = |ops: &[Opcode]| {
            WeightedIndex::new(ops.iter().map(|&op| entries[op as usize].weight)).ok()
        };
        c.symbols_wheel = wheel(&c.symbols);
        c.terminals_wheel = wheel(&c.terminals);
        c
    }

    fn roulette<R: Rng>(&self, rng: &mut R) -> Option<Opcode> {
        self.symbols_wheel
            .as_ref()
            .map(|w| self.symbols[w.sample(rng)])
    }

    fn roulette_terminal<R: Rng>(&self, rng: &mut R) -> Option<Opcode> {
        self.terminals_wheel
            .as_ref()
            .map(|w| self.terminals[w.sample(rng)])
    }

    fn check(&self, name: &str, entries: &[Entry]) -> bool {
        for &op in &self.symbols {
            let s = entries[op as usize].symbol.as_ref();
            if s.is_terminal() != self.terminals.contains(&op) {
                error!("{}: terminal {} badly stored", name, s.name());
                return false;
            }
            if s.auto_defined() {
                let group = if s.is_terminal() { &self.adt } else { &self.adf };
                if !group.contains(&op) {
                    error!("{}: auto defined symbol {} badly stored", name, s.name());
                    return false;
                }
            }
            if entries[op as usize].weight == 0 && !(s.is_terminal() || s.auto_defined()) {
                error!("{}: null weight for symbol {}", name, s.name());
                return false;
            }
        }

        let n = self.symbols.len();
        if n < self.terminals.len() || n < self.adf.len() || n < self.adt.len() {
            error!("{}: wrong group sizes", name);
            return false;
        }
        true
    }
}

/// Registry of every symbol available for a run.
///
/// The set owns the symbols; genes refer to them by opcode (the index of
/// the symbol inside the set). Selection weights are kept here, not on the
/// symbols, and every registration rebuilds the per-category views used by
/// the weighted roulette.
pub struct SymbolSet {
    entries: Vec<Entry>,
    arguments: Vec<Opcode>,
    all: Collection,
    by_category: Vec<Collection>,
}

impl SymbolSet {
    /// Empty set holding only the `K_ARGS` ADF argument placeholders (which
    /// are decodable but never drawn).
    pub fn new() -> Self {
        let mut set = Self {
            entries: Vec::new(),
            arguments: Vec::with_capacity(K_ARGS),
            all: Collection::default(),
            by_category: Vec::new(),
        };

        for i in 0..K_ARGS {
            let op = set.entries.len() as Opcode;
            set.entries.push(Entry {
                symbol: Box::new(Argument::new(i)),
                weight: 0,
            });
            set.arguments.push(op);
        }
        set
    }

    /// Registers `symbol` with relative weight `weight` (`1.0` is the
    /// default weight) and returns its opcode.
    pub fn insert(&mut self, symbol: Box<dyn Symbol>, weight: f64) -> Result<Opcode> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(GpError::InvalidSymbol(format!(
                "{}: weight must be a non-negative number (got {})",
                symbol.name(),
                weight
            )));
        }
        if symbol.arity() > K_ARGS {
            return Err(GpError::InvalidSymbol(format!(
                "{}: arity {} exceeds the maximum of {}",
                symbol.name(),
                symbol.arity(),
                K_ARGS
            )));
        }
        if symbol.argument().is_some() {
            return Err(GpError::InvalidSymbol(
                "argument placeholders are owned by the symbol set".to_string(),
            ));
        }
        if !symbol.debug() {
            return Err(GpError::InvalidSymbol(format!(
                "{}: failed consistency check",
                symbol.name()
            )));
        }

        let op = self.entries.len() as Opcode;
        let w = (weight * f64::from(BASE_WEIGHT)).round() as u32;
        self.entries.push(Entry { symbol, weight: w });
        self.rebuild();
        Ok(op)
    }

    fn rebuild(&mut self) {
        let drawable: Vec<Opcode> = (0..self.entries.len() as Opcode)
            .filter(|op| !self.arguments.contains(op))
            .collect();

        self.all = Collection::build(&self.entries, drawable.iter());

        let n_categories = drawable
            .iter()
            .map(|&op| self.entries[op as usize].symbol.category() as usize + 1)
            .max()
            .unwrap_or(0);

        self.by_category = (0..n_categories)
            .map(|c| {
                let ops = drawable
                    .iter()
                    .filter(|&&op| self.entries[op as usize].symbol.category() as usize == c);
                Collection::build(&self.entries, ops)
            })
            .collect();
    }

    /// Halves the weight of every automatically defined symbol, so newly
    /// learned subroutines don't dominate the selection indefinitely. A unit
    /// weight isn't halved to zero.
    pub fn scale_adf_weights(&mut self) {
        for e in self.entries.iter_mut().filter(|e| e.symbol.auto_defined()) {
            e.weight -= e.weight / 2;
        }
        self.rebuild();
    }

    /// A random symbol, probability proportional to its weight.
    pub fn roulette<R: Rng>(&self, rng: &mut R) -> Option<Opcode> {
        self.all.roulette(rng)
    }

    /// A random symbol of category `c`.
    pub fn roulette_category<R: Rng>(&self, c: Category, rng: &mut R) -> Option<Opcode> {
        self.by_category.get(c as usize)?.roulette(rng)
    }

    /// A random terminal of category `c`.
    pub fn roulette_terminal<R: Rng>(&self, c: Category, rng: &mut R) -> Option<Opcode> {
        self.by_category.get(c as usize)?.roulette_terminal(rng)
    }

    /// Opcode of the `n`-th ADF argument placeholder.
    pub fn arg(&self, n: usize) -> Option<Opcode> {
        self.arguments.get(n).copied()
    }

    pub fn decode(&self, op: Opcode) -> Option<&dyn Symbol> {
        self.entries.get(op as usize).map(|e| e.symbol.as_ref())
    }

    /// First symbol named `name` (names aren't guaranteed to be unique).
    pub fn decode_name(&self, name: &str) -> Option<Opcode> {
        self.entries
            .iter()
            .position(|e| e.symbol.name() == name)
            .map(|i| i as Opcode)
    }

    pub fn weight(&self, op: Opcode) -> u32 {
        self.entries.get(op as usize).map_or(0, |e| e.weight)
    }

    /// Number of categories in use.
    pub fn categories(&self) -> usize {
        self.by_category.len()
    }

    /// Number of terminals of category `c`.
    pub fn terminals(&self, c: Category) -> usize {
        self.by_category
            .get(c as usize)
            .map_or(0, |coll| coll.terminals.len())
    }

    /// Number of registered symbols (argument placeholders excluded).
    pub fn len(&self) -> usize {
        self.entries.len() - self.arguments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn adts(&self) -> &[Opcode] {
        &self.all.adt
    }

    pub fn adfs(&self) -> &[Opcode] {
        &self.all.adf
    }

    /// Drawable symbols with their opcodes and weights.
    pub fn iter(&self) -> impl Iterator<Item = (Opcode, &dyn Symbol, u32)> + '_ {
        self.all
            .symbols
            .iter()
            .map(move |&op| (op, self.entries[op as usize].symbol.as_ref(), self.entries[op as usize].weight))
    }

    /// Deterministic terminal gene of category `c`: the first terminal
    /// registered for `c`. Used to pad genome cells that carry no code.
    pub fn filler(&self, c: Category) -> Option<Gene> {
        let op = *self.by_category.get(c as usize)?.terminals.first()?;
        let s = self.decode(op)?;
        Some(if s.parametric() {
            Gene::parametric(op, 0.0)
        } else {
            Gene::terminal(op)
        })
    }

    /// Every category used by the set, either as a symbol category or as a
    /// function argument, must contain a terminal: otherwise random
    /// generation couldn't close the programs.
    pub fn enough_terminals(&self) -> bool {
        let mut need: BTreeSet<Category> = (0..self.categories() as Category).collect();
        for (_, s, _) in self.iter() {
            need.extend(s.arg_categories().iter().copied());
        }

        need.iter().all(|&c| {
            self.by_category
                .get(c as usize)
                .map_or(false, |coll| coll.terminals_wheel.is_some())
        })
    }

    /// Internal consistency check.
    pub fn check(&self) -> bool {
        if !self.all.check("all", &self.entries) {
            return false;
        }
        for (c, coll) in self.by_category.iter().enumerate() {
            if !coll.check(&format!("category {}", c), &self.entries) {
                return false;
            }
        }
        if !self.enough_terminals() {
            error!("Symbol set doesn't contain enough terminals");
            return false;
        }
        true
    }
}

impl Default for SymbolSet {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SymbolSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sum = 0u64;
        for (op, s, w) in self.iter() {
            write!(f, "{}", s.display())?;
            let args = s.arg_categories();
            if !args.is_empty() {
                let list: Vec<String> = args.iter().map(|c| c.to_string()).collect();
                write!(f, "({})", list.join(", "))?;
            }
            writeln!(
                f,
                " -> {} (opcode {}, parametric {}, weight {})",
                s.category(),
                op,
                s.parametric(),
                w
            )?;
            sum += u64::from(w);
        }
        writeln!(f, "Sum: {}", sum)
    }
}
