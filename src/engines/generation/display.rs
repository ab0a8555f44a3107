//! Textual renderings of an individual.
//!
//! Every view borrows the symbol set to decode opcodes, so they're exposed
//! as small wrappers implementing `Display`:
//!
//! ```ignore
//! println!("{}", ind.in_line(&sset));
//! ```

use std::fmt;

use super::gene::{Gene, GeneData, Locus};
use super::individual::Individual;
use crate::functions::registry::SymbolSet;

fn label(g: &Gene, sset: &SymbolSet) -> String {
    match (sset.decode(g.sym), &g.data) {
        (Some(s), GeneData::Param(p)) => s.display_param(*p),
        (Some(s), _) => s.display(),
        (None, _) => format!("?{}", g.sym),
    }
}

impl Individual {
    /// Prefix, single line form: `FADD(X, FMUL(X, 2))`.
    pub fn in_line<'a>(&'a self, sset: &'a SymbolSet) -> InLine<'a> {
        InLine { prg: self, sset }
    }

    /// One active gene per line. The short form omits the categories of
    /// the loci.
    pub fn list<'a>(&'a self, sset: &'a SymbolSet, short: bool) -> List<'a> {
        List {
            prg: self,
            sset,
            short,
        }
    }

    /// Indented tree; nested applications of the same associative function
    /// are flattened.
    pub fn tree<'a>(&'a self, sset: &'a SymbolSet) -> Tree<'a> {
        Tree { prg: self, sset }
    }

    /// Every gene, introns included.
    pub fn dump<'a>(&'a self, sset: &'a SymbolSet) -> Dump<'a> {
        Dump { prg: self, sset }
    }

    /// Graphviz (dot) description of the active code.
    pub fn graphviz<'a>(&'a self, sset: &'a SymbolSet) -> Graphviz<'a> {
        Graphviz { prg: self, sset }
    }
}

pub struct InLine<'a> {
    prg: &'a Individual,
    sset: &'a SymbolSet,
}

impl InLine<'_> {
    fn write(&self, f: &mut fmt::Formatter<'_>, l: Locus) -> fmt::Result {
        let g = &self.prg[l];
        write!(f, "{}", label(g, self.sset))?;

        if g.is_function() {
            write!(f, "(")?;
            for (i, &a) in g.args().iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                self.write(f, a)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

impl fmt::Display for InLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prg.is_empty() {
            return Ok(());
        }
        self.write(f, self.prg.best())
    }
}

pub struct List<'a> {
    prg: &'a Individual,
    sset: &'a SymbolSet,
    short: bool,
}

impl List<'_> {
    fn locus(&self, l: Locus) -> String {
        if self.short {
            format!("[{}]", l.index)
        } else {
            l.to_string()
        }
    }
}

impl fmt::Display for List<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for l in self.prg.active() {
            let g = &self.prg[l];
            write!(f, "{} {}", self.locus(l), label(g, self.sset))?;
            for &a in g.args() {
                write!(f, " {}", self.locus(a))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

pub struct Tree<'a> {
    prg: &'a Individual,
    sset: &'a SymbolSet,
}

impl Tree<'_> {
    /// Arguments of `l`, replacing arguments that repeat the same
    /// associative function with their own arguments.
    fn children(&self, l: Locus, out: &mut Vec<Locus>) {
        let g = &self.prg[l];
        let associative = self.sset.decode(g.sym).map_or(false, |s| s.associative());

        for &a in g.args() {
            if associative && self.prg[a].sym == g.sym {
                self.children(a, out);
            } else {
                out.push(a);
            }
        }
    }

    fn write(&self, f: &mut fmt::Formatter<'_>, l: Locus, indent: usize) -> fmt::Result {
        writeln!(f, "{:indent$}{}", "", label(&self.prg[l], self.sset), indent = indent)?;

        let mut children = Vec::new();
        self.children(l, &mut children);
        for c in children {
            self.write(f, c, indent + 2)?;
        }
        Ok(())
    }
}

impl fmt::Display for Tree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prg.is_empty() {
            return Ok(());
        }
        self.write(f, self.prg.best(), 0)
    }
}

pub struct Dump<'a> {
    prg: &'a Individual,
    sset: &'a SymbolSet,
}

impl fmt::Display for Dump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.prg.size() {
            for c in 0..self.prg.categories() {
                let l = Locus::new(i, c as u32);
                let g = &self.prg[l];
                let mark = if l == self.prg.best() { '*' } else { ' ' };
                write!(f, "{}{} {}", mark, l, label(g, self.sset))?;
                for &a in g.args() {
                    write!(f, " {}", a)?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

pub struct Graphviz<'a> {
    prg: &'a Individual,
    sset: &'a SymbolSet,
}

impl fmt::Display for Graphviz<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "graph {{")?;
        for l in self.prg.active() {
            let g = &self.prg[l];
            writeln!(
                f,
                "g{}_{} [label={:?}, shape={}];",
                l.index,
                l.category,
                label(g, self.sset),
                if g.is_function() { "box" } else { "circle" }
            )?;
            for &a in g.args() {
                writeln!(f, "g{}_{} -- g{}_{};", l.index, l.category, a.index, a.category)?;
            }
        }
        writeln!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::primitives::{Add, Mul};
    use crate::functions::terminals::{Number, Variable};

    fn sample() -> (SymbolSet, Individual) {
        let mut sset = SymbolSet::new();
        let add = sset.insert(Box::new(Add::new(0)), 1.0).unwrap();
        let mul = sset.insert(Box::new(Mul::new(0)), 1.0).unwrap();
        let x = sset.insert(Box::new(Variable::new("X", 0, 0)), 1.0).unwrap();
        let num = sset.insert(Box::new(Number::new(0, 0.0, 10.0)), 1.0).unwrap();

        // ADD(ADD(X, 3), MUL(X, X))
        let ind = Individual::from_genes(
            &sset,
            vec![
                Gene::function(add, &[Locus::new(1, 0), Locus::new(2, 0)]),
                Gene::function(add, &[Locus::new(3, 0), Locus::new(4, 0)]),
                Gene::function(mul, &[Locus::new(3, 0), Locus::new(3, 0)]),
                Gene::terminal(x),
                Gene::parametric(num, 3.0),
            ],
        )
        .unwrap();
        (sset, ind)
    }

    #[test]
    fn test_in_line() {
        let (sset, ind) = sample();
        assert_eq!(
            ind.in_line(&sset).to_string(),
            "FADD(FADD(X, 3), FMUL(X, X))"
        );
    }

    #[test]
    fn test_tree_flattens_associative_functions() {
        let (sset, ind) = sample();
        let expected = "FADD\n  X\n  3\n  FMUL\n    X\n    X\n";
        assert_eq!(ind.tree(&sset).to_string(), expected);
    }

    #[test]
    fn test_list_short_form() {
        let (sset, ind) = sample();
        let listing = ind.list(&sset, true).to_string();
        assert_eq!(listing.lines().count(), ind.eff_size());
        assert!(listing.starts_with("[0] FADD [1] [2]\n"));
    }

    #[test]
    fn test_graphviz_and_dump() {
        let (sset, ind) = sample();
        let dot = ind.graphviz(&sset).to_string();
        assert!(dot.starts_with("graph {"));
        assert!(dot.contains("g0_0 -- g1_0;"));

        let dump = ind.dump(&sset).to_string();
        assert_eq!(dump.lines().count(), ind.size() * ind.categories());
        assert!(dump.starts_with("*[0,0] FADD"));
    }
}
