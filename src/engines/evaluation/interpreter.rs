use log::error;

use crate::engines::generation::gene::Locus;
use crate::engines::generation::individual::Individual;
use crate::functions::registry::SymbolSet;
use crate::types::Value;
use crate::utils::Matrix;

/// Calling environment of an ADF body.
///
/// When an ADF is evaluated its body runs in a fresh interpreter; the
/// argument placeholders of the body pull their values from the caller
/// through this trait. The caller is positioned on the ADF gene for the
/// whole nested evaluation.
pub trait AdfContext {
    /// Value of the `i`-th argument of the calling gene.
    fn fetch_arg(&mut self, i: usize) -> Option<Value>;

    /// Locus of the `i`-th argument of the calling gene.
    fn arg_locus(&self, i: usize) -> Option<Locus>;
}

/// Executes the active code of an individual.
///
/// Values of sub-expressions are memoized per locus for the duration of a
/// run, so a gene referenced by many functions is evaluated once. Only loci
/// reachable from the starting locus are ever visited.
pub struct Interpreter<'a> {
    prg: &'a Individual,
    sset: &'a SymbolSet,
    example: Option<&'a [Value]>,
    context: Option<&'a mut (dyn AdfContext + 'a)>,
    ip: Locus,
    memo: Matrix<Option<Option<Value>>>,
}

impl<'a> Interpreter<'a> {
    pub fn new(prg: &'a Individual, sset: &'a SymbolSet) -> Self {
        Self {
            prg,
            sset,
            example: None,
            context: None,
            ip: prg.best(),
            memo: Matrix::new(prg.size(), prg.categories(), None),
        }
    }

    /// Interpreter for the body of an ADF called from `context`.
    pub fn with_context(
        prg: &'a Individual,
        sset: &'a SymbolSet,
        context: &'a mut (dyn AdfContext + 'a),
    ) -> Self {
        let mut interp = Self::new(prg, sset);
        interp.context = Some(context);
        interp
    }

    /// Binds the feature vector read by the input variables.
    pub fn with_example(mut self, example: Option<&'a [Value]>) -> Self {
        self.example = example;
        self
    }

    /// Value of the individual (evaluated from its `best` locus).
    pub fn run(&mut self) -> Option<Value> {
        self.run_locus(self.prg.best())
    }

    /// Value of the sub-program rooted at `l`.
    pub fn run_locus(&mut self, l: Locus) -> Option<Value> {
        if self.prg.is_empty() {
            return None;
        }

        self.memo = Matrix::new(self.prg.size(), self.prg.categories(), None);
        self.ip = l;

        let sset = self.sset;
        let s = sset.decode(self.prg[l].sym)?;
        s.eval(self)
    }

    /// Value of the `i`-th argument of the current gene.
    pub fn fetch_arg(&mut self, i: usize) -> Option<Value> {
        let l = self.prg[self.ip].arg_locus(i)?;
        debug_assert!(self.ip < l);

        if let Some(cached) = &self.memo[l] {
            return cached.clone();
        }

        let sset = self.sset;
        let s = sset.decode(self.prg[l].sym)?;

        let caller = self.ip;
        self.ip = l;
        let v = s.eval(self);
        self.ip = caller;

        self.memo[l] = Some(v.clone());
        v
    }

    /// Parameter of the current (parametric) gene.
    pub fn fetch_param(&self) -> Option<f64> {
        self.prg[self.ip].param()
    }

    /// Value of the `i`-th argument of the calling ADF gene. Outside an ADF
    /// body there is no such value.
    pub fn fetch_adf_arg(&mut self, i: usize) -> Option<Value> {
        match self.context.as_mut() {
            Some(ctx) => ctx.fetch_arg(i),
            None => None,
        }
    }

    /// `i`-th feature of the bound example.
    pub fn fetch_var(&self, i: usize) -> Option<Value> {
        self.example?.get(i).cloned()
    }

    pub fn symbols(&self) -> &'a SymbolSet {
        self.sset
    }

    pub fn example(&self) -> Option<&'a [Value]> {
        self.example
    }

    pub fn program(&self) -> &'a Individual {
        self.prg
    }

    /// Locus of the gene being evaluated.
    pub fn ip(&self) -> Locus {
        self.ip
    }

    pub fn has_context(&self) -> bool {
        self.context.is_some()
    }

    pub fn check(&self) -> bool {
        if self.prg.is_empty() {
            return true;
        }

        if self.ip.index >= self.prg.size() || self.ip.category as usize >= self.prg.categories() {
            error!("Interpreter: instruction pointer {} out of range", self.ip);
            return false;
        }
        if self.memo.rows() != self.prg.size() || self.memo.cols() != self.prg.categories() {
            error!("Interpreter: memo table doesn't match the program shape");
            return false;
        }
        self.prg.check(self.sset)
    }
}

impl AdfContext for Interpreter<'_> {
    fn fetch_arg(&mut self, i: usize) -> Option<Value> {
        Interpreter::fetch_arg(self, i)
    }

    fn arg_locus(&self, i: usize) -> Option<Locus> {
        self.prg[self.ip].arg_locus(i)
    }
}
