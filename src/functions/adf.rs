//! Automatically defined functions and terminals.
//!
//! Both are symbols whose body is an individual discovered during the run.
//! An ADT has no argument and simply evaluates its body; an ADF body
//! contains `ARG_i` placeholders resolved against the arguments of the
//! calling gene.

use super::traits::Symbol;
use crate::engines::evaluation::interpreter::Interpreter;
use crate::engines::generation::individual::Individual;
use crate::error::{GpError, Result};
use crate::types::{Category, Value};

fn check_body(code: &Individual) -> Result<()> {
    if code.eff_size() < 2 {
        return Err(GpError::InvalidSymbol(
            "the body of an auto defined symbol needs at least two active genes".to_string(),
        ));
    }
    Ok(())
}

// --- Adt ---
pub struct Adt {
    name: String,
    code: Individual,
}

impl Adt {
    pub fn new(id: usize, code: Individual) -> Result<Self> {
        check_body(&code)?;
        Ok(Self {
            name: format!("ADT_{}", id),
            code,
        })
    }

    pub fn code(&self) -> &Individual {
        &self.code
    }
}

impl Symbol for Adt {
    fn name(&self) -> &str {
        &self.name
    }
    fn category(&self) -> Category {
        self.code.category()
    }
    fn auto_defined(&self) -> bool {
        true
    }
    fn eval(&self, interp: &mut Interpreter<'_>) -> Option<Value> {
        Interpreter::new(&self.code, interp.symbols())
            .with_example(interp.example())
            .run()
    }
    fn debug(&self) -> bool {
        self.code.eff_size() >= 2
    }
}

// --- Adf ---
pub struct Adf {
    name: String,
    code: Individual,
    args: Vec<Category>,
}

impl Adf {
    /// `args` are the categories of the formal arguments (the `i`-th one is
    /// the category of `ARG_i` inside `code`).
    pub fn new(id: usize, code: Individual, args: Vec<Category>) -> Result<Self> {
        check_body(&code)?;
        if args.is_empty() {
            return Err(GpError::InvalidSymbol(
                "an ADF needs at least one argument".to_string(),
            ));
        }
        Ok(Self {
            name: format!("ADF_{}", id),
            code,
            args,
        })
    }

    pub fn code(&self) -> &Individual {
        &self.code
    }
}

impl Symbol for Adf {
    fn name(&self) -> &str {
        &self.name
    }
    fn category(&self) -> Category {
        self.code.category()
    }
    fn arg_categories(&self) -> &[Category] {
        &self.args
    }
    fn auto_defined(&self) -> bool {
        true
    }
    fn eval(&self, interp: &mut Interpreter<'_>) -> Option<Value> {
        let sset = interp.symbols();
        let example = interp.example();
        Interpreter::with_context(&self.code, sset, interp)
            .with_example(example)
            .run()
    }
    fn debug(&self) -> bool {
        self.code.eff_size() >= 2 && !self.args.is_empty()
    }
}
