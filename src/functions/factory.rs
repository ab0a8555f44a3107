use super::boolean::{And, False, Not, Or, True};
use super::primitives::*;
use super::registry::SymbolSet;
use super::terminals::{Integer, Number};
use super::traits::Symbol;
use crate::error::{GpError, Result};
use crate::types::{Category, Opcode};

/// Real functions whose arguments share the output category.
pub const REAL_FUNCTIONS: &[&str] = &[
    "FABS", "FADD", "FSUB", "FMUL", "FDIV", "FIDIV", "FMOD", "FMAX", "FLN", "FSQRT", "FSIN",
    "FIFZ",
];

/// Functions with a test category distinct from the output one.
pub const COMPARISON_FUNCTIONS: &[&str] = &["FIFL", "FIFE", "FLT", "FGT"];

/// Boolean functions and constants.
pub const BOOLEAN_SYMBOLS: &[&str] = &["AND", "OR", "NOT", "TRUE", "FALSE"];

/// Parametric terminals.
pub const NUMBERS: &[&str] = &["REAL", "INT"];

/// Builds standard symbols from their name and category signature.
///
/// The first category is the one of the produced value. `FIFL`/`FIFE`
/// accept a second category for the compared operands, `FLT`/`FGT` a
/// second category for their operands. `REAL` and `INT` draw parameters
/// in the factory ranges. Boolean symbols take a single category.
pub struct SymbolFactory {
    real_range: (f64, f64),
    int_range: (i64, i64),
}

impl Default for SymbolFactory {
    fn default() -> Self {
        Self {
            real_range: (-10.0, 10.0),
            int_range: (-128, 128),
        }
    }
}

impl SymbolFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_real_range(mut self, min: f64, max: f64) -> Self {
        self.real_range = (min, max);
        self
    }

    pub fn with_int_range(mut self, min: i64, max: i64) -> Self {
        self.int_range = (min, max);
        self
    }

    pub fn make(&self, name: &str, categories: &[Category]) -> Result<Box<dyn Symbol>> {
        let c0 = *categories.first().unwrap_or(&0);
        let c1 = *categories.get(1).unwrap_or(&c0);

        let s: Box<dyn Symbol> = match name {
            "FABS" => Box::new(Abs::new(c0)),
            "FADD" => Box::new(Add::new(c0)),
            "FSUB" => Box::new(Sub::new(c0)),
            "FMUL" => Box::new(Mul::new(c0)),
            "FDIV" => Box::new(Div::new(c0)),
            "FIDIV" => Box::new(Idiv::new(c0)),
            "FMOD" => Box::new(Mod::new(c0)),
            "FMAX" => Box::new(Max::new(c0)),
            "FLN" => Box::new(Ln::new(c0)),
            "FSQRT" => Box::new(Sqrt::new(c0)),
            "FSIN" => Box::new(Sin::new(c0)),
            "FIFZ" => Box::new(Ifz::new(c0)),
            "FIFL" => Box::new(Ifl::new(c1, c0)),
            "FIFE" => Box::new(Ife::new(c1, c0)),
            "FLT" => Box::new(Lt::new(c0, c1)),
            "FGT" => Box::new(Gt::new(c0, c1)),
            "AND" => Box::new(And::new(c0)),
            "OR" => Box::new(Or::new(c0)),
            "NOT" => Box::new(Not::new(c0)),
            "TRUE" => Box::new(True::new(c0)),
            "FALSE" => Box::new(False::new(c0)),
            "REAL" => Box::new(Number::new(c0, self.real_range.0, self.real_range.1)),
            "INT" => Box::new(Integer::new(c0, self.int_range.0, self.int_range.1)),
            _ => return Err(GpError::InvalidSymbol(format!("unknown symbol {}", name))),
        };
        Ok(s)
    }

    /// Builds `name` and registers it in `sset`.
    pub fn insert(
        &self,
        sset: &mut SymbolSet,
        name: &str,
        categories: &[Category],
        weight: f64,
    ) -> Result<Opcode> {
        sset.insert(self.make(name, categories)?, weight)
    }

    /// Registers every real function plus `REAL` in category `c`.
    pub fn insert_reals(&self, sset: &mut SymbolSet, c: Category) -> Result<Vec<Opcode>> {
        REAL_FUNCTIONS
            .iter()
            .chain(std::iter::once(&"REAL"))
            .map(|name| self.insert(sset, name, &[c], 1.0))
            .collect()
    }

    /// Registers the boolean functions and constants in category `c`.
    pub fn insert_booleans(&self, sset: &mut SymbolSet, c: Category) -> Result<Vec<Opcode>> {
        BOOLEAN_SYMBOLS
            .iter()
            .map(|name| self.insert(sset, name, &[c], 1.0))
            .collect()
    }

    pub fn names() -> impl Iterator<Item = &'static str> {
        REAL_FUNCTIONS
            .iter()
            .chain(COMPARISON_FUNCTIONS)
            .chain(BOOLEAN_SYMBOLS)
            .chain(NUMBERS)
            .copied()
    }
}
