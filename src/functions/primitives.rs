//! Real-valued primitive functions.
//!
//! Every function propagates the empty value (`None`) through `?` and maps
//! non-finite results to `None`, so no input can make a program fail hard.

use super::traits::Symbol;
use crate::engines::evaluation::interpreter::Interpreter;
use crate::types::{Category, Value};

/// Tolerance used by the equality-based primitives.
const SMALL: f64 = 1e-10;

fn real(v: Value) -> Option<f64> {
    match v {
        Value::Float(f) => Some(f),
        Value::Integer(i) => Some(i as f64),
        _ => None,
    }
}

fn finite(v: f64) -> Option<Value> {
    if v.is_finite() {
        Some(Value::Float(v))
    } else {
        None
    }
}

fn is_small(v: f64) -> bool {
    v.abs() < SMALL
}

/// Fetches argument `i` as a real number.
fn real_arg(interp: &mut Interpreter<'_>, i: usize) -> Option<f64> {
    interp.fetch_arg(i).and_then(real)
}

// --- Abs ---
pub struct Abs {
    category: Category,
    args: [Category; 1],
}

impl Abs {
    pub fn new(category: Category) -> Self {
        Self { category, args: [category] }
    }
}

impl Symbol for Abs {
    fn name(&self) -> &str { "FABS" }
    fn category(&self) -> Category { self.category }
    fn arg_categories(&self) -> &[Category] { &self.args }
    fn eval(&self, interp: &mut Interpreter<'_>) -> Option<Value> {
        finite(real_arg(interp, 0)?.abs())
    }
}

// --- Add ---
pub struct Add {
    category: Category,
    args: [Category; 2],
}

impl Add {
    pub fn new(category: Category) -> Self {
        Self { category, args: [category; 2] }
    }
}

impl Symbol for Add {
    fn name(&self) -> &str { "FADD" }
    fn category(&self) -> Category { self.category }
    fn arg_categories(&self) -> &[Category] { &self.args }
    fn associative(&self) -> bool { true }
    fn eval(&self, interp: &mut Interpreter<'_>) -> Option<Value> {
        let a0 = real_arg(interp, 0)?;
        let a1 = real_arg(interp, 1)?;
        finite(a0 + a1)
    }
}

// --- Sub ---
pub struct Sub {
    category: Category,
    args: [Category; 2],
}

impl Sub {
    pub fn new(category: Category) -> Self {
        Self { category, args: [category; 2] }
    }
}

impl Symbol for Sub {
    fn name(&self) -> &str { "FSUB" }
    fn category(&self) -> Category { self.category }
    fn arg_categories(&self) -> &[Category] { &self.args }
    fn eval(&self, interp: &mut Interpreter<'_>) -> Option<Value> {
        let a0 = real_arg(interp, 0)?;
        let a1 = real_arg(interp, 1)?;
        finite(a0 - a1)
    }
}

// --- Mul ---
pub struct Mul {
    category: Category,
    args: [Category; 2],
}

impl Mul {
    pub fn new(category: Category) -> Self {
        Self { category, args: [category; 2] }
    }
}

impl Symbol for Mul {
    fn name(&self) -> &str { "FMUL" }
    fn category(&self) -> Category { self.category }
    fn arg_categories(&self) -> &[Category] { &self.args }
    fn associative(&self) -> bool { true }
    fn eval(&self, interp: &mut Interpreter<'_>) -> Option<Value> {
        let a0 = real_arg(interp, 0)?;
        let a1 = real_arg(interp, 1)?;
        finite(a0 * a1)
    }
}

// --- Div ---
pub struct Div {
    category: Category,
    args: [Category; 2],
}

impl Div {
    pub fn new(category: Category) -> Self {
        Self { category, args: [category; 2] }
    }
}

impl Symbol for Div {
    fn name(&self) -> &str { "FDIV" }
    fn category(&self) -> Category { self.category }
    fn arg_categories(&self) -> &[Category] { &self.args }
    fn eval(&self, interp: &mut Interpreter<'_>) -> Option<Value> {
        let a0 = real_arg(interp, 0)?;
        let a1 = real_arg(interp, 1)?;
        finite(a0 / a1)
    }
}

// --- Idiv ---
/// Integer division: `floor(a / b)`.
pub struct Idiv {
    category: Category,
    args: [Category; 2],
}

impl Idiv {
    pub fn new(category: Category) -> Self {
        Self { category, args: [category; 2] }
    }
}

impl Symbol for Idiv {
    fn name(&self) -> &str { "FIDIV" }
    fn category(&self) -> Category { self.category }
    fn arg_categories(&self) -> &[Category] { &self.args }
    fn eval(&self, interp: &mut Interpreter<'_>) -> Option<Value> {
        let a0 = real_arg(interp, 0)?;
        let a1 = real_arg(interp, 1)?;
        finite((a0 / a1).floor())
    }
}

// --- Mod ---
pub struct Mod {
    category: Category,
    args: [Category; 2],
}

impl Mod {
    pub fn new(category: Category) -> Self {
        Self { category, args: [category; 2] }
    }
}

impl Symbol for Mod {
    fn name(&self) -> &str { "FMOD" }
    fn category(&self) -> Category { self.category }
    fn arg_categories(&self) -> &[Category] { &self.args }
    fn eval(&self, interp: &mut Interpreter<'_>) -> Option<Value> {
        let a0 = real_arg(interp, 0)?;
        let a1 = real_arg(interp, 1)?;
        finite(a0 % a1)
    }
}

// --- Max ---
pub struct Max {
    category: Category,
    args: [Category; 2],
}

impl Max {
    pub fn new(category: Category) -> Self {
        Self { category, args: [category; 2] }
    }
}

impl Symbol for Max {
    fn name(&self) -> &str { "FMAX" }
    fn category(&self) -> Category { self.category }
    fn arg_categories(&self) -> &[Category] { &self.args }
    fn associative(&self) -> bool { true }
    fn eval(&self, interp: &mut Interpreter<'_>) -> Option<Value> {
        let a0 = real_arg(interp, 0)?;
        let a1 = real_arg(interp, 1)?;
        finite(a0.max(a1))
    }
}

// --- Ln ---
/// Natural logarithm; empty for non-positive arguments.
pub struct Ln {
    category: Category,
    args: [Category; 1],
}

impl Ln {
    pub fn new(category: Category) -> Self {
        Self { category, args: [category] }
    }
}

impl Symbol for Ln {
    fn name(&self) -> &str { "FLN" }
    fn category(&self) -> Category { self.category }
    fn arg_categories(&self) -> &[Category] { &self.args }
    fn eval(&self, interp: &mut Interpreter<'_>) -> Option<Value> {
        finite(real_arg(interp, 0)?.ln())
    }
}

// --- Sqrt ---
pub struct Sqrt {
    category: Category,
    args: [Category; 1],
}

impl Sqrt {
    pub fn new(category: Category) -> Self {
        Self { category, args: [category] }
    }
}

impl Symbol for Sqrt {
    fn name(&self) -> &str { "FSQRT" }
    fn category(&self) -> Category { self.category }
    fn arg_categories(&self) -> &[Category] { &self.args }
    fn eval(&self, interp: &mut Interpreter<'_>) -> Option<Value> {
        let v = real_arg(interp, 0)?;
        if v < 0.0 {
            return None;
        }
        finite(v.sqrt())
    }
}

// --- Sin ---
pub struct Sin {
    category: Category,
    args: [Category; 1],
}

impl Sin {
    pub fn new(category: Category) -> Self {
        Self { category, args: [category] }
    }
}

impl Symbol for Sin {
    fn name(&self) -> &str { "FSIN" }
    fn category(&self) -> Category { self.category }
    fn arg_categories(&self) -> &[Category] { &self.args }
    fn eval(&self, interp: &mut Interpreter<'_>) -> Option<Value> {
        finite(real_arg(interp, 0)?.sin())
    }
}

// --- Ifl ---
/// `if a < b then c else d`. Only the selected branch is evaluated.
pub struct Ifl {
    category: Category,
    args: [Category; 4],
}

impl Ifl {
    pub fn new(test: Category, category: Category) -> Self {
        Self { category, args: [test, test, category, category] }
    }
}

impl Symbol for Ifl {
    fn name(&self) -> &str { "FIFL" }
    fn category(&self) -> Category { self.category }
    fn arg_categories(&self) -> &[Category] { &self.args }
    fn eval(&self, interp: &mut Interpreter<'_>) -> Option<Value> {
        let a0 = real_arg(interp, 0)?;
        let a1 = real_arg(interp, 1)?;
        if a0 < a1 {
            interp.fetch_arg(2)
        } else {
            interp.fetch_arg(3)
        }
    }
}

// --- Ife ---
/// `if a == b then c else d`.
pub struct Ife {
    category: Category,
    args: [Category; 4],
}

impl Ife {
    pub fn new(test: Category, category: Category) -> Self {
        Self { category, args: [test, test, category, category] }
    }
}

impl Symbol for Ife {
    fn name(&self) -> &str { "FIFE" }
    fn category(&self) -> Category { self.category }
    fn arg_categories(&self) -> &[Category] { &self.args }
    fn eval(&self, interp: &mut Interpreter<'_>) -> Option<Value> {
        let a0 = real_arg(interp, 0)?;
        let a1 = real_arg(interp, 1)?;
        if is_small(a0 - a1) {
            interp.fetch_arg(2)
        } else {
            interp.fetch_arg(3)
        }
    }
}

// --- Ifz ---
/// `if a == 0 then b else c`.
pub struct Ifz {
    category: Category,
    args: [Category; 3],
}

impl Ifz {
    pub fn new(category: Category) -> Self {
        Self { category, args: [category; 3] }
    }
}

impl Symbol for Ifz {
    fn name(&self) -> &str { "FIFZ" }
    fn category(&self) -> Category { self.category }
    fn arg_categories(&self) -> &[Category] { &self.args }
    fn eval(&self, interp: &mut Interpreter<'_>) -> Option<Value> {
        let a0 = real_arg(interp, 0)?;
        if is_small(a0) {
            interp.fetch_arg(1)
        } else {
            interp.fetch_arg(2)
        }
    }
}

// --- Lt ---
/// `a < b`, producing a boolean value in its own category.
pub struct Lt {
    category: Category,
    args: [Category; 2],
}

impl Lt {
    pub fn new(category: Category, operand: Category) -> Self {
        Self { category, args: [operand; 2] }
    }
}

impl Symbol for Lt {
    fn name(&self) -> &str { "FLT" }
    fn category(&self) -> Category { self.category }
    fn arg_categories(&self) -> &[Category] { &self.args }
    fn eval(&self, interp: &mut Interpreter<'_>) -> Option<Value> {
        let a0 = real_arg(interp, 0)?;
        let a1 = real_arg(interp, 1)?;
        Some(Value::Bool(a0 < a1))
    }
}

// --- Gt ---
pub struct Gt {
    category: Category,
    args: [Category; 2],
}

impl Gt {
    pub fn new(category: Category, operand: Category) -> Self {
        Self { category, args: [operand; 2] }
    }
}

impl Symbol for Gt {
    fn name(&self) -> &str { "FGT" }
    fn category(&self) -> Category { self.category }
    fn arg_categories(&self) -> &[Category] { &self.args }
    fn eval(&self, interp: &mut Interpreter<'_>) -> Option<Value> {
        let a0 = real_arg(interp, 0)?;
        let a1 = real_arg(interp, 1)?;
        Some(Value::Bool(a0 > a1))
    }
}
