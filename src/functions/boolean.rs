//! Boolean primitives.
//!
//! Together with `FLT`/`FGT` they let strongly typed programs mix a real
//! category with a boolean one. A non boolean argument is treated as empty.

use super::traits::Symbol;
use crate::engines::evaluation::interpreter::Interpreter;
use crate::types::{Category, Value};

fn bool_arg(interp: &mut Interpreter<'_>, i: usize) -> Option<bool> {
    interp.fetch_arg(i)?.as_bool()
}

// --- True / False ---
pub struct True {
    category: Category,
}

impl True {
    pub fn new(category: Category) -> Self {
        Self { category }
    }
}

impl Symbol for True {
    fn name(&self) -> &str { "TRUE" }
    fn category(&self) -> Category { self.category }
    fn eval(&self, _interp: &mut Interpreter<'_>) -> Option<Value> {
        Some(Value::Bool(true))
    }
}

pub struct False {
    category: Category,
}

impl False {
    pub fn new(category: Category) -> Self {
        Self { category }
    }
}

impl Symbol for False {
    fn name(&self) -> &str { "FALSE" }
    fn category(&self) -> Category { self.category }
    fn eval(&self, _interp: &mut Interpreter<'_>) -> Option<Value> {
        Some(Value::Bool(false))
    }
}

// --- And ---
/// Short-circuit: the second argument is skipped when the first is false.
pub struct And {
    category: Category,
    args: [Category; 2],
}

impl And {
    pub fn new(category: Category) -> Self {
        Self { category, args: [category; 2] }
    }
}

impl Symbol for And {
    fn name(&self) -> &str { "AND" }
    fn category(&self) -> Category { self.category }
    fn arg_categories(&self) -> &[Category] { &self.args }
    fn associative(&self) -> bool { true }
    fn eval(&self, interp: &mut Interpreter<'_>) -> Option<Value> {
        if !bool_arg(interp, 0)? {
            return Some(Value::Bool(false));
        }
        bool_arg(interp, 1).map(Value::Bool)
    }
}

// --- Or ---
pub struct Or {
    category: Category,
    args: [Category; 2],
}

impl Or {
    pub fn new(category: Category) -> Self {
        Self { category, args: [category; 2] }
    }
}

impl Symbol for Or {
    fn name(&self) -> &str { "OR" }
    fn category(&self) -> Category { self.category }
    fn arg_categories(&self) -> &[Category] { &self.args }
    fn associative(&self) -> bool { true }
    fn eval(&self, interp: &mut Interpreter<'_>) -> Option<Value> {
        if bool_arg(interp, 0)? {
            return Some(Value::Bool(true));
        }
        bool_arg(interp, 1).map(Value::Bool)
    }
}

// --- Not ---
pub struct Not {
    category: Category,
    args: [Category; 1],
}

impl Not {
    pub fn new(category: Category) -> Self {
        Self { category, args: [category] }
    }
}

impl Symbol for Not {
    fn name(&self) -> &str { "NOT" }
    fn category(&self) -> Category { self.category }
    fn arg_categories(&self) -> &[Category] { &self.args }
    fn eval(&self, interp: &mut Interpreter<'_>) -> Option<Value> {
        bool_arg(interp, 0).map(|b| Value::Bool(!b))
    }
}
