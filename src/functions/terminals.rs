use rand::{Rng, RngCore};

use super::traits::Symbol;
use crate::engines::evaluation::interpreter::Interpreter;
use crate::types::{Category, Value};

// --- Constant ---
/// Terminal with a fixed value.
pub struct Constant {
    name: String,
    category: Category,
    value: Value,
}

impl Constant {
    pub fn new(value: Value, category: Category) -> Self {
        let name = match &value {
            Value::Float(v) => v.to_string(),
            other => other.to_string(),
        };
        Self { name, category, value }
    }
}

impl Symbol for Constant {
    fn name(&self) -> &str {
        &self.name
    }
    fn category(&self) -> Category {
        self.category
    }
    fn eval(&self, _interp: &mut Interpreter<'_>) -> Option<Value> {
        Some(self.value.clone())
    }
}

// --- Number ---
/// Parametric real terminal (ephemeral random constant) in `[min, max)`.
pub struct Number {
    category: Category,
    min: f64,
    max: f64,
}

impl Number {
    pub fn new(category: Category, min: f64, max: f64) -> Self {
        Self { category, min, max }
    }
}

impl Symbol for Number {
    fn name(&self) -> &str {
        "REAL"
    }
    fn category(&self) -> Category {
        self.category
    }
    fn parametric(&self) -> bool {
        true
    }
    fn init(&self, rng: &mut dyn RngCore) -> f64 {
        if self.min < self.max {
            rng.gen_range(self.min..self.max)
        } else {
            self.min
        }
    }
    fn eval(&self, interp: &mut Interpreter<'_>) -> Option<Value> {
        interp.fetch_param().map(Value::Float)
    }
    fn debug(&self) -> bool {
        self.min <= self.max
    }
}

// --- Integer ---
/// Parametric integer terminal in `[min, max)`.
pub struct Integer {
    category: Category,
    min: i64,
    max: i64,
}

impl Integer {
    pub fn new(category: Category, min: i64, max: i64) -> Self {
        Self { category, min, max }
    }
}

impl Symbol for Integer {
    fn name(&self) -> &str {
        "INT"
    }
    fn category(&self) -> Category {
        self.category
    }
    fn parametric(&self) -> bool {
        true
    }
    fn init(&self, rng: &mut dyn RngCore) -> f64 {
        if self.min < self.max {
            rng.gen_range(self.min..self.max) as f64
        } else {
            self.min as f64
        }
    }
    fn display_param(&self, param: f64) -> String {
        (param as i64).to_string()
    }
    fn eval(&self, interp: &mut Interpreter<'_>) -> Option<Value> {
        interp.fetch_param().map(|p| Value::Integer(p as i64))
    }
    fn debug(&self) -> bool {
        self.min <= self.max
    }
}

// --- Variable ---
/// Input variable: the `index`-th feature of the example bound to the
/// interpreter.
pub struct Variable {
    name: String,
    category: Category,
    index: usize,
}

impl Variable {
    pub fn new(name: impl Into<String>, index: usize, category: Category) -> Self {
        Self {
            name: name.into(),
            category,
            index,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl Symbol for Variable {
    fn name(&self) -> &str {
        &self.name
    }
    fn category(&self) -> Category {
        self.category
    }
    fn eval(&self, interp: &mut Interpreter<'_>) -> Option<Value> {
        interp.fetch_var(self.index)
    }
}

// --- Argument ---
/// Formal argument of an ADF.
///
/// Arguments are communication channels between an ADF body and its
/// calling environment, so they have no proper type: the category is a
/// placeholder and the value comes from the caller's `index`-th argument.
pub struct Argument {
    name: String,
    index: usize,
}

impl Argument {
    pub fn new(index: usize) -> Self {
        Self {
            name: format!("ARG_{}", index),
            index,
        }
    }
}

impl Symbol for Argument {
    fn name(&self) -> &str {
        &self.name
    }
    fn category(&self) -> Category {
        0
    }
    fn argument(&self) -> Option<usize> {
        Some(self.index)
    }
    fn eval(&self, interp: &mut Interpreter<'_>) -> Option<Value> {
        interp.fetch_adf_arg(self.index)
    }
    fn debug(&self) -> bool {
        self.index < crate::engines::generation::gene::K_ARGS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_number_init_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let n = Number::new(0, -2.0, 3.0);
        for _ in 0..100 {
            let v = n.init(&mut rng);
            assert!((-2.0..3.0).contains(&v));
        }
    }

    #[test]
    fn test_integer_display_truncates() {
        let i = Integer::new(0, 0, 10);
        assert_eq!(i.display_param(4.0), "4");
        assert!(i.parametric());
    }

    #[test]
    fn test_argument_naming() {
        let a = Argument::new(2);
        assert_eq!(a.name(), "ARG_2");
        assert_eq!(a.argument(), Some(2));
        assert!(a.is_terminal());
    }
}
