use serde::{Deserialize, Serialize};
use std::fmt;

/// Type tag of a symbol. Strongly typed GP keeps every category in its own
/// genome column.
pub type Category = u32;

/// Primary key of a symbol inside its `SymbolSet`.
pub type Opcode = u32;

/// Row of a gene inside a genome.
pub type Index = usize;

/// Value produced by a program or one of its sub-expressions.
///
/// The interpreter works with `Option<Value>`: `None` is the "empty" value
/// used to signal a computation that can't be completed (division by zero,
/// logarithm of a negative number...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Integer(i64),
    Float(f64),
    String(String),
    Bool(bool),
}

impl Value {
    /// Numeric view of the value (booleans map to 0/1, strings have none).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::String(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Fitness of an individual: one or more components compared
/// lexicographically (greater is better).
#[derive(Debug, Clone, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Fitness(pub Vec<f64>);

impl Fitness {
    pub fn new(components: Vec<f64>) -> Self {
        Self(components)
    }

    /// The worst possible single component fitness.
    pub fn lowest() -> Self {
        Self(vec![f64::NEG_INFINITY])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_finite(&self) -> bool {
        !self.0.is_empty() && self.0.iter().all(|v| v.is_finite())
    }

    /// Main component (used for scalar comparisons and ARL deltas).
    pub fn main(&self) -> f64 {
        self.0.first().copied().unwrap_or(f64::NEG_INFINITY)
    }

    pub fn components(&self) -> &[f64] {
        &self.0
    }

    /// Textual form used by the cache persistence: `len v1 .. vn`.
    pub fn to_text(&self) -> String {
        let mut out = self.0.len().to_string();
        for v in &self.0 {
            out.push(' ');
            out.push_str(&v.to_string());
        }
        out
    }
}

impl From<f64> for Fitness {
    fn from(v: f64) -> Self {
        Self(vec![v])
    }
}

impl fmt::Display for Fitness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", v)?;
        }
        write!(f, ")")
    }
}
