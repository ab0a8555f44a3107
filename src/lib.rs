//! Genetic programming engine.
//!
//! Programs are matrices of genes (rows x categories) evaluated by a
//! memoizing interpreter; fitness values are cached by program signature in
//! a transposition table.

pub mod config;
pub mod data;
pub mod engines;
pub mod error;
pub mod functions;
pub mod types;
pub mod utils;

pub use engines::evaluation::{Evaluator, EvaluatorProxy, Interpreter};
pub use engines::generation::{EvolutionEngine, Gene, Individual, Locus};
pub use error::{GpError, Result};
pub use functions::{Symbol, SymbolFactory, SymbolSet};
pub use types::{Category, Fitness, Opcode, Value};
