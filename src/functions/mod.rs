pub mod adf;
pub mod boolean;
pub mod factory;
pub mod primitives;
pub mod registry;
pub mod terminals;
pub mod traits;

pub use adf::{Adf, Adt};
pub use boolean::{And, False, Not, Or, True};
pub use factory::SymbolFactory;
pub use registry::SymbolSet;
pub use terminals::{Argument, Constant, Integer, Number, Variable};
pub use traits::{Symbol, BASE_WEIGHT};
