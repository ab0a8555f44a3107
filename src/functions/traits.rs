use rand::RngCore;

use crate::engines::evaluation::interpreter::Interpreter;
use crate::types::{Category, Value};

/// Default selection weight of a symbol (relative weight `1.0`).
pub const BASE_WEIGHT: u32 = 100;

/// Base trait for all symbols (functions and terminals).
///
/// GP assembles programs from symbols: functions label the internal nodes
/// of a program, terminals its leaves. Every function must handle
/// gracefully any input it might receive, `None` included (closure
/// property): a failed computation is signalled by returning `None`.
pub trait Symbol: Send + Sync {
    /// Name used for display and for decoding by name.
    fn name(&self) -> &str;

    /// Category (type) of the value the symbol produces.
    fn category(&self) -> Category;

    /// Categories of the formal arguments (empty for terminals).
    fn arg_categories(&self) -> &[Category] {
        &[]
    }

    fn arity(&self) -> usize {
        self.arg_categories().len()
    }

    fn is_terminal(&self) -> bool {
        self.arity() == 0
    }

    /// `a OP (b OP c) = (a OP b) OP c`. Terminals are never associative.
    fn associative(&self) -> bool {
        false
    }

    /// A parametric terminal stores its value in every gene using it.
    fn parametric(&self) -> bool {
        false
    }

    /// `true` for symbols synthesized during the run (ADF / ADT).
    fn auto_defined(&self) -> bool {
        false
    }

    /// Index of the formal argument for ADF argument placeholders.
    fn argument(&self) -> Option<usize> {
        None
    }

    /// Initial value of the parameter of a parametric terminal.
    fn init(&self, _rng: &mut dyn RngCore) -> f64 {
        0.0
    }

    fn display(&self) -> String {
        self.name().to_string()
    }

    /// Display form of a parametric terminal carrying `param`.
    fn display_param(&self, param: f64) -> String {
        param.to_string()
    }

    /// Calculates the value of the symbol. Arguments are pulled through the
    /// interpreter (`fetch_arg`), which also memoizes them.
    fn eval(&self, interp: &mut Interpreter<'_>) -> Option<Value>;

    /// Internal consistency check.
    fn debug(&self) -> bool {
        true
    }
}
