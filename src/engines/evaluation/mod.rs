pub mod evaluator;
pub mod interpreter;
pub mod proxy;

pub use evaluator::{
    AbsErrorEvaluator, ClassDistribution, CountEvaluator, DynSlotEvaluator, Evaluator,
    GaussianEvaluator,
};
pub use interpreter::{AdfContext, Interpreter};
pub use proxy::{CacheStats, EvaluatorProxy};
