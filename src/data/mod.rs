pub mod cache;
pub mod dataset;

pub use cache::TranspositionTable;
pub use dataset::{Dataset, Example};
