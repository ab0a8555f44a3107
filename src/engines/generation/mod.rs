pub mod arl;
pub mod display;
pub mod evolution_engine;
pub mod gene;
pub mod hall_of_fame;
pub mod individual;
pub mod operators;
pub mod progress;

pub use arl::Arl;
pub use evolution_engine::{EvolutionEngine, EvolutionSummary, ProgressCallback};
pub use gene::{Gene, GeneData, Locus, K_ARGS};
pub use hall_of_fame::{EliteIndividual, HallOfFame};
pub use individual::{CrossoverKind, Individual};
pub use progress::{ChannelProgressCallback, ConsoleProgressCallback, ProgressMessage};
