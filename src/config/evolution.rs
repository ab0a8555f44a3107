use super::traits::{ConfigManifest, ConfigSection, FieldManifest};
use crate::error::GpError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population_size: usize,
    pub num_generations: usize,
    pub mutation_rate: f64,
    pub crossover_rate: f64,
    pub elitism_count: usize,
    pub tournament_size: usize,
    /// Generations without improvement before the run stops (0 = never).
    pub max_stagnation: usize,
    /// Fixed seed for reproducible runs.
    pub seed: Option<u64>,
    /// Adaptive representation through learning.
    pub arl: bool,
    /// Generations between two ARL passes.
    pub arl_interval: usize,
    /// Maximum number of arguments of learned functions (0 = terminals only).
    pub adf_args: usize,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 500,
            num_generations: 100,
            mutation_rate: 0.04,
            crossover_rate: 0.9,
            elitism_count: 2,
            tournament_size: 5,
            max_stagnation: 0,
            seed: None,
            arl: false,
            arl_interval: 10,
            adf_args: 0,
        }
    }
}

impl ConfigSection for EvolutionConfig {
    fn section_name() -> &'static str {
        "evolution"
    }

    fn validate(&self) -> Result<(), GpError> {
        if self.population_size < 4 {
            return Err(GpError::Configuration(
                "Population size must be at least 4".to_string(),
            ));
        }
        if self.num_generations == 0 {
            return Err(GpError::Configuration(
                "Number of generations must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(GpError::Configuration(
                "Mutation rate must be between 0 and 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return Err(GpError::Configuration(
                "Crossover rate must be between 0 and 1".to_string(),
            ));
        }
        if self.tournament_size == 0 || self.tournament_size > self.population_size {
            return Err(GpError::Configuration(
                "Tournament size must be in [1, population size]".to_string(),
            ));
        }
        if self.elitism_count >= self.population_size {
            return Err(GpError::Configuration(
                "Elitism count must be smaller than the population".to_string(),
            ));
        }
        if self.arl && self.arl_interval == 0 {
            return Err(GpError::Configuration(
                "ARL interval must be positive".to_string(),
            ));
        }
        if self.adf_args > crate::engines::generation::gene::K_ARGS {
            return Err(GpError::Configuration(format!(
                "ADF arguments can't exceed {}",
                crate::engines::generation::gene::K_ARGS
            )));
        }
        Ok(())
    }

    fn to_manifest(&self) -> ConfigManifest {
        ConfigManifest {
            section: Self::section_name().to_string(),
            fields: vec![
                FieldManifest::new(
                    "population_size",
                    "integer",
                    serde_json::json!(500),
                    Some((4.0, 100000.0)),
                    "Number of individuals in the population",
                ),
                FieldManifest::new(
                    "num_generations",
                    "integer",
                    serde_json::json!(100),
                    Some((1.0, 100000.0)),
                    "Maximum number of generations",
                ),
                FieldManifest::new(
                    "mutation_rate",
                    "float",
                    serde_json::json!(0.04),
                    Some((0.0, 1.0)),
                    "Per gene mutation probability",
                ),
                FieldManifest::new(
                    "crossover_rate",
                    "float",
                    serde_json::json!(0.9),
                    Some((0.0, 1.0)),
                    "Probability of building an offspring by crossover",
                ),
                FieldManifest::new(
                    "elitism_count",
                    "integer",
                    serde_json::json!(2),
                    Some((0.0, 1000.0)),
                    "Best individuals copied unchanged to the next generation",
                ),
                FieldManifest::new(
                    "tournament_size",
                    "integer",
                    serde_json::json!(5),
                    Some((1.0, 100.0)),
                    "Candidates per selection tournament",
                ),
                FieldManifest::new(
                    "max_stagnation",
                    "integer",
                    serde_json::json!(0),
                    None,
                    "Generations without improvement before stopping (0 = never)",
                ),
                FieldManifest::new(
                    "seed",
                    "integer",
                    serde_json::Value::Null,
                    None,
                    "Random seed (random if unset)",
                ),
                FieldManifest::new(
                    "arl",
                    "boolean",
                    serde_json::json!(false),
                    None,
                    "Learn new symbols from the best individuals",
                ),
                FieldManifest::new(
                    "arl_interval",
                    "integer",
                    serde_json::json!(10),
                    Some((1.0, 1000.0)),
                    "Generations between two learning passes",
                ),
                FieldManifest::new(
                    "adf_args",
                    "integer",
                    serde_json::json!(0),
                    Some((0.0, 4.0)),
                    "Arguments of learned functions (0 = learn terminals)",
                ),
            ],
        }
    }
}
