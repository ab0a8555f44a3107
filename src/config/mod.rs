pub mod cache;
pub mod evolution;
pub mod manager;
pub mod representation;
pub mod traits;

pub use cache::CacheConfig;
pub use evolution::EvolutionConfig;
pub use manager::{AppConfig, ConfigManager};
pub use representation::RepresentationConfig;
pub use traits::{ConfigManifest, ConfigSection, FieldManifest};
