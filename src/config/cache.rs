use super::traits::{ConfigManifest, ConfigSection, FieldManifest};
use crate::error::GpError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// The transposition table has `2^bits` slots.
    pub bits: u32,
    /// Recompute cache hits in debug builds to detect collisions.
    pub verify_hits: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            bits: 16,
            verify_hits: false,
        }
    }
}

impl ConfigSection for CacheConfig {
    fn section_name() -> &'static str {
        "cache"
    }

    fn validate(&self) -> Result<(), GpError> {
        if !(7..=30).contains(&self.bits) {
            return Err(GpError::Configuration(
                "Cache bits must be between 7 and 30".to_string(),
            ));
        }
        Ok(())
    }

    fn to_manifest(&self) -> ConfigManifest {
        ConfigManifest {
            section: Self::section_name().to_string(),
            fields: vec![
                FieldManifest::new(
                    "bits",
                    "integer",
                    serde_json::json!(16),
                    Some((7.0, 30.0)),
                    "Base 2 logarithm of the number of cache slots",
                ),
                FieldManifest::new(
                    "verify_hits",
                    "boolean",
                    serde_json::json!(false),
                    None,
                    "Check cache hits against a fresh evaluation (debug builds)",
                ),
            ],
        }
    }
}
