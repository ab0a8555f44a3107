use super::traits::{ConfigManifest, ConfigSection, FieldManifest};
use crate::engines::generation::individual::CrossoverKind;
use crate::error::GpError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepresentationConfig {
    /// Rows of every genome.
    pub code_length: usize,
    /// Final rows holding terminals only.
    pub patch_length: usize,
    pub crossover: CrossoverKind,
}

impl Default for RepresentationConfig {
    fn default() -> Self {
        Self {
            code_length: 100,
            patch_length: 10,
            crossover: CrossoverKind::Uniform,
        }
    }
}

impl ConfigSection for RepresentationConfig {
    fn section_name() -> &'static str {
        "representation"
    }

    fn validate(&self) -> Result<(), GpError> {
        if self.code_length < 2 {
            return Err(GpError::Configuration(
                "Code length must be at least 2".to_string(),
            ));
        }
        if self.patch_length == 0 || self.patch_length >= self.code_length {
            return Err(GpError::Configuration(
                "Patch length must be in [1, code length)".to_string(),
            ));
        }
        Ok(())
    }

    fn to_manifest(&self) -> ConfigManifest {
        ConfigManifest {
            section: Self::section_name().to_string(),
            fields: vec![
                FieldManifest::new(
                    "code_length",
                    "integer",
                    serde_json::json!(100),
                    Some((2.0, 10000.0)),
                    "Rows of every genome",
                ),
                FieldManifest::new(
                    "patch_length",
                    "integer",
                    serde_json::json!(10),
                    Some((1.0, 9999.0)),
                    "Final rows restricted to terminals",
                ),
                FieldManifest::new(
                    "crossover",
                    "enum",
                    serde_json::json!("uniform"),
                    None,
                    "uniform, one_point or two_point",
                ),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_must_fit_code() {
        let mut cfg = RepresentationConfig::default();
        assert!(cfg.validate().is_ok());
        cfg.patch_length = cfg.code_length;
        assert!(cfg.validate().is_err());
    }
}
