use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use comb_builder::CombParams;
use comb_types::DefectConfig;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {reason}")]
    Invalid { reason: String },
}

/// Base surface finish of the molded plastic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceFinish {
    Rough,
    Matte,
    Shiny,
}

fn default_finish() -> SurfaceFinish {
    SurfaceFinish::Matte
}

/// Per-object settings: comb dimensions, the enabled defect set, and the
/// surface finish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectConfig {
    #[serde(default)]
    pub params: CombParams,
    #[serde(flatten)]
    pub defects: DefectConfig,
    #[serde(default = "default_finish")]
    pub finish: SurfaceFinish,
    /// Ask the renderer to jitter shader parameters around `finish`.
    #[serde(default)]
    pub randomize: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Total images to render across the run.
    pub num_images: u64,
    /// Images rendered of each generated object before it is discarded.
    pub images_per_object: u64,
}

/// Top-level run configuration, loaded from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub object: ObjectConfig,
    pub output: OutputConfig,
    /// Seed for the run's random stream. Identical configs produce
    /// identical datasets up to the rendering backend.
    #[serde(default)]
    pub seed: u64,
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output.num_images == 0 {
            return Err(ConfigError::Invalid {
                reason: "num_images must be at least 1".to_string(),
            });
        }
        if self.output.images_per_object == 0 {
            return Err(ConfigError::Invalid {
                reason: "images_per_object must be at least 1".to_string(),
            });
        }
        if !matches!(self.object.defects.num_ejector_marks, 2 | 3) {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "num_ejector_marks must be 2 or 3, got {}",
                    self.object.defects.num_ejector_marks
                ),
            });
        }
        Ok(())
    }

    /// The run's random stream, derived from the configured seed.
    pub fn rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}

pub fn load_config(path: impl AsRef<Path>) -> Result<GeneratorConfig, ConfigError> {
    let file = File::open(path)?;
    let config: GeneratorConfig = serde_json::from_reader(BufReader::new(file))?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn minimal_json() -> &'static str {
        r#"{
            "object": { "missing_teeth": true, "bent_teeth": true },
            "output": { "num_images": 100, "images_per_object": 4 },
            "seed": 42
        }"#
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: GeneratorConfig = serde_json::from_str(minimal_json()).unwrap();
        config.validate().unwrap();

        assert!(config.object.defects.missing_teeth);
        assert!(config.object.defects.bent_teeth);
        assert!(!config.object.defects.warping);
        assert_eq!(config.object.params, CombParams::default());
        assert_eq!(config.object.finish, SurfaceFinish::Matte);
        assert!(!config.object.randomize);
        assert_eq!(config.output.num_images, 100);
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn test_finish_parses_by_name() {
        let json = r#"{
            "object": { "finish": "Shiny" },
            "output": { "num_images": 1, "images_per_object": 1 }
        }"#;
        let config: GeneratorConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.object.finish, SurfaceFinish::Shiny);
        assert_eq!(config.seed, 0);
    }

    #[test]
    fn test_validate_rejects_zero_counts() {
        let mut config: GeneratorConfig = serde_json::from_str(minimal_json()).unwrap();
        config.output.num_images = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { .. })
        ));

        let mut config: GeneratorConfig = serde_json::from_str(minimal_json()).unwrap();
        config.output.images_per_object = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_ejector_mark_count() {
        let mut config: GeneratorConfig = serde_json::from_str(minimal_json()).unwrap();
        config.object.defects.num_ejector_marks = 4;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_same_seed_same_stream() {
        let config: GeneratorConfig = serde_json::from_str(minimal_json()).unwrap();
        use rand::Rng;
        let a: u64 = config.rng().gen();
        let b: u64 = config.rng().gen();
        assert_eq!(a, b);
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config: GeneratorConfig = serde_json::from_str(minimal_json()).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let back: GeneratorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
