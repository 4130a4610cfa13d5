//! Random defect-combination sampling.
//!
//! [`DefectSampler`] holds the enabled-category configuration for a run and
//! produces one valid [`DefectInstance`] per call: the number of defects is
//! Poisson-distributed (truncated at the number of enabled categories), the
//! categories are drawn without replacement, and the mutually exclusive
//! texture subtypes resolve to at most one concrete defect.
//!
//! All randomness flows through an injected `Rng`, so sampling is fully
//! reproducible under a seeded generator.

use comb_types::{DefectConfig, DefectInstance, DefectKind, TextureDefect};
use rand::seq::SliceRandom;
use rand::Rng;

/// Errors from sampler construction.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SamplerError {
    #[error("invalid number of ejector marks: {count} (expected 2 or 3)")]
    InvalidEjectorMarks { count: u8 },
}

/// Stateful generator of defect combinations for one run.
#[derive(Debug, Clone)]
pub struct DefectSampler {
    enabled: Vec<DefectKind>,
    textures: Vec<TextureDefect>,
    num_ejector_marks: u8,
}

impl DefectSampler {
    /// Build a sampler from the run configuration.
    ///
    /// Rejects `num_ejector_marks` outside {2, 3} immediately: a bad mark
    /// count is a configuration error, not a transient condition.
    pub fn new(config: &DefectConfig) -> Result<Self, SamplerError> {
        if !matches!(config.num_ejector_marks, 2 | 3) {
            return Err(SamplerError::InvalidEjectorMarks {
                count: config.num_ejector_marks,
            });
        }
        Ok(Self {
            enabled: config.enabled_kinds(),
            textures: config.enabled_textures(),
            num_ejector_marks: config.num_ejector_marks,
        })
    }

    /// Expected number of defects per object.
    ///
    /// Monotonically non-decreasing in the number of enabled categories and
    /// saturating toward 1.75; deliberately small when few categories are
    /// enabled so objects are not over-stacked with defects.
    pub fn mean_defects(&self) -> f64 {
        1.75 - 2.25 / (self.enabled.len() as f64).max(2.25)
    }

    /// The enabled categories (texture subtypes collapsed).
    pub fn enabled_kinds(&self) -> &[DefectKind] {
        &self.enabled
    }

    /// Draw a fresh defect combination.
    pub fn resample<R: Rng>(&self, rng: &mut R) -> DefectInstance {
        let count = poisson(rng, self.mean_defects()).min(self.enabled.len());
        let picked: Vec<DefectKind> = self
            .enabled
            .choose_multiple(rng, count)
            .copied()
            .collect();

        let mut instance = DefectInstance::none();
        for kind in picked {
            match kind {
                DefectKind::MissingTeeth => instance.missing_teeth = true,
                DefectKind::BentTeeth => instance.bent_teeth = true,
                DefectKind::Warping => instance.warping = true,
                DefectKind::EjectorMarks => instance.ejector_marks = self.num_ejector_marks,
                DefectKind::Gloss => instance.gloss = true,
                DefectKind::Discoloration => instance.discoloration = true,
                // The composite texture category resolves to exactly one of
                // the enabled subtypes.
                DefectKind::Texture => instance.tex_defect = self.textures.choose(rng).copied(),
            }
        }
        instance
    }
}

/// Poisson draw via Knuth's product method. Adequate for the small means
/// used here (< 1.75).
fn poisson<R: Rng>(rng: &mut R, mean: f64) -> usize {
    let threshold = (-mean).exp();
    let mut count = 0usize;
    let mut product = 1.0f64;
    loop {
        product *= rng.gen::<f64>();
        if product <= threshold {
            return count;
        }
        count += 1;
    }
}
