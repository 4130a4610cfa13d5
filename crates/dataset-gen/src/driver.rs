use comb_builder::{BuildError, HaircombBuilder, OperatorBundle};
use comb_types::{BoundingBox, DefectInstance, TextureDefect};
use defect_sampler::{DefectSampler, SamplerError};
use mesh_kernel::{MaterialHandle, MeshError, SolidHandle};
use rand::Rng;
use thiserror::Error;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::{ConfigError, GeneratorConfig, SurfaceFinish};
use crate::labels::LabelRecord;

/// Fraction of the bounding-box extent the camera framing may slack off
/// by, per side.
const FRAME_SLACK: f64 = 0.1;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("render failed: {reason}")]
    Failed { reason: String },

    #[error("render output error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Sampler(#[from] SamplerError),

    #[error("object construction failed: {0}")]
    Build(#[from] BuildError),

    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Shading-level description of one object, resolved from the defect
/// instance and the configured finish. The renderer maps this onto its
/// material system; `randomize` asks it to jitter shader parameters
/// around the base finish, which itself stays as configured.
#[derive(Debug, Clone, PartialEq)]
pub struct Appearance {
    pub finish: SurfaceFinish,
    pub randomize: bool,
    pub low_gloss: bool,
    pub discoloration: bool,
    pub texture: Option<TextureDefect>,
}

impl Appearance {
    fn resolve(config: &GeneratorConfig, defects: &DefectInstance) -> Appearance {
        Appearance {
            finish: config.object.finish,
            randomize: config.object.randomize,
            low_gloss: defects.gloss,
            discoloration: defects.discoloration,
            texture: defects.tex_defect,
        }
    }
}

/// Rendering backend boundary. The driver owns object generation and
/// labeling; everything camera- and raster-side lives behind this trait.
pub trait Renderer {
    fn render(
        &mut self,
        solid: &SolidHandle,
        material: &MaterialHandle,
        appearance: &Appearance,
        framing: &BoundingBox,
        image: u64,
    ) -> Result<(), RenderError>;
}

/// Outcome of a batch run: one label per rendered image, plus how many
/// objects were dropped to mesh failures.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub labels: Vec<LabelRecord>,
    pub skipped_objects: u64,
}

impl BatchReport {
    pub fn save_labels(&self, path: impl AsRef<std::path::Path>) -> Result<(), std::io::Error> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), &self.labels)?;
        Ok(())
    }
}

/// Drives whole dataset runs: sample defects, build the object, render a
/// handful of images of it, record labels, discard, repeat.
#[derive(Debug)]
pub struct BatchDriver {
    config: GeneratorConfig,
    sampler: DefectSampler,
    builder: HaircombBuilder,
}

impl BatchDriver {
    pub fn new(config: GeneratorConfig) -> Result<Self, DriverError> {
        config.validate()?;
        let sampler = DefectSampler::new(&config.object.defects)?;
        let builder = HaircombBuilder::new(config.object.params.clone())?;
        Ok(Self {
            config,
            sampler,
            builder,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Run the batch until `num_images` labels are produced.
    ///
    /// A mesh failure during construction drops that one object, logs it,
    /// and moves on; the batch still delivers the full image count.
    /// Renderer failures abort the run.
    #[instrument(skip_all, fields(
        num_images = self.config.output.num_images,
        images_per_object = self.config.output.images_per_object,
    ))]
    pub fn run<R: Rng>(
        &self,
        ops: &mut dyn OperatorBundle,
        renderer: &mut dyn Renderer,
        rng: &mut R,
    ) -> Result<BatchReport, DriverError> {
        let num_images = self.config.output.num_images;
        let per_object = self.config.output.images_per_object;

        let mut labels = Vec::with_capacity(num_images as usize);
        let mut skipped_objects = 0u64;
        let mut image = 0u64;

        while image < num_images {
            let defects = self.sampler.resample(rng);

            let built = match self.builder.build(ops, &defects, rng) {
                Ok(built) => built,
                Err(BuildError::Mesh(err)) => {
                    warn!(%err, "dropping object after mesh failure");
                    skipped_objects += 1;
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            let object_id = Uuid::new_v4();
            let appearance = Appearance::resolve(&self.config, &defects);
            let remaining = num_images - image;

            let result = (|| -> Result<(), DriverError> {
                for _ in 0..per_object.min(remaining) {
                    let framing = built.bounding_box.randomly_extended(
                        rng,
                        FRAME_SLACK * built.bounding_box.extent(0),
                        FRAME_SLACK * built.bounding_box.extent(1),
                    );
                    renderer.render(
                        &built.solid,
                        &built.material,
                        &appearance,
                        &framing,
                        image,
                    )?;
                    labels.push(LabelRecord::from_instance(object_id, image, &defects));
                    image += 1;
                }
                Ok(())
            })();

            // One object per engine session slot: release before the next
            // build, on the error path too.
            match result {
                Ok(()) => ops.destroy(built.solid)?,
                Err(err) => {
                    let _ = ops.destroy(built.solid);
                    return Err(err);
                }
            }
        }

        info!(
            images = labels.len(),
            skipped_objects, "batch run complete"
        );
        Ok(BatchReport {
            labels,
            skipped_objects,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ObjectConfig, OutputConfig};
    use comb_builder::CombParams;
    use comb_types::DefectConfig;
    use mesh_kernel::{MeshInspect, MockOperator};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    struct CountingRenderer {
        rendered: Vec<u64>,
        fail_at: Option<u64>,
    }

    impl CountingRenderer {
        fn new() -> Self {
            Self {
                rendered: Vec::new(),
                fail_at: None,
            }
        }
    }

    impl Renderer for CountingRenderer {
        fn render(
            &mut self,
            _solid: &SolidHandle,
            _material: &MaterialHandle,
            _appearance: &Appearance,
            framing: &BoundingBox,
            image: u64,
        ) -> Result<(), RenderError> {
            assert!(framing.extent(0) > 0.0);
            if self.fail_at == Some(image) {
                return Err(RenderError::Failed {
                    reason: "backend out of memory".to_string(),
                });
            }
            self.rendered.push(image);
            Ok(())
        }
    }

    fn test_config(num_images: u64, images_per_object: u64) -> GeneratorConfig {
        GeneratorConfig {
            object: ObjectConfig {
                params: CombParams {
                    tooth_count: 5,
                    ..Default::default()
                },
                defects: DefectConfig {
                    missing_teeth: true,
                    bent_teeth: true,
                    ejector_marks: true,
                    ..Default::default()
                },
                finish: SurfaceFinish::Matte,
                randomize: false,
            },
            output: OutputConfig {
                num_images,
                images_per_object,
            },
            seed: 17,
        }
    }

    #[test]
    fn test_new_rejects_invalid_output_config() {
        let err = BatchDriver::new(test_config(10, 0)).unwrap_err();
        assert!(matches!(err, DriverError::Config(_)));

        assert!(BatchDriver::new(test_config(0, 4)).is_err());
    }

    #[test]
    fn test_run_produces_requested_image_count() {
        let config = test_config(10, 4);
        let driver = BatchDriver::new(config.clone()).unwrap();
        let mut ops = MockOperator::new();
        let mut renderer = CountingRenderer::new();
        let mut rng = config.rng();

        let report = driver.run(&mut ops, &mut renderer, &mut rng).unwrap();

        assert_eq!(report.labels.len(), 10);
        assert_eq!(renderer.rendered.len(), 10);
        // Image indices are the global sequence.
        assert_eq!(renderer.rendered, (0..10).collect::<Vec<_>>());
        // No solids leak between objects.
        assert_eq!(ops.live_solids(), 0);
    }

    #[test]
    fn test_images_of_one_object_share_labels() {
        let config = test_config(8, 4);
        let driver = BatchDriver::new(config.clone()).unwrap();
        let mut ops = MockOperator::new();
        let mut renderer = CountingRenderer::new();
        let mut rng = config.rng();

        let report = driver.run(&mut ops, &mut renderer, &mut rng).unwrap();

        for chunk in report.labels.chunks(4) {
            let first = &chunk[0];
            for label in chunk {
                assert_eq!(label.object_id, first.object_id);
                assert_eq!(label.missing_teeth, first.missing_teeth);
                assert_eq!(label.bent_teeth, first.bent_teeth);
            }
        }
        // Distinct objects get distinct ids.
        assert_ne!(report.labels[0].object_id, report.labels[4].object_id);
    }

    #[test]
    fn test_mesh_failure_skips_object_and_continues() {
        let config = test_config(4, 2);
        let driver = BatchDriver::new(config.clone()).unwrap();
        let mut ops = MockOperator::new();
        // First boolean of the first object fails; later objects succeed.
        ops.fail_booleans_after(0);
        let mut renderer = CountingRenderer::new();
        let mut rng = config.rng();

        let report = driver.run(&mut ops, &mut renderer, &mut rng).unwrap();

        assert_eq!(report.labels.len(), 4);
        assert_eq!(report.skipped_objects, 1);
        assert_eq!(ops.live_solids(), 0);
    }

    #[test]
    fn test_renderer_failure_aborts_and_cleans_up() {
        let config = test_config(6, 3);
        let driver = BatchDriver::new(config.clone()).unwrap();
        let mut ops = MockOperator::new();
        let mut renderer = CountingRenderer::new();
        renderer.fail_at = Some(4);
        let mut rng = config.rng();

        let err = driver.run(&mut ops, &mut renderer, &mut rng).unwrap_err();

        assert!(matches!(err, DriverError::Render(_)));
        assert_eq!(ops.live_solids(), 0);
    }

    #[test]
    fn test_run_is_deterministic_for_a_seed() {
        let config = test_config(12, 3);
        let driver = BatchDriver::new(config.clone()).unwrap();

        let mut run = || {
            let mut ops = MockOperator::new();
            let mut renderer = CountingRenderer::new();
            let mut rng = config.rng();
            driver.run(&mut ops, &mut renderer, &mut rng).unwrap()
        };
        let a = run();
        let b = run();

        let flags = |report: &BatchReport| {
            report
                .labels
                .iter()
                .map(|l| (l.missing_teeth, l.bent_teeth, l.ejector_marks))
                .collect::<Vec<_>>()
        };
        assert_eq!(flags(&a), flags(&b));
        assert_eq!(a.skipped_objects, b.skipped_objects);
    }
}
