//! Fixtures shared by the scenario tests: seeded RNGs, canned configs,
//! and a renderer stub that records instead of drawing.

use comb_builder::{CombParams, HaircombBuilder};
use comb_types::{BoundingBox, DefectConfig};
use dataset_gen::{
    Appearance, GeneratorConfig, ObjectConfig, OutputConfig, RenderError, Renderer, SurfaceFinish,
};
use mesh_kernel::{MaterialHandle, SolidHandle};
use rand::SeedableRng;
use rand_pcg::Pcg32;

// ── Error Type ──────────────────────────────────────────────────────────────

/// Unified error type for the test harness.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("assertion failed: {detail}")]
    AssertionFailed { detail: String },
}

// ── RNG and Config Constructors ─────────────────────────────────────────────

/// Seeded random stream for a deterministic scenario.
pub fn rng(seed: u64) -> Pcg32 {
    Pcg32::seed_from_u64(seed)
}

/// Default comb dimensions with a reduced tooth count to keep scenario
/// op logs small.
pub fn params(tooth_count: u32) -> CombParams {
    CombParams {
        tooth_count,
        ..Default::default()
    }
}

pub fn builder(tooth_count: u32) -> HaircombBuilder {
    match HaircombBuilder::new(params(tooth_count)) {
        Ok(b) => b,
        Err(err) => panic!("fixture params rejected: {err}"),
    }
}

/// Config enabling every geometry-level defect category.
pub fn all_geometry_defects() -> DefectConfig {
    DefectConfig {
        missing_teeth: true,
        bent_teeth: true,
        warping: true,
        ejector_marks: true,
        ..Default::default()
    }
}

/// Config enabling every category, shading defects included.
pub fn all_defects() -> DefectConfig {
    DefectConfig {
        gloss: true,
        discoloration: true,
        contamination: true,
        cloudy: true,
        splay: true,
        ..all_geometry_defects()
    }
}

/// A complete run configuration for driver scenarios.
pub fn run_config(
    tooth_count: u32,
    defects: DefectConfig,
    num_images: u64,
    images_per_object: u64,
    seed: u64,
) -> GeneratorConfig {
    GeneratorConfig {
        object: ObjectConfig {
            params: params(tooth_count),
            defects,
            finish: SurfaceFinish::Matte,
            randomize: false,
        },
        output: OutputConfig {
            num_images,
            images_per_object,
        },
        seed,
    }
}

// ── Test Renderer ───────────────────────────────────────────────────────────

/// One recorded render call.
#[derive(Debug, Clone)]
pub struct RenderCall {
    pub image: u64,
    pub appearance: Appearance,
    pub framing: BoundingBox,
}

/// Renderer stub that records every call; optionally fails at a given
/// image index to exercise the driver's abort path.
#[derive(Debug, Default)]
pub struct CountingRenderer {
    pub calls: Vec<RenderCall>,
    pub fail_at: Option<u64>,
}

impl CountingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(image: u64) -> Self {
        Self {
            calls: Vec::new(),
            fail_at: Some(image),
        }
    }
}

impl Renderer for CountingRenderer {
    fn render(
        &mut self,
        _solid: &SolidHandle,
        _material: &MaterialHandle,
        appearance: &Appearance,
        framing: &BoundingBox,
        image: u64,
    ) -> Result<(), RenderError> {
        if self.fail_at == Some(image) {
            return Err(RenderError::Failed {
                reason: format!("injected failure at image {image}"),
            });
        }
        self.calls.push(RenderCall {
            image,
            appearance: appearance.clone(),
            framing: *framing,
        });
        Ok(())
    }
}
