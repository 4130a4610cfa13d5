use std::f64::consts::{FRAC_PI_2, PI};

use comb_types::{BoundingBox, DefectInstance};
use mesh_kernel::{
    Axis, BendFrame, BooleanSolver, MaterialHandle, MeshError, SolidHandle, VertexId,
};
use rand::Rng;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::operator_ext::OperatorBundle;
use crate::params::{CombParams, DerivedParams};
use crate::plan::{ToothOp, ToothPlan};

/// Tolerance for world-space vertex classification.
const EPSILON: f64 = 1e-6;

/// Segment count for bevel roundings.
const BEVEL_SEGMENTS: u32 = 10;

/// Cross-section resolution of the tooth cone.
const TOOTH_SEGMENTS: u32 = 20;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error("invalid parameter: {reason}")]
    InvalidParameter { reason: String },
}

/// Result of a successful build. The solid and material handles stay valid
/// until the caller destroys the solid or ends the engine session.
#[derive(Debug, Clone)]
pub struct BuiltComb {
    pub solid: SolidHandle,
    pub material: MaterialHandle,
    /// Slightly padded box around the comb, for camera framing.
    pub bounding_box: BoundingBox,
}

/// Constructs one haircomb solid from validated parameters.
///
/// `build` may be called repeatedly with fresh defect instances; each call
/// produces an independent solid and leaves no scratch geometry behind,
/// whether it succeeds or fails.
#[derive(Debug)]
pub struct HaircombBuilder {
    params: CombParams,
    derived: DerivedParams,
}

impl HaircombBuilder {
    pub fn new(params: CombParams) -> Result<Self, BuildError> {
        params.validate()?;
        let derived = params.derived();
        Ok(Self { params, derived })
    }

    pub fn params(&self) -> &CombParams {
        &self.params
    }

    pub fn derived(&self) -> &DerivedParams {
        &self.derived
    }

    /// Build the comb. Geometry defects (missing teeth, bent teeth,
    /// warping, ejector marks) are applied here; shading defects in the
    /// instance are for the material collaborator and are ignored.
    #[instrument(skip_all, fields(
        teeth = self.params.tooth_count,
        missing = defects.missing_teeth,
        bent = defects.bent_teeth,
        warped = defects.warping,
        ejector_marks = defects.ejector_marks,
    ))]
    pub fn build<R: Rng>(
        &self,
        ops: &mut dyn OperatorBundle,
        defects: &DefectInstance,
        rng: &mut R,
    ) -> Result<BuiltComb, BuildError> {
        if !matches!(defects.ejector_marks, 0 | 2 | 3) {
            return Err(BuildError::InvalidParameter {
                reason: format!(
                    "ejector mark count must be 2 or 3, got {}",
                    defects.ejector_marks
                ),
            });
        }

        let body = ops.create_box(
            [self.params.base_height / 2.0, 0.0, self.params.thickness / 2.0],
            [self.params.base_height, self.params.width, self.params.thickness],
        )?;

        // On any failure past this point the partially built body must not
        // escape to the caller.
        match self.build_onto(ops, &body, defects, rng) {
            Ok((material, bounding_box)) => {
                info!(live_solids = ops.live_solids(), "comb built");
                Ok(BuiltComb {
                    solid: body,
                    material,
                    bounding_box,
                })
            }
            Err(err) => {
                let _ = ops.destroy(body);
                Err(err)
            }
        }
    }

    fn build_onto<R: Rng>(
        &self,
        ops: &mut dyn OperatorBundle,
        body: &SolidHandle,
        defects: &DefectInstance,
        rng: &mut R,
    ) -> Result<(MaterialHandle, BoundingBox), BuildError> {
        let plan = ToothPlan::generate(&self.params, defects, rng);

        self.round_head(ops, body)?;
        self.attach_sides(ops, body)?;
        self.round_horizontal_edges(ops, body)?;
        self.sweep_teeth(ops, body, &plan, rng)?;
        self.attach_middle(ops, body)?;
        if defects.ejector_marks > 0 {
            self.cut_ejector_marks(ops, body, defects.ejector_marks)?;
        }

        debug!("final remesh");
        ops.remesh(body, 0.1, 0.05)?;

        if defects.warping {
            self.warp(ops, body, rng)?;
        }

        let material = ops.assign_material(body)?;
        Ok((material, self.bounding_box()))
    }

    /// Round the two head corners of the base block. The corners sit on
    /// the x = 0 face; each side gets its own bevel so the large radius
    /// cannot interfere across the width.
    fn round_head(&self, ops: &mut dyn OperatorBundle, body: &SolidHandle) -> Result<(), BuildError> {
        debug!("rounding head corners");
        for y_positive in [false, true] {
            let corner = select_vertices(ops, body, |p| {
                p[0] <= EPSILON && if y_positive { p[1] > 0.0 } else { p[1] < 0.0 }
            })?;
            ops.bevel(body, &corner, self.derived.base_radius, BEVEL_SEGMENTS, true)?;
        }
        Ok(())
    }

    /// Build one side arm at the origin, round it, then union it in at
    /// both y extremes (the second placement is the mirror image).
    fn attach_sides(
        &self,
        ops: &mut dyn OperatorBundle,
        body: &SolidHandle,
    ) -> Result<(), BuildError> {
        debug!("attaching side arms");
        let d = &self.derived;
        let side = ops.create_box(
            [0.0, 0.0, 0.0],
            [d.side_height / 2.5, self.params.side_width, d.side_thickness],
        )?;

        match self.shape_and_place_sides(ops, body, &side) {
            Ok(()) => {
                ops.destroy(side)?;
                Ok(())
            }
            Err(err) => {
                let _ = ops.destroy(side);
                Err(err)
            }
        }
    }

    fn shape_and_place_sides(
        &self,
        ops: &mut dyn OperatorBundle,
        body: &SolidHandle,
        side: &SolidHandle,
    ) -> Result<(), BuildError> {
        let d = &self.derived;
        let half_x = d.side_height / 5.0;
        let half_y = self.params.side_width / 2.0;

        // Large outer rounding at the free tip, small inner one facing the
        // teeth. Bevelled before the x stretch so the stretch turns the
        // round outer corner into a drawn-out taper.
        let outer = select_vertices(ops, side, |p| {
            p[0] >= half_x - EPSILON && p[1] <= -half_y + EPSILON
        })?;
        ops.bevel(side, &outer, d.side_radius, BEVEL_SEGMENTS, true)?;

        let inner = select_vertices(ops, side, |p| {
            p[0] >= half_x - EPSILON && p[1] >= half_y - EPSILON
        })?;
        ops.bevel(side, &inner, d.general_radius, BEVEL_SEGMENTS, true)?;

        ops.scale(side, [2.5, 1.0, 1.0])?;

        // First arm at y min. Shares the base's top face, so the boolean
        // needs the exact solver.
        ops.translate(
            side,
            [
                d.side_height / 2.0 + self.params.base_height,
                self.params.side_width / 2.0 - self.params.width / 2.0,
                self.params.thickness / 2.0,
            ],
        )?;
        ops.union(body, side, BooleanSolver::Exact)?;

        // Mirror to y max.
        ops.translate(side, [0.0, self.params.width - self.params.side_width, 0.0])?;
        ops.rotate(side, Axis::X, PI)?;
        ops.union(body, side, BooleanSolver::Exact)?;
        Ok(())
    }

    /// Round every edge lying in the top and bottom faces in one pass.
    /// Overlap clamping stays off so the long parallel edges keep a
    /// uniform radius.
    fn round_horizontal_edges(
        &self,
        ops: &mut dyn OperatorBundle,
        body: &SolidHandle,
    ) -> Result<(), BuildError> {
        debug!("rounding horizontal edges");
        let thickness = self.params.thickness;
        let top = select_vertices(ops, body, |p| p[2] >= thickness - EPSILON)?;
        ops.bevel(body, &top, self.derived.general_radius, BEVEL_SEGMENTS, false)?;

        let bottom = select_vertices(ops, body, |p| p[2] <= EPSILON)?;
        ops.bevel(body, &bottom, self.derived.general_radius, BEVEL_SEGMENTS, false)?;
        Ok(())
    }

    fn tooth_start(&self) -> [f64; 3] {
        let d = &self.derived;
        [
            self.params.base_height + self.params.tooth_height / 2.0
                - 0.05 * self.params.tooth_height,
            d.tooth_width / 2.0 - self.params.width / 2.0 + self.params.side_width
                + d.tooth_spacing,
            self.params.thickness / 2.0,
        ]
    }

    /// Shape the tooth prototype: an elongated truncated cone with a
    /// rounded tip, lying along x at the first tooth position.
    fn make_tooth_prototype(
        &self,
        ops: &mut dyn OperatorBundle,
    ) -> Result<SolidHandle, BuildError> {
        let thickness = self.params.thickness;
        let length = 1.1 * self.params.tooth_height;
        let tooth = ops.create_cone(
            thickness / 1.5,
            0.75 * thickness / 2.0,
            length,
            TOOTH_SEGMENTS,
            [0.0, 0.0, 0.0],
        )?;

        match self.shape_tooth(ops, &tooth, length) {
            Ok(()) => Ok(tooth),
            Err(err) => {
                let _ = ops.destroy(tooth);
                Err(err)
            }
        }
    }

    fn shape_tooth(
        &self,
        ops: &mut dyn OperatorBundle,
        tooth: &SolidHandle,
        length: f64,
    ) -> Result<(), BuildError> {
        // Widen the cross-section along what becomes the tooth's width
        // direction, then round the tip ring.
        ops.scale(tooth, [1.5, 1.0, 1.0])?;
        let tip = select_vertices(ops, tooth, |p| p[2] >= length / 2.0 - EPSILON)?;
        ops.bevel(tooth, &tip, self.derived.general_radius, BEVEL_SEGMENTS, true)?;

        // Lay the cone down along x, tip pointing away from the base.
        ops.rotate(tooth, Axis::Y, FRAC_PI_2)?;
        ops.translate(tooth, self.tooth_start())?;
        Ok(())
    }

    /// Box used to break teeth off: sits past the tooth root, oversized in
    /// y and z so only the break plane matters.
    fn make_cutter(&self, ops: &mut dyn OperatorBundle) -> Result<SolidHandle, BuildError> {
        let d = &self.derived;
        let start = self.tooth_start();
        let cutter = ops.create_box(
            [
                self.params.tooth_height / 2.0 + self.params.base_height + d.middle_height
                    + self.params.tooth_height / 30.0,
                start[1],
                start[2],
            ],
            [
                self.params.tooth_height,
                1.5 * d.tooth_width,
                1.5 * self.params.thickness,
            ],
        )?;
        Ok(cutter)
    }

    fn sweep_teeth<R: Rng>(
        &self,
        ops: &mut dyn OperatorBundle,
        body: &SolidHandle,
        plan: &ToothPlan,
        rng: &mut R,
    ) -> Result<(), BuildError> {
        debug!(teeth = plan.len(), "sweeping teeth");
        let tooth = self.make_tooth_prototype(ops)?;
        let cutter = if plan.has_missing() {
            match self.make_cutter(ops) {
                Ok(c) => Some(c),
                Err(err) => {
                    let _ = ops.destroy(tooth);
                    return Err(err);
                }
            }
        } else {
            None
        };

        let result = self.sweep_inner(ops, body, &tooth, cutter.as_ref(), plan, rng);
        match result {
            Ok(()) => {
                ops.destroy(tooth)?;
                if let Some(c) = cutter {
                    ops.destroy(c)?;
                }
                Ok(())
            }
            Err(err) => {
                let _ = ops.destroy(tooth);
                if let Some(c) = cutter {
                    let _ = ops.destroy(c);
                }
                Err(err)
            }
        }
    }

    fn sweep_inner<R: Rng>(
        &self,
        ops: &mut dyn OperatorBundle,
        body: &SolidHandle,
        tooth: &SolidHandle,
        cutter: Option<&SolidHandle>,
        plan: &ToothPlan,
        rng: &mut R,
    ) -> Result<(), BuildError> {
        let step = self.derived.tooth_spacing + self.derived.tooth_width;
        let mut pos = self.tooth_start();

        for (index, op) in plan.iter().enumerate() {
            match op {
                ToothOp::Normal => {
                    ops.union(body, tooth, BooleanSolver::Fast)?;
                }
                ToothOp::Missing => {
                    // Cutter presence is guaranteed by the caller when the
                    // plan contains a missing tooth.
                    let cutter = cutter.ok_or(MeshError::Other {
                        message: "missing tooth without cutter".to_string(),
                    })?;
                    self.break_tooth(ops, body, tooth, cutter, rng)?;
                }
                ToothOp::Bent {
                    angle,
                    lower,
                    upper,
                    origin,
                    tilt,
                } => {
                    debug!(index, angle, "bending tooth");
                    self.bend_tooth(ops, body, tooth, pos, angle, lower, upper, origin, tilt)?;
                }
            }

            pos[1] += step;
            ops.translate(tooth, [0.0, step, 0.0])?;
            if let Some(c) = cutter {
                ops.translate(c, [0.0, step, 0.0])?;
            }
        }
        Ok(())
    }

    /// Union a copy of the tooth, then cut it off near the root with a
    /// jittered copy of the cutter so every break looks different.
    fn break_tooth<R: Rng>(
        &self,
        ops: &mut dyn OperatorBundle,
        body: &SolidHandle,
        tooth: &SolidHandle,
        cutter: &SolidHandle,
        rng: &mut R,
    ) -> Result<(), BuildError> {
        let stump = ops.duplicate(tooth)?;
        let blade = match ops.duplicate(cutter) {
            Ok(b) => b,
            Err(err) => {
                let _ = ops.destroy(stump);
                return Err(err.into());
            }
        };

        let result = self.break_tooth_inner(ops, body, &stump, &blade, rng);
        match result {
            Ok(()) => {
                ops.destroy(stump)?;
                ops.destroy(blade)?;
                Ok(())
            }
            Err(err) => {
                let _ = ops.destroy(stump);
                let _ = ops.destroy(blade);
                Err(err)
            }
        }
    }

    fn break_tooth_inner<R: Rng>(
        &self,
        ops: &mut dyn OperatorBundle,
        body: &SolidHandle,
        stump: &SolidHandle,
        blade: &SolidHandle,
        rng: &mut R,
    ) -> Result<(), BuildError> {
        let th = self.params.tooth_height;

        // Randomize where the break lands, then roughen the break face by
        // jiggling its four corner vertices.
        ops.translate(blade, [rng.gen_range(0.0..th / 5.0), 0.0, 0.0])?;

        let verts = ops.as_inspect().vertices(blade)?;
        let min_x = verts
            .iter()
            .map(|v| v.position[0])
            .fold(f64::INFINITY, f64::min);
        let face: Vec<VertexId> = verts
            .iter()
            .filter(|v| v.position[0] <= min_x + EPSILON)
            .map(|v| v.id)
            .collect();
        for id in face {
            let jitter = rng.gen_range(-th / 40.0..th / 40.0);
            ops.displace_vertex(blade, id, [jitter, 0.0, 0.0])?;
        }

        ops.subtract(stump, blade, BooleanSolver::Fast)?;
        ops.union(body, stump, BooleanSolver::Fast)?;
        Ok(())
    }

    /// Bend a copy of the tooth about a z axis through a point along its
    /// length, then union it in. The copy is remeshed first so the bend
    /// has enough vertices to deform smoothly.
    #[allow(clippy::too_many_arguments)]
    fn bend_tooth(
        &self,
        ops: &mut dyn OperatorBundle,
        body: &SolidHandle,
        tooth: &SolidHandle,
        pos: [f64; 3],
        angle: f64,
        lower: f64,
        upper: f64,
        origin: f64,
        tilt: f64,
    ) -> Result<(), BuildError> {
        let bent = ops.duplicate(tooth)?;

        let result = (|| -> Result<(), BuildError> {
            ops.remesh(&bent, 0.25, 0.0)?;
            let length = 1.1 * self.params.tooth_height;
            let frame = BendFrame {
                origin: [pos[0] + (origin - 0.5) * length, pos[1], pos[2]],
                tilt,
            };
            ops.bend(&bent, frame, angle, lower, upper, Axis::Z)?;
            // The bent root still overlaps the base along shared faces.
            ops.union(body, &bent, BooleanSolver::Exact)?;
            Ok(())
        })();

        match result {
            Ok(()) => {
                ops.destroy(bent)?;
                Ok(())
            }
            Err(err) => {
                let _ = ops.destroy(bent);
                Err(err)
            }
        }
    }

    /// Thin connecting strip across the full width, just above the base.
    fn attach_middle(
        &self,
        ops: &mut dyn OperatorBundle,
        body: &SolidHandle,
    ) -> Result<(), BuildError> {
        debug!("attaching middle part");
        let d = &self.derived;
        let middle = ops.create_box(
            [0.0, 0.0, 0.0],
            [d.middle_height / 6.0, d.middle_width, d.middle_thickness],
        )?;

        let result = (|| -> Result<(), BuildError> {
            // Full rounding on the front face, pre-stretch as for the
            // sides.
            let half_x = d.middle_height / 12.0;
            let front = select_vertices(ops, &middle, |p| p[0] >= half_x - EPSILON)?;
            ops.bevel(
                &middle,
                &front,
                d.middle_thickness / 2.0,
                BEVEL_SEGMENTS,
                true,
            )?;
            ops.scale(&middle, [6.0, 1.0, 1.0])?;
            ops.translate(
                &middle,
                [
                    d.middle_height / 2.0 + self.params.base_height,
                    0.0,
                    self.params.thickness / 2.0,
                ],
            )?;
            ops.union(body, &middle, BooleanSolver::Fast)?;
            Ok(())
        })();

        match result {
            Ok(()) => {
                ops.destroy(middle)?;
                Ok(())
            }
            Err(err) => {
                let _ = ops.destroy(middle);
                Err(err)
            }
        }
    }

    /// Shallow circular dimples pressed into the top of the base by the
    /// mold's ejector pins.
    fn cut_ejector_marks(
        &self,
        ops: &mut dyn OperatorBundle,
        body: &SolidHandle,
        count: u8,
    ) -> Result<(), BuildError> {
        debug!(count, "cutting ejector marks");
        let base_height = self.params.base_height;
        let width = self.params.width;
        let thickness = self.params.thickness;

        // Cylinder pokes 0.2 into the top face.
        let pin = ops.create_cylinder(
            0.3 * base_height,
            1.0,
            [base_height / 2.0, 0.0, thickness + 0.3],
        )?;

        let result = (|| -> Result<(), BuildError> {
            if count == 3 {
                ops.subtract(body, &pin, BooleanSolver::Fast)?;
            }
            ops.translate(&pin, [0.0, 0.37 * width, 0.0])?;
            ops.subtract(body, &pin, BooleanSolver::Fast)?;
            ops.translate(&pin, [0.0, -0.74 * width, 0.0])?;
            ops.subtract(body, &pin, BooleanSolver::Fast)?;
            Ok(())
        })();

        match result {
            Ok(()) => {
                ops.destroy(pin)?;
                Ok(())
            }
            Err(err) => {
                let _ = ops.destroy(pin);
                Err(err)
            }
        }
    }

    /// Whole-body warp: a gentle bend about an x axis through the origin,
    /// limited to a random band of the comb's height.
    fn warp<R: Rng>(
        &self,
        ops: &mut dyn OperatorBundle,
        body: &SolidHandle,
        rng: &mut R,
    ) -> Result<(), BuildError> {
        let angle = rng.gen_range(6.0f64.to_radians()..14.0f64.to_radians());
        let lower = rng.gen_range(0.0..0.5);
        let upper = rng.gen_range(lower + 0.5..1.0);
        debug!(angle, lower, upper, "warping body");

        let frame = BendFrame {
            origin: [0.0, 0.0, 0.0],
            tilt: FRAC_PI_2,
        };
        ops.bend(body, frame, angle, lower, upper, Axis::X)?;
        Ok(())
    }

    /// Nominal box around the comb with a small margin along x and y.
    /// Computed from the parameters, not the mesh: defects never move
    /// geometry far enough to matter for framing.
    fn bounding_box(&self) -> BoundingBox {
        let d = &self.derived;
        let width = self.params.width;
        BoundingBox::new(
            [-d.height / 40.0, -21.0 / 40.0 * width, 0.0],
            [41.0 / 40.0 * d.height, 21.0 / 40.0 * width, self.params.thickness],
        )
    }
}

fn select_vertices<F>(
    ops: &mut dyn OperatorBundle,
    solid: &SolidHandle,
    pred: F,
) -> Result<Vec<VertexId>, MeshError>
where
    F: Fn(&[f64; 3]) -> bool,
{
    Ok(ops
        .as_inspect()
        .vertices(solid)?
        .into_iter()
        .filter(|v| pred(&v.position))
        .map(|v| v.id)
        .collect())
}
