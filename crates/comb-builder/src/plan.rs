use comb_types::DefectInstance;
use rand::seq::index;
use rand::Rng;

use crate::angles::bend_angle_schedule;
use crate::params::CombParams;

/// How one tooth of the sweep is treated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToothOp {
    /// Plain union into the body.
    Normal,
    /// Broken off near the root: unioned, then cut with a jittered cutter.
    Missing,
    /// Bent before union. All lengths are fractions of the tooth extent
    /// along its own axis; angles are radians.
    Bent {
        angle: f64,
        lower: f64,
        upper: f64,
        /// Fraction along the tooth where the bend axis sits.
        origin: f64,
        /// Roll of the bend frame, sets the fold direction.
        tilt: f64,
    },
}

/// Per-tooth operation schedule for one build, fixed before the sweep
/// starts so the geometry loop stays branch-free on randomness.
#[derive(Debug, Clone)]
pub struct ToothPlan {
    ops: Vec<ToothOp>,
}

/// Success probability of the geometric draw for the missing-teeth count.
const MISSING_GEOMETRIC_P: f64 = 0.2;

impl ToothPlan {
    /// Draw the schedule for `params.tooth_count` teeth.
    ///
    /// Missing teeth: a geometric(0.2) count of distinct random positions.
    /// Bent teeth: one contiguous run of up to 20 teeth sharing a fold
    /// direction, with a ramped angle profile and per-tooth jitter. Where
    /// both defects land on the same tooth, missing wins: a stump cannot
    /// also be bent.
    pub fn generate<R: Rng>(
        params: &CombParams,
        defects: &DefectInstance,
        rng: &mut R,
    ) -> ToothPlan {
        let count = params.tooth_count as usize;
        let mut ops = vec![ToothOp::Normal; count];

        if defects.bent_teeth {
            let run_len = rng.gen_range(1..=20usize).min(count);
            let start = rng.gen_range(0..=count - run_len);
            let direction = rng.gen_range(-20.0f64.to_radians()..200.0f64.to_radians());
            let origin_center: f64 = rng.gen_range(0.2..0.6);
            let max_angle = rng.gen_range(6.0f64.to_radians()..15.0f64.to_radians());
            let angles = bend_angle_schedule(run_len, max_angle, rng);

            for (i, angle) in angles.into_iter().enumerate() {
                let origin = (origin_center + rng.gen_range(-0.1..0.1)).clamp(0.2, 0.6);
                let upper = origin + 0.15 + rng.gen_range(0.0..0.1);
                let tilt =
                    direction + rng.gen_range(-10.0f64.to_radians()..10.0f64.to_radians());
                ops[start + i] = ToothOp::Bent {
                    angle,
                    lower: origin,
                    upper,
                    origin,
                    tilt,
                };
            }
        }

        if defects.missing_teeth {
            let missing = geometric_capped(rng, MISSING_GEOMETRIC_P, count);
            for i in index::sample(rng, count, missing) {
                ops[i] = ToothOp::Missing;
            }
        }

        ToothPlan { ops }
    }

    pub fn op(&self, tooth: usize) -> ToothOp {
        self.ops[tooth]
    }

    pub fn iter(&self) -> impl Iterator<Item = ToothOp> + '_ {
        self.ops.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn has_missing(&self) -> bool {
        self.ops.iter().any(|op| matches!(op, ToothOp::Missing))
    }

    pub fn has_bent(&self) -> bool {
        self.ops.iter().any(|op| matches!(op, ToothOp::Bent { .. }))
    }
}

/// Geometric draw starting at 1: count Bernoulli(p) failures until the
/// first success, capped at `cap` so a cold streak cannot run away.
fn geometric_capped<R: Rng>(rng: &mut R, p: f64, cap: usize) -> usize {
    let mut n = 1;
    while n < cap && !rng.gen_bool(p) {
        n += 1;
    }
    n
}
