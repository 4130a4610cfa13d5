//! Queries and assertions over the mock engine's operation log.
//!
//! Scenario tests verify the build pipeline by its observable engine
//! calls: which booleans ran with which solver, what got remeshed or bent,
//! and whether scratch solids were released.

use mesh_kernel::{Axis, BooleanSolver, MeshInspect, MockOperator, OpRecord};

use crate::helpers::HarnessError;

// ── Log Queries ─────────────────────────────────────────────────────────────

/// Count union calls, optionally restricted to one solver.
pub fn count_unions(log: &[OpRecord], solver: Option<BooleanSolver>) -> usize {
    log.iter()
        .filter(|r| match r {
            OpRecord::Union { solver: s, .. } => solver.map_or(true, |want| *s == want),
            _ => false,
        })
        .count()
}

/// Count subtract calls, optionally restricted to one solver.
pub fn count_subtracts(log: &[OpRecord], solver: Option<BooleanSolver>) -> usize {
    log.iter()
        .filter(|r| match r {
            OpRecord::Subtract { solver: s, .. } => solver.map_or(true, |want| *s == want),
            _ => false,
        })
        .count()
}

pub fn count_bevels(log: &[OpRecord]) -> usize {
    log.iter()
        .filter(|r| matches!(r, OpRecord::Bevel { .. }))
        .count()
}

pub fn count_remeshes(log: &[OpRecord]) -> usize {
    log.iter()
        .filter(|r| matches!(r, OpRecord::Remesh { .. }))
        .count()
}

pub fn count_bends(log: &[OpRecord]) -> usize {
    log.iter()
        .filter(|r| matches!(r, OpRecord::Bend { .. }))
        .count()
}

pub fn count_destroys(log: &[OpRecord]) -> usize {
    log.iter()
        .filter(|r| matches!(r, OpRecord::Destroy { .. }))
        .count()
}

/// Index of the first record matching the predicate.
pub fn position_of<F>(log: &[OpRecord], pred: F) -> Option<usize>
where
    F: Fn(&OpRecord) -> bool,
{
    log.iter().position(pred)
}

// ── Assertions ──────────────────────────────────────────────────────────────

/// Assert the number of solids alive in the session.
pub fn assert_live_solids(
    ops: &MockOperator,
    expected: usize,
    ctx: &str,
) -> Result<(), HarnessError> {
    let actual = ops.live_solids();
    if actual == expected {
        Ok(())
    } else {
        Err(HarnessError::AssertionFailed {
            detail: format!(
                "[{}] expected {} live solids, got {} ({} ops logged)",
                ctx,
                expected,
                actual,
                ops.log().len(),
            ),
        })
    }
}

/// Assert that the final remesh runs before the whole-body warp, so the
/// warp deforms a dense mesh. Warp bends run about the x axis; per-tooth
/// bends use z and are ignored here.
pub fn assert_remesh_precedes_warp(
    log: &[OpRecord],
    voxel_size: f64,
    ctx: &str,
) -> Result<(), HarnessError> {
    let remesh_at = position_of(log, |r| {
        matches!(r, OpRecord::Remesh { voxel_size: v, .. } if (*v - voxel_size).abs() < 1e-12)
    })
    .ok_or_else(|| HarnessError::AssertionFailed {
        detail: format!("[{ctx}] no remesh with voxel size {voxel_size} in log"),
    })?;

    match position_of(log, |r| matches!(r, OpRecord::Bend { axis: Axis::X, .. })) {
        Some(warp_at) if warp_at < remesh_at => Err(HarnessError::AssertionFailed {
            detail: format!(
                "[{ctx}] warp bend at index {warp_at} precedes final remesh at {remesh_at}"
            ),
        }),
        _ => Ok(()),
    }
}
