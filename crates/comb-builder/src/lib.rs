//! Parametric haircomb construction.
//!
//! Turns a [`comb_types::DefectInstance`] into a solid mesh through an
//! ordered CSG pipeline against the abstract mesh engine: base block with
//! rounded head, flanking side arms, horizontal edge rounding, per-tooth
//! sweep with defect dispatch, middle connecting part, ejector-mark cuts,
//! voxel remesh, and an optional whole-body warp. Later stages assume the
//! mesh state left by earlier ones; the order is load-bearing.

pub mod angles;
pub mod builder;
pub mod operator_ext;
pub mod params;
pub mod plan;

pub use angles::bend_angle_schedule;
pub use builder::{BuildError, BuiltComb, HaircombBuilder};
pub use operator_ext::OperatorBundle;
pub use params::{CombParams, DerivedParams};
pub use plan::{ToothOp, ToothPlan};
