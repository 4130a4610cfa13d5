//! Mesh-engine capability layer.
//!
//! The haircomb builder never talks to a concrete 3-D engine. It consumes
//! the [`MeshOperator`] / [`MeshInspect`] traits, which expose the small
//! set of engine primitives the pipeline needs (booleans, bevel, voxel
//! remesh, bend deformation, transforms) with explicit solid handles
//! instead of ambient selection state.
//!
//! [`MockOperator`] is the deterministic in-process test double; a real
//! backend binds these traits to an external engine session.

pub mod mock;
pub mod traits;
pub mod types;

pub use mock::{MockOperator, OpRecord};
pub use traits::{MeshInspect, MeshOperator};
pub use types::{
    Axis, BendFrame, BooleanSolver, MaterialHandle, MeshError, MeshVertex, SolidHandle, VertexId,
};
