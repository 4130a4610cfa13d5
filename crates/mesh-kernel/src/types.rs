use serde::{Deserialize, Serialize};

/// Opaque handle to a solid owned by the mesh engine.
/// Valid only for the current engine session. NEVER persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SolidHandle(pub(crate) u64);

impl SolidHandle {
    pub(crate) fn id(&self) -> u64 {
        self.0
    }
}

/// Opaque handle to a material slot attached to a solid.
/// Shading parameters are set by an external collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MaterialHandle(pub(crate) u64);

/// Transient engine-internal vertex identifier.
/// Stable within a session but invalidated by topology-changing operations;
/// classifications must be recomputed after booleans and bevels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VertexId(pub u64);

/// A vertex with its world-space position, as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshVertex {
    pub id: VertexId,
    pub position: [f64; 3],
}

/// World axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Boolean solver selection.
///
/// `Exact` handles coincident geometry robustly and is required where the
/// operand overlaps the target along shared faces; `Fast` is adequate for
/// clean transversal intersections and much cheaper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BooleanSolver {
    Exact,
    Fast,
}

/// Placement of the axis frame for a bend deformation.
///
/// `origin` is the point the bend axis passes through; `tilt` is the roll
/// of the deform frame about the world x axis, which sets the direction
/// the geometry folds toward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BendFrame {
    pub origin: [f64; 3],
    pub tilt: f64,
}

/// Errors from mesh-engine operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MeshError {
    #[error("boolean operation failed: {reason}")]
    BooleanFailed { reason: String },

    #[error("bevel failed: {reason}")]
    BevelFailed { reason: String },

    #[error("remesh failed: {reason}")]
    RemeshFailed { reason: String },

    #[error("bend failed: {reason}")]
    BendFailed { reason: String },

    /// An operation left the mesh non-manifold or self-intersecting.
    /// Unrecoverable for the current build; the driver decides whether to
    /// retry at object granularity.
    #[error("degenerate result after {operation}")]
    DegenerateResult { operation: String },

    #[error("solid not found: handle {id}")]
    SolidNotFound { id: u64 },

    #[error("vertex not found: {id:?}")]
    VertexNotFound { id: VertexId },

    #[error("operation not supported: {operation}")]
    NotSupported { operation: String },

    #[error("mesh engine error: {message}")]
    Other { message: String },
}
