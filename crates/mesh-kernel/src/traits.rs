use crate::types::*;

/// Mutating mesh-engine operations. Implemented by engine backends and by
/// [`crate::MockOperator`] (deterministic test double).
///
/// Every call takes explicit handles; there is no "active object" and no
/// persistent named selections. A given implementor is single-threaded:
/// one build owns one operator session at a time.
pub trait MeshOperator {
    /// Create a rectangular prism centered at `center` with full extents `size`.
    fn create_box(&mut self, center: [f64; 3], size: [f64; 3]) -> Result<SolidHandle, MeshError>;

    /// Create a truncated cone with its axis along z, centered at `center`.
    /// `segments` is the number of vertices per cross-section ring.
    fn create_cone(
        &mut self,
        radius_bottom: f64,
        radius_top: f64,
        height: f64,
        segments: u32,
        center: [f64; 3],
    ) -> Result<SolidHandle, MeshError>;

    /// Create a cylinder with its axis along z, centered at `center`.
    fn create_cylinder(
        &mut self,
        radius: f64,
        depth: f64,
        center: [f64; 3],
    ) -> Result<SolidHandle, MeshError>;

    /// Boolean union, in place on `target`. `other` is left alive.
    fn union(
        &mut self,
        target: &SolidHandle,
        other: &SolidHandle,
        solver: BooleanSolver,
    ) -> Result<(), MeshError>;

    /// Boolean difference (`target` minus `other`), in place on `target`.
    fn subtract(
        &mut self,
        target: &SolidHandle,
        other: &SolidHandle,
        solver: BooleanSolver,
    ) -> Result<(), MeshError>;

    /// Round the edges adjacent to the selected vertices.
    fn bevel(
        &mut self,
        target: &SolidHandle,
        vertices: &[VertexId],
        radius: f64,
        segments: u32,
        clamp_overlap: bool,
    ) -> Result<(), MeshError>;

    /// Voxel remesh: resample the surface onto a uniform grid, restoring a
    /// clean two-manifold topology at the cost of sharp-feature fidelity.
    fn remesh(
        &mut self,
        target: &SolidHandle,
        voxel_size: f64,
        adaptivity: f64,
    ) -> Result<(), MeshError>;

    /// Bend deformation about `axis` through `frame.origin`, rotating the
    /// geometry between the `lower` and `upper` limit fractions (0.0-1.0 of
    /// the extent along the deform axis) by `angle` radians.
    fn bend(
        &mut self,
        target: &SolidHandle,
        frame: BendFrame,
        angle: f64,
        lower: f64,
        upper: f64,
        axis: Axis,
    ) -> Result<(), MeshError>;

    /// Translate a solid by `delta`.
    fn translate(&mut self, target: &SolidHandle, delta: [f64; 3]) -> Result<(), MeshError>;

    /// Rotate a solid about the given world axis through its median point.
    fn rotate(&mut self, target: &SolidHandle, axis: Axis, angle: f64) -> Result<(), MeshError>;

    /// Scale a solid about its median point by per-axis factors.
    fn scale(&mut self, target: &SolidHandle, factors: [f64; 3]) -> Result<(), MeshError>;

    /// Move a single vertex by `delta`.
    fn displace_vertex(
        &mut self,
        target: &SolidHandle,
        vertex: VertexId,
        delta: [f64; 3],
    ) -> Result<(), MeshError>;

    /// Deep-copy a solid into a new handle.
    fn duplicate(&mut self, source: &SolidHandle) -> Result<SolidHandle, MeshError>;

    /// Release a solid. Scratch objects (prototypes, cutters, duplicates)
    /// must be destroyed on every exit path, success or failure.
    fn destroy(&mut self, solid: SolidHandle) -> Result<(), MeshError>;

    /// Attach a fresh material slot to a solid.
    fn assign_material(&mut self, target: &SolidHandle) -> Result<MaterialHandle, MeshError>;
}

/// Read-only mesh introspection.
///
/// Vertex classification is predicate-based over world-space positions,
/// computed fresh by the caller each time it is needed; the engine keeps
/// no named vertex groups.
pub trait MeshInspect {
    /// All vertices of a solid with world-space positions.
    fn vertices(&self, solid: &SolidHandle) -> Result<Vec<MeshVertex>, MeshError>;

    /// Number of solids currently alive in the session.
    fn live_solids(&self) -> usize;
}
