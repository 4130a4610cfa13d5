use mesh_kernel::{MeshInspect, MeshOperator};

/// Combined trait for pipeline code that needs both mutable engine access
/// and read-only vertex introspection on the same session.
pub trait OperatorBundle: MeshOperator + MeshInspect {
    fn as_inspect(&self) -> &dyn MeshInspect;
}

// Blanket implementation for any type that implements both traits
impl<T: MeshOperator + MeshInspect> OperatorBundle for T {
    fn as_inspect(&self) -> &dyn MeshInspect {
        self
    }
}
