//! MockOperator: deterministic test double implementing MeshOperator + MeshInspect.
//!
//! Tracks real vertex positions for primitives and transforms so that
//! predicate-based vertex classification behaves like it would against a
//! live engine. Booleans, bevels and deformations are modeled just deeply
//! enough for the build pipeline's observable behavior: union merges
//! vertices into the target, subtract removes vertices inside the cutter's
//! bounding box, bevel/remesh/bend validate their arguments and are
//! recorded. Every call is appended to an operation log that scenario
//! tests query.

use std::collections::HashMap;

use crate::traits::{MeshInspect, MeshOperator};
use crate::types::*;

/// One recorded engine call, with the arguments tests care about.
#[derive(Debug, Clone, PartialEq)]
pub enum OpRecord {
    CreateBox {
        solid: SolidHandle,
    },
    CreateCone {
        solid: SolidHandle,
        segments: u32,
    },
    CreateCylinder {
        solid: SolidHandle,
    },
    Union {
        target: SolidHandle,
        other: SolidHandle,
        solver: BooleanSolver,
    },
    Subtract {
        target: SolidHandle,
        other: SolidHandle,
        solver: BooleanSolver,
    },
    Bevel {
        target: SolidHandle,
        vertex_count: usize,
        radius: f64,
        segments: u32,
        clamp_overlap: bool,
    },
    Remesh {
        target: SolidHandle,
        voxel_size: f64,
        adaptivity: f64,
    },
    Bend {
        target: SolidHandle,
        angle: f64,
        lower: f64,
        upper: f64,
        axis: Axis,
        tilt: f64,
    },
    Translate {
        target: SolidHandle,
        delta: [f64; 3],
    },
    Rotate {
        target: SolidHandle,
        axis: Axis,
        angle: f64,
    },
    Scale {
        target: SolidHandle,
        factors: [f64; 3],
    },
    DisplaceVertex {
        target: SolidHandle,
        vertex: VertexId,
    },
    Duplicate {
        source: SolidHandle,
        copy: SolidHandle,
    },
    Destroy {
        solid: SolidHandle,
    },
    AssignMaterial {
        target: SolidHandle,
        material: MaterialHandle,
    },
}

#[derive(Debug, Clone)]
struct MockSolid {
    vertices: Vec<MeshVertex>,
}

impl MockSolid {
    fn centroid(&self) -> [f64; 3] {
        let n = self.vertices.len().max(1) as f64;
        let mut c = [0.0; 3];
        for v in &self.vertices {
            for i in 0..3 {
                c[i] += v.position[i];
            }
        }
        [c[0] / n, c[1] / n, c[2] / n]
    }

    fn bounds(&self) -> ([f64; 3], [f64; 3]) {
        let mut min = [f64::INFINITY; 3];
        let mut max = [f64::NEG_INFINITY; 3];
        for v in &self.vertices {
            for i in 0..3 {
                min[i] = min[i].min(v.position[i]);
                max[i] = max[i].max(v.position[i]);
            }
        }
        (min, max)
    }
}

/// Deterministic test double for the mesh engine.
pub struct MockOperator {
    next_solid: u64,
    next_vertex: u64,
    next_material: u64,
    solids: HashMap<u64, MockSolid>,
    log: Vec<OpRecord>,
    fail_booleans_after: Option<usize>,
}

impl MockOperator {
    pub fn new() -> Self {
        Self {
            next_solid: 1,
            next_vertex: 1,
            next_material: 1,
            solids: HashMap::new(),
            log: Vec::new(),
            fail_booleans_after: None,
        }
    }

    /// The full operation log, in call order.
    pub fn log(&self) -> &[OpRecord] {
        &self.log
    }

    /// Arrange for the boolean call after the next `count` successful
    /// ones to fail once with `BooleanFailed`. Used to exercise error
    /// cleanup paths.
    pub fn fail_booleans_after(&mut self, count: usize) {
        self.fail_booleans_after = Some(count);
    }

    /// Axis-aligned bounds of a solid's vertices.
    pub fn solid_bounds(&self, solid: &SolidHandle) -> Result<([f64; 3], [f64; 3]), MeshError> {
        Ok(self.get(solid)?.bounds())
    }

    fn alloc_solid(&mut self) -> SolidHandle {
        let h = SolidHandle(self.next_solid);
        self.next_solid += 1;
        h
    }

    fn alloc_vertex(&mut self) -> VertexId {
        let id = VertexId(self.next_vertex);
        self.next_vertex += 1;
        id
    }

    fn get(&self, solid: &SolidHandle) -> Result<&MockSolid, MeshError> {
        self.solids
            .get(&solid.id())
            .ok_or(MeshError::SolidNotFound { id: solid.id() })
    }

    fn get_mut(&mut self, solid: &SolidHandle) -> Result<&mut MockSolid, MeshError> {
        self.solids
            .get_mut(&solid.id())
            .ok_or(MeshError::SolidNotFound { id: solid.id() })
    }

    fn check_boolean_failure(&mut self) -> Result<(), MeshError> {
        if let Some(remaining) = self.fail_booleans_after {
            if remaining == 0 {
                self.fail_booleans_after = None;
                return Err(MeshError::BooleanFailed {
                    reason: "injected failure".to_string(),
                });
            }
            self.fail_booleans_after = Some(remaining - 1);
        }
        Ok(())
    }

    fn insert(&mut self, vertices: Vec<[f64; 3]>) -> SolidHandle {
        let verts = vertices
            .into_iter()
            .map(|position| MeshVertex {
                id: self.alloc_vertex(),
                position,
            })
            .collect();
        let handle = self.alloc_solid();
        self.solids.insert(handle.id(), MockSolid { vertices: verts });
        handle
    }

    fn ring(radius: f64, z: f64, segments: u32, center: [f64; 3]) -> Vec<[f64; 3]> {
        (0..segments)
            .map(|k| {
                let angle = 2.0 * std::f64::consts::PI * k as f64 / segments as f64;
                [
                    center[0] + radius * angle.cos(),
                    center[1] + radius * angle.sin(),
                    center[2] + z,
                ]
            })
            .collect()
    }
}

impl Default for MockOperator {
    fn default() -> Self {
        Self::new()
    }
}

fn rotate_about(point: [f64; 3], pivot: [f64; 3], axis: Axis, angle: f64) -> [f64; 3] {
    let p = [
        point[0] - pivot[0],
        point[1] - pivot[1],
        point[2] - pivot[2],
    ];
    let (sin, cos) = angle.sin_cos();
    let r = match axis {
        Axis::X => [p[0], p[1] * cos - p[2] * sin, p[1] * sin + p[2] * cos],
        Axis::Y => [p[0] * cos + p[2] * sin, p[1], -p[0] * sin + p[2] * cos],
        Axis::Z => [p[0] * cos - p[1] * sin, p[0] * sin + p[1] * cos, p[2]],
    };
    [r[0] + pivot[0], r[1] + pivot[1], r[2] + pivot[2]]
}

impl MeshOperator for MockOperator {
    fn create_box(&mut self, center: [f64; 3], size: [f64; 3]) -> Result<SolidHandle, MeshError> {
        let h = [size[0] / 2.0, size[1] / 2.0, size[2] / 2.0];
        let mut corners = Vec::with_capacity(8);
        for &sx in &[-1.0, 1.0] {
            for &sy in &[-1.0, 1.0] {
                for &sz in &[-1.0, 1.0] {
                    corners.push([
                        center[0] + sx * h[0],
                        center[1] + sy * h[1],
                        center[2] + sz * h[2],
                    ]);
                }
            }
        }
        let solid = self.insert(corners);
        self.log.push(OpRecord::CreateBox {
            solid: solid.clone(),
        });
        Ok(solid)
    }

    fn create_cone(
        &mut self,
        radius_bottom: f64,
        radius_top: f64,
        height: f64,
        segments: u32,
        center: [f64; 3],
    ) -> Result<SolidHandle, MeshError> {
        let mut verts = Self::ring(radius_bottom, -height / 2.0, segments, center);
        verts.extend(Self::ring(radius_top, height / 2.0, segments, center));
        let solid = self.insert(verts);
        self.log.push(OpRecord::CreateCone {
            solid: solid.clone(),
            segments,
        });
        Ok(solid)
    }

    fn create_cylinder(
        &mut self,
        radius: f64,
        depth: f64,
        center: [f64; 3],
    ) -> Result<SolidHandle, MeshError> {
        let mut verts = Self::ring(radius, -depth / 2.0, 16, center);
        verts.extend(Self::ring(radius, depth / 2.0, 16, center));
        let solid = self.insert(verts);
        self.log.push(OpRecord::CreateCylinder {
            solid: solid.clone(),
        });
        Ok(solid)
    }

    fn union(
        &mut self,
        target: &SolidHandle,
        other: &SolidHandle,
        solver: BooleanSolver,
    ) -> Result<(), MeshError> {
        self.check_boolean_failure()?;
        let absorbed: Vec<[f64; 3]> = self
            .get(other)?
            .vertices
            .iter()
            .map(|v| v.position)
            .collect();
        // Re-ID absorbed vertices: boolean output invalidates prior ids.
        let new_verts: Vec<MeshVertex> = absorbed
            .into_iter()
            .map(|position| MeshVertex {
                id: self.alloc_vertex(),
                position,
            })
            .collect();
        self.get_mut(target)?.vertices.extend(new_verts);
        self.log.push(OpRecord::Union {
            target: target.clone(),
            other: other.clone(),
            solver,
        });
        Ok(())
    }

    fn subtract(
        &mut self,
        target: &SolidHandle,
        other: &SolidHandle,
        solver: BooleanSolver,
    ) -> Result<(), MeshError> {
        self.check_boolean_failure()?;
        let (min, max) = self.get(other)?.bounds();
        let inside = |p: [f64; 3]| (0..3).all(|i| p[i] > min[i] && p[i] < max[i]);
        self.get_mut(target)?
            .vertices
            .retain(|v| !inside(v.position));
        self.log.push(OpRecord::Subtract {
            target: target.clone(),
            other: other.clone(),
            solver,
        });
        Ok(())
    }

    fn bevel(
        &mut self,
        target: &SolidHandle,
        vertices: &[VertexId],
        radius: f64,
        segments: u32,
        clamp_overlap: bool,
    ) -> Result<(), MeshError> {
        if vertices.is_empty() {
            return Err(MeshError::BevelFailed {
                reason: "empty vertex selection".to_string(),
            });
        }
        if radius <= 0.0 {
            return Err(MeshError::BevelFailed {
                reason: "radius must be positive".to_string(),
            });
        }
        let solid = self.get(target)?;
        for id in vertices {
            if !solid.vertices.iter().any(|v| v.id == *id) {
                return Err(MeshError::VertexNotFound { id: *id });
            }
        }
        self.log.push(OpRecord::Bevel {
            target: target.clone(),
            vertex_count: vertices.len(),
            radius,
            segments,
            clamp_overlap,
        });
        Ok(())
    }

    fn remesh(
        &mut self,
        target: &SolidHandle,
        voxel_size: f64,
        adaptivity: f64,
    ) -> Result<(), MeshError> {
        if voxel_size <= 0.0 {
            return Err(MeshError::RemeshFailed {
                reason: "voxel size must be positive".to_string(),
            });
        }
        self.get(target)?;
        self.log.push(OpRecord::Remesh {
            target: target.clone(),
            voxel_size,
            adaptivity,
        });
        Ok(())
    }

    fn bend(
        &mut self,
        target: &SolidHandle,
        frame: BendFrame,
        angle: f64,
        lower: f64,
        upper: f64,
        axis: Axis,
    ) -> Result<(), MeshError> {
        if !(0.0..=1.0).contains(&lower) || !(0.0..=1.0).contains(&upper) || lower >= upper {
            return Err(MeshError::BendFailed {
                reason: format!("invalid bend limits: {lower}..{upper}"),
            });
        }
        self.get(target)?;
        self.log.push(OpRecord::Bend {
            target: target.clone(),
            angle,
            lower,
            upper,
            axis,
            tilt: frame.tilt,
        });
        Ok(())
    }

    fn translate(&mut self, target: &SolidHandle, delta: [f64; 3]) -> Result<(), MeshError> {
        let solid = self.get_mut(target)?;
        for v in &mut solid.vertices {
            for i in 0..3 {
                v.position[i] += delta[i];
            }
        }
        self.log.push(OpRecord::Translate {
            target: target.clone(),
            delta,
        });
        Ok(())
    }

    fn rotate(&mut self, target: &SolidHandle, axis: Axis, angle: f64) -> Result<(), MeshError> {
        let solid = self.get_mut(target)?;
        let pivot = solid.centroid();
        for v in &mut solid.vertices {
            v.position = rotate_about(v.position, pivot, axis, angle);
        }
        self.log.push(OpRecord::Rotate {
            target: target.clone(),
            axis,
            angle,
        });
        Ok(())
    }

    fn scale(&mut self, target: &SolidHandle, factors: [f64; 3]) -> Result<(), MeshError> {
        let solid = self.get_mut(target)?;
        let pivot = solid.centroid();
        for v in &mut solid.vertices {
            for i in 0..3 {
                v.position[i] = pivot[i] + (v.position[i] - pivot[i]) * factors[i];
            }
        }
        self.log.push(OpRecord::Scale {
            target: target.clone(),
            factors,
        });
        Ok(())
    }

    fn displace_vertex(
        &mut self,
        target: &SolidHandle,
        vertex: VertexId,
        delta: [f64; 3],
    ) -> Result<(), MeshError> {
        let solid = self.get_mut(target)?;
        let v = solid
            .vertices
            .iter_mut()
            .find(|v| v.id == vertex)
            .ok_or(MeshError::VertexNotFound { id: vertex })?;
        for i in 0..3 {
            v.position[i] += delta[i];
        }
        self.log.push(OpRecord::DisplaceVertex {
            target: target.clone(),
            vertex,
        });
        Ok(())
    }

    fn duplicate(&mut self, source: &SolidHandle) -> Result<SolidHandle, MeshError> {
        let positions: Vec<[f64; 3]> = self
            .get(source)?
            .vertices
            .iter()
            .map(|v| v.position)
            .collect();
        let copy = self.insert(positions);
        self.log.push(OpRecord::Duplicate {
            source: source.clone(),
            copy: copy.clone(),
        });
        Ok(copy)
    }

    fn destroy(&mut self, solid: SolidHandle) -> Result<(), MeshError> {
        self.solids
            .remove(&solid.id())
            .ok_or(MeshError::SolidNotFound { id: solid.id() })?;
        self.log.push(OpRecord::Destroy { solid });
        Ok(())
    }

    fn assign_material(&mut self, target: &SolidHandle) -> Result<MaterialHandle, MeshError> {
        self.get(target)?;
        let material = MaterialHandle(self.next_material);
        self.next_material += 1;
        self.log.push(OpRecord::AssignMaterial {
            target: target.clone(),
            material: material.clone(),
        });
        Ok(material)
    }
}

impl MeshInspect for MockOperator {
    fn vertices(&self, solid: &SolidHandle) -> Result<Vec<MeshVertex>, MeshError> {
        Ok(self.get(solid)?.vertices.clone())
    }

    fn live_solids(&self) -> usize {
        self.solids.len()
    }
}
