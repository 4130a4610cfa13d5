use rand::Rng;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box handed to the camera-fit collaborator.
///
/// Stored as min/max extents; `corners` emits the 8-point layout the
/// frustum-fit call expects (y-major, then x, z from top to bottom).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl BoundingBox {
    pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        Self { min, max }
    }

    /// Extent along an axis (0 = x, 1 = y, 2 = z).
    pub fn extent(&self, axis: usize) -> f64 {
        self.max[axis] - self.min[axis]
    }

    /// The 8 corner points, ordered for the camera frustum-fit call:
    /// for each y extreme, both x extremes, z from max to min.
    pub fn corners(&self) -> [[f64; 3]; 8] {
        let (min, max) = (self.min, self.max);
        [
            [min[0], min[1], max[2]],
            [min[0], min[1], min[2]],
            [max[0], min[1], max[2]],
            [max[0], min[1], min[2]],
            [min[0], max[1], max[2]],
            [min[0], max[1], min[2]],
            [max[0], max[1], max[2]],
            [max[0], max[1], min[2]],
        ]
    }

    /// Randomly extend the box outward along x and y.
    ///
    /// Each of the four horizontal directions gets an independent uniform
    /// offset in `[0, max_x]` / `[0, max_y]`. The z extent is untouched.
    /// Used by the scene driver to vary how tightly the camera frames the
    /// object.
    pub fn randomly_extended<R: Rng>(&self, rng: &mut R, max_x: f64, max_y: f64) -> Self {
        let x_pos = rng.gen_range(0.0..=max_x);
        let x_neg = rng.gen_range(0.0..=max_x);
        let y_pos = rng.gen_range(0.0..=max_y);
        let y_neg = rng.gen_range(0.0..=max_y);

        Self {
            min: [self.min[0] - x_neg, self.min[1] - y_neg, self.min[2]],
            max: [self.max[0] + x_pos, self.max[1] + y_pos, self.max[2]],
        }
    }

    /// True if the point lies inside or on the boundary.
    pub fn contains(&self, point: [f64; 3]) -> bool {
        (0..3).all(|i| point[i] >= self.min[i] && point[i] <= self.max[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_corners_cover_all_extremes() {
        let bb = BoundingBox::new([-1.0, -2.0, 0.0], [3.0, 2.0, 1.0]);
        let corners = bb.corners();

        assert_eq!(corners.len(), 8);
        for corner in &corners {
            assert!(bb.contains(*corner));
        }
        // Every axis hits both extremes across the corner set.
        for axis in 0..3 {
            assert!(corners.iter().any(|c| c[axis] == bb.min[axis]));
            assert!(corners.iter().any(|c| c[axis] == bb.max[axis]));
        }
    }

    #[test]
    fn test_random_extension_only_grows() {
        let bb = BoundingBox::new([0.0, 0.0, 0.0], [10.0, 5.0, 2.0]);
        let mut rng = Pcg32::seed_from_u64(7);

        for _ in 0..100 {
            let extended = bb.randomly_extended(&mut rng, 3.0, 4.0);
            assert!(extended.min[0] <= bb.min[0] && extended.min[0] >= bb.min[0] - 3.0);
            assert!(extended.max[0] >= bb.max[0] && extended.max[0] <= bb.max[0] + 3.0);
            assert!(extended.min[1] <= bb.min[1] && extended.min[1] >= bb.min[1] - 4.0);
            assert!(extended.max[1] >= bb.max[1] && extended.max[1] <= bb.max[1] + 4.0);
            // z untouched
            assert_eq!(extended.min[2], bb.min[2]);
            assert_eq!(extended.max[2], bb.max[2]);
        }
    }

    #[test]
    fn test_extent() {
        let bb = BoundingBox::new([-1.0, 0.0, 0.0], [2.0, 5.0, 3.0]);
        assert_eq!(bb.extent(0), 3.0);
        assert_eq!(bb.extent(1), 5.0);
        assert_eq!(bb.extent(2), 3.0);
    }
}
