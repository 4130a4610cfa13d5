use serde::{Deserialize, Serialize};

use crate::builder::BuildError;

/// Base dimensions of the haircomb, in millimeters.
///
/// Everything else about the geometry is derived from these six values;
/// see [`CombParams::derived`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombParams {
    /// Overall width.
    pub width: f64,
    /// Overall thickness.
    pub thickness: f64,
    /// Height of the base/head part.
    pub base_height: f64,
    /// Width of one of the two side arms.
    pub side_width: f64,
    /// Length of the teeth.
    pub tooth_height: f64,
    /// Number of teeth.
    pub tooth_count: u32,
}

impl Default for CombParams {
    fn default() -> Self {
        Self {
            width: 135.5,
            thickness: 3.0,
            base_height: 10.0,
            side_width: 7.0,
            tooth_height: 20.0,
            tooth_count: 46,
        }
    }
}

/// Dimensions derived from [`CombParams`]. Pure function of the base set;
/// recomputed on every build so edited base params can never go stale.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedParams {
    /// Overall height (base + teeth).
    pub height: f64,
    /// Standard rounding radius for most edges.
    pub general_radius: f64,
    /// Radius of the rounded head corners.
    pub base_radius: f64,
    /// Length of the two side arms.
    pub side_height: f64,
    pub side_thickness: f64,
    /// Radius of the outer rounding on the side arms.
    pub side_radius: f64,
    /// Width of one tooth. Chosen so that teeth and gaps tile the span
    /// between the two side arms exactly.
    pub tooth_width: f64,
    /// Gap between two teeth (equal to the tooth width).
    pub tooth_spacing: f64,
    pub middle_width: f64,
    pub middle_thickness: f64,
    pub middle_height: f64,
}

impl CombParams {
    pub fn validate(&self) -> Result<(), BuildError> {
        if self.tooth_count < 1 {
            return Err(BuildError::InvalidParameter {
                reason: "tooth_count must be at least 1".to_string(),
            });
        }
        let dims = [
            ("width", self.width),
            ("thickness", self.thickness),
            ("base_height", self.base_height),
            ("side_width", self.side_width),
            ("tooth_height", self.tooth_height),
        ];
        for (name, value) in dims {
            if value <= 0.0 {
                return Err(BuildError::InvalidParameter {
                    reason: format!("{name} must be positive, got {value}"),
                });
            }
        }
        if 2.0 * self.side_width >= self.width {
            return Err(BuildError::InvalidParameter {
                reason: "side arms must leave room for teeth".to_string(),
            });
        }
        Ok(())
    }

    pub fn derived(&self) -> DerivedParams {
        DerivedParams {
            height: self.base_height + self.tooth_height,
            general_radius: self.thickness / 5.0,
            base_radius: self.base_height,
            side_height: self.tooth_height,
            side_thickness: self.thickness,
            side_radius: 0.85 * self.side_width,
            tooth_width: (self.width - 2.0 * self.side_width)
                / (2.0 * self.tooth_count as f64 + 1.0),
            tooth_spacing: (self.width - 2.0 * self.side_width)
                / (2.0 * self.tooth_count as f64 + 1.0),
            middle_width: self.width,
            middle_thickness: self.thickness / 3.0,
            middle_height: self.base_height / 3.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_teeth_tile_width_exactly() {
        for count in [1u32, 5, 10, 46, 99] {
            let params = CombParams {
                tooth_count: count,
                ..Default::default()
            };
            let d = params.derived();

            // n teeth and n+1 gaps fill the span between the side arms.
            let tiled = count as f64 * d.tooth_width
                + (count as f64 + 1.0) * d.tooth_spacing
                + 2.0 * params.side_width;
            assert_relative_eq!(tiled, params.width, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_derived_values_for_default_dimensions() {
        let params = CombParams::default();
        let d = params.derived();

        assert_relative_eq!(d.height, 30.0);
        assert_relative_eq!(d.general_radius, 0.6);
        assert_relative_eq!(d.base_radius, 10.0);
        assert_relative_eq!(d.side_radius, 5.95);
        assert_relative_eq!(d.middle_thickness, 1.0);
        assert_relative_eq!(d.middle_height, 10.0 / 3.0);
        assert_relative_eq!(d.tooth_width, (135.5 - 14.0) / 93.0, epsilon = 1e-12);
    }

    #[test]
    fn test_validate_rejects_zero_teeth() {
        let params = CombParams {
            tooth_count: 0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_nonpositive_dimensions() {
        let params = CombParams {
            thickness: 0.0,
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = CombParams {
            tooth_height: -1.0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_side_arms() {
        let params = CombParams {
            width: 10.0,
            side_width: 5.0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }
}
