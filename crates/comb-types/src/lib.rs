//! Shared plain types for the haircomb dataset generator.
//!
//! Everything here is serializable and free of engine state: defect
//! category definitions, per-object defect instances, and the bounding
//! box handed to the camera-fit collaborator.

pub mod bbox;
pub mod defect;

pub use bbox::BoundingBox;
pub use defect::{DefectConfig, DefectInstance, DefectKind, TextureDefect};
