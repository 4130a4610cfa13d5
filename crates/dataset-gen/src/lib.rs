//! Dataset generation driver.
//!
//! Ties the sampler and the builder into whole runs: load a JSON run
//! configuration, then repeatedly sample a defect combination, construct
//! the comb against the mesh engine, hand it to the rendering backend for
//! a few images, and record one ground-truth label per image. Objects
//! that fail during mesh construction are dropped and replaced so a run
//! always delivers the configured image count.

pub mod config;
pub mod driver;
pub mod labels;

pub use config::{load_config, ConfigError, GeneratorConfig, ObjectConfig, OutputConfig, SurfaceFinish};
pub use driver::{Appearance, BatchDriver, BatchReport, DriverError, RenderError, Renderer};
pub use labels::LabelRecord;
