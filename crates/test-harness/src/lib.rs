//! Test harness for the haircomb generation pipeline.
//!
//! Provides shared fixtures for scenario tests: seeded RNG constructors,
//! canned configurations, a counting renderer, and query/assertion helpers
//! over the mock engine's operation log.
//!
//! # Key Components
//!
//! - [`helpers`] — config/params constructors, seeded RNGs, test renderer
//! - [`assertions`] — operation-log queries and rich assertions

pub mod assertions;
pub mod helpers;

pub use helpers::{CountingRenderer, HarnessError};
