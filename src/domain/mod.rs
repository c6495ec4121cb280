//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the fixed seasonal model structure (`ModelOrder`)
//! - run configuration (`PipelineConfig`)
//! - per-zone outputs (`ForecastRecord`)
//! - the static zone → location registry (`registry`)

pub mod registry;
pub mod types;

pub use registry::*;
pub use types::*;
