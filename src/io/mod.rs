//! Input/output helpers.
//!
//! - historical load/weather CSV ingest + per-zone slicing (`history`)

pub mod history;

pub use history::*;
