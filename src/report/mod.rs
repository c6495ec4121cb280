//! Forecast reduction and output assembly.
//!
//! We keep summary/formatting code in one place so:
//! - the model code stays clean and testable
//! - the output record's field order is defined exactly once

pub mod format;
pub mod summary;

pub use format::*;
pub use summary::*;
