//! External data sources.
//!
//! - live hourly weather (`weather`)
//! - the per-zone model parameter store (`store`)

pub mod store;
pub mod weather;

pub use store::*;
pub use weather::*;
