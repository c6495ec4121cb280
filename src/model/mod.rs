//! Seasonal state-space model reconstruction and forecasting.

pub mod sarima;

pub use sarima::*;
