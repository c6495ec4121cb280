//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during the per-zone forecast loop
//! - exported alongside the run record for debugging
//! - varied freely in unit tests (no ambient globals)

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Hours in one seasonal cycle of the load model.
pub const SEASONAL_PERIOD: usize = 24;

/// Temperature baseline (°C) for degree-hour features.
///
/// Must match the constant used when the stored parameter vectors were fit,
/// or every forecast carries a systematic bias.
pub const T_BASE: f64 = 18.0;

/// Structural orders of the seasonal model.
///
/// These are pipeline-wide constants, not per-zone settings: the stored
/// parameter vectors are only meaningful for this exact structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelOrder {
    /// Non-seasonal AR order.
    pub p: usize,
    /// Non-seasonal differencing order.
    pub d: usize,
    /// Non-seasonal MA order.
    pub q: usize,
    /// Seasonal AR order.
    pub seasonal_p: usize,
    /// Seasonal differencing order.
    pub seasonal_d: usize,
    /// Seasonal MA order.
    pub seasonal_q: usize,
    /// Seasonal period in observations (hours).
    pub seasonal_period: usize,
}

impl ModelOrder {
    /// The fixed (1,0,0)(1,1,1,24) structure used by every stored zone model.
    pub const fn hourly() -> Self {
        Self {
            p: 1,
            d: 0,
            q: 0,
            seasonal_p: 1,
            seasonal_d: 1,
            seasonal_q: 1,
            seasonal_period: SEASONAL_PERIOD,
        }
    }

    /// Expected parameter-vector length for `k_exog` regressors.
    ///
    /// Layout: exog betas, AR, seasonal AR, seasonal MA, innovation variance.
    pub fn num_params(&self, k_exog: usize) -> usize {
        k_exog + self.p + self.q + self.seasonal_p + self.seasonal_q + 1
    }

    /// Minimum history length required to anchor a model of this structure.
    ///
    /// Seasonal differencing consumes one full period and the recursion needs
    /// lags reaching one period further back; three periods gives the filter
    /// a usable run of innovations on top of that.
    pub fn min_observations(&self) -> usize {
        self.seasonal_period * 3
    }
}

impl Default for ModelOrder {
    fn default() -> Self {
        Self::hourly()
    }
}

/// Shape of the per-zone weather request and the report window carved out of
/// the resulting forecast.
///
/// The two halves are deliberately one type: the report slice offset is only
/// meaningful for this exact `forecast_days` request, so changing one without
/// the other silently misaligns the reported day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastWindow {
    /// Forward horizon requested from the weather API, in days.
    pub forecast_days: u32,
    /// Hours back from the end of the forecast where the report window starts.
    pub report_offset_back: usize,
    /// Report window length in hours.
    pub report_len: usize,
    /// Number of trailing daily buckets ranked for the anomaly flag.
    pub ranked_days: usize,
}

impl ForecastWindow {
    /// The fixed production shape: 11 forecast days, report window at
    /// `[len-240, len-216)`, anomaly ranking over the last 10 days.
    pub const fn standard() -> Self {
        Self {
            forecast_days: 11,
            report_offset_back: SEASONAL_PERIOD * 10,
            report_len: SEASONAL_PERIOD,
            ranked_days: 10,
        }
    }
}

/// Resolved configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory holding `{zone}_params.json` files.
    pub models_dir: PathBuf,
    /// Path to the merged historical load/weather CSV.
    pub history_path: PathBuf,
    /// Reference date used to size the `past_days` request window.
    pub reference_date: NaiveDate,
    /// Temperature baseline for degree-hour features.
    pub t_base: f64,
    /// Seasonal model structure.
    pub order: ModelOrder,
    /// Weather request / report window shape.
    pub window: ForecastWindow,
    /// Fixed pacing delay between per-zone weather requests.
    pub pace: Duration,
    /// Optional file to write the output record to (stdout always gets it).
    pub output: Option<PathBuf>,
}

/// Per-zone pipeline output.
///
/// Created once per run per zone and never mutated afterwards; failed zones
/// carry the −1 sentinel in every field so the output record keeps one slot
/// per zone regardless of success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub zone: String,
    /// 24 hourly loads (MW, rounded) for the reported day.
    pub load_curve: Vec<i64>,
    /// Index of the maximum load within the reported day, 0..=23.
    pub peak_hour: i64,
    /// 1 if the first of the ranked trailing days is among the two highest
    /// daily means, 0 otherwise.
    pub anomaly_flag: i64,
}

impl ForecastRecord {
    pub const SENTINEL: i64 = -1;

    /// The all-sentinel record emitted on any per-zone failure.
    pub fn failed(zone: impl Into<String>) -> Self {
        Self {
            zone: zone.into(),
            load_curve: vec![Self::SENTINEL; SEASONAL_PERIOD],
            peak_hour: Self::SENTINEL,
            anomaly_flag: Self::SENTINEL,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.peak_hour == Self::SENTINEL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hourly_order_param_count() {
        let order = ModelOrder::hourly();
        // 8 exog betas + ar + seasonal ar + seasonal ma + sigma2
        assert_eq!(order.num_params(8), 12);
        assert_eq!(order.min_observations(), 72);
    }

    #[test]
    fn standard_window_is_self_consistent() {
        let w = ForecastWindow::standard();
        // The report window must fit inside the shortest possible forecast
        // (past_days = 0 → forecast_days * 24 hours).
        assert!(w.report_offset_back <= w.forecast_days as usize * SEASONAL_PERIOD);
        assert!(w.report_len <= w.report_offset_back);
        assert_eq!(w.report_offset_back - w.report_len, SEASONAL_PERIOD * 9);
    }

    #[test]
    fn failed_record_shape() {
        let rec = ForecastRecord::failed("PS");
        assert_eq!(rec.load_curve.len(), 24);
        assert!(rec.load_curve.iter().all(|&v| v == -1));
        assert_eq!(rec.peak_hour, -1);
        assert_eq!(rec.anomaly_flag, -1);
        assert!(rec.is_failed());
    }
}
