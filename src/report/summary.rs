//! Reduce a zone's predicted-mean sequence to its fixed-shape summary.
//!
//! The report window sits one seasonal period before the tail of the 10-day
//! horizon buffer: slice `[len - 240, len - 216)` of the forecast. That
//! offset is only meaningful for the fixed weather request shape, which is
//! why both live together in `ForecastWindow`.

use thiserror::Error;

use crate::domain::{ForecastRecord, ForecastWindow, SEASONAL_PERIOD};

/// Failures while reducing a forecast to its summary; per-zone recoverable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SummaryError {
    #[error("forecast too short for the report window: need {needed} steps, got {got}")]
    TooShort { needed: usize, got: usize },

    #[error("forecast length {len} is not a whole number of days")]
    RaggedDays { len: usize },

    #[error("non-finite value in predicted means")]
    NonFinite,
}

/// Derive the per-zone record from a predicted-mean sequence.
///
/// - load curve: the report window rounded to the nearest integer
/// - peak hour: index of the window's maximum (first occurrence on ties)
/// - anomaly flag: rank the last `ranked_days` daily means descending, mark
///   the top two days, and keep only the first day's mark, which is the
///   behavior downstream consumers rely on
pub fn summarize(
    zone: &str,
    mean_forecast: &[f64],
    window: &ForecastWindow,
) -> Result<ForecastRecord, SummaryError> {
    let len = mean_forecast.len();
    if len < window.report_offset_back || len < window.ranked_days * SEASONAL_PERIOD {
        return Err(SummaryError::TooShort {
            needed: window.report_offset_back.max(window.ranked_days * SEASONAL_PERIOD),
            got: len,
        });
    }
    if len % SEASONAL_PERIOD != 0 {
        return Err(SummaryError::RaggedDays { len });
    }
    if mean_forecast.iter().any(|v| !v.is_finite()) {
        return Err(SummaryError::NonFinite);
    }

    let start = len - window.report_offset_back;
    let day = &mean_forecast[start..start + window.report_len];

    let load_curve: Vec<i64> = day.iter().map(|v| v.round() as i64).collect();
    let peak_hour = argmax(day) as i64;

    let daily_means: Vec<f64> = mean_forecast
        .chunks_exact(SEASONAL_PERIOD)
        .map(|chunk| chunk.iter().sum::<f64>() / SEASONAL_PERIOD as f64)
        .collect();
    let tail = &daily_means[daily_means.len() - window.ranked_days..];
    let flags = top_two_flags(tail);
    let anomaly_flag = flags[0];

    Ok(ForecastRecord {
        zone: zone.to_string(),
        load_curve,
        peak_hour,
        anomaly_flag,
    })
}

/// Index of the maximum value, first occurrence on ties.
fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// Binary flags marking the two highest daily means.
///
/// Ties break toward the earlier day so the output is deterministic.
fn top_two_flags(daily_means: &[f64]) -> Vec<i64> {
    let mut order: Vec<usize> = (0..daily_means.len()).collect();
    order.sort_by(|&a, &b| {
        daily_means[b]
            .partial_cmp(&daily_means[a])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });

    let mut flags = vec![0i64; daily_means.len()];
    for &i in order.iter().take(2) {
        flags[i] = 1;
    }
    flags
}
