//! Exogenous feature encoding.
//!
//! This module turns a temperature series into the regressor matrix consumed
//! by the seasonal model:
//!
//! - cooling/heating degree-hours against a fixed baseline
//! - six binary day-of-week indicators (Monday is the reference level)
//!
//! Design goals:
//! - **Fixed column set**: the output always has exactly 8 columns in
//!   canonical order, zero-filling weekdays that never occur in the input.
//! - **Deterministic behavior**: pure function of the input series and the
//!   baseline; no hidden state.
//! - The same encoder builds both the anchoring exog (from the historical
//!   table) and the forecast exog (from live weather), which is what keeps
//!   the coefficient mapping valid across the two.

use chrono::{Datelike, NaiveDateTime};
use nalgebra::DMatrix;

/// Canonical exogenous column order.
///
/// `dow_1`..`dow_6` are Tuesday..Sunday; Monday (`dow_0`) is the dropped
/// reference level.
pub const EXOG_COLUMNS: [&str; 8] = [
    "CDH", "HDH", "dow_1", "dow_2", "dow_3", "dow_4", "dow_5", "dow_6",
];

/// A feature matrix with named, ordered columns.
///
/// Column identity matters: the model checks names and order structurally
/// before accepting a forecast-time matrix, so the names travel with the
/// values instead of being an implicit convention.
#[derive(Debug, Clone, PartialEq)]
pub struct ExogMatrix {
    pub columns: Vec<String>,
    pub values: DMatrix<f64>,
}

impl ExogMatrix {
    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_cols(&self) -> usize {
        self.values.ncols()
    }

    /// Structural equality of the column set (names and order).
    pub fn columns_match(&self, other: &ExogMatrix) -> bool {
        self.columns == other.columns
    }

    /// Dot product of row `i` with a coefficient slice.
    ///
    /// Panics if `betas.len() != n_cols`; callers validate the parameter
    /// layout before getting here.
    pub fn row_dot(&self, i: usize, betas: &[f64]) -> f64 {
        let mut acc = 0.0;
        for (j, b) in betas.iter().enumerate() {
            acc += self.values[(i, j)] * b;
        }
        acc
    }
}

/// Encode `(timestamp, temperature)` pairs into the canonical exog matrix.
///
/// Timestamps are assumed zone-local already (the weather API localizes on
/// request; the historical table is stored in local market time).
pub fn encode_exog(times: &[NaiveDateTime], temps: &[f64], t_base: f64) -> ExogMatrix {
    debug_assert_eq!(times.len(), temps.len());
    let n = times.len().min(temps.len());

    let mut values = DMatrix::zeros(n, EXOG_COLUMNS.len());
    for i in 0..n {
        let (cdh, hdh) = degree_hours(temps[i], t_base);
        values[(i, 0)] = cdh;
        values[(i, 1)] = hdh;

        // Monday = 0 is the baseline: all indicator columns stay 0.
        let dow = times[i].weekday().num_days_from_monday() as usize;
        if dow >= 1 {
            values[(i, 1 + dow)] = 1.0;
        }
    }

    ExogMatrix {
        columns: EXOG_COLUMNS.iter().map(|s| s.to_string()).collect(),
        values,
    }
}

/// Cooling and heating degree-hours for one temperature reading.
pub fn degree_hours(temp: f64, t_base: f64) -> (f64, f64) {
    ((temp - t_base).max(0.0), (t_base - temp).max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::T_BASE;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn hour(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn degree_hours_never_both_positive() {
        for t in [-30.0, 0.0, 17.9, 18.0, 18.1, 45.0] {
            let (cdh, hdh) = degree_hours(t, T_BASE);
            assert!(cdh >= 0.0 && hdh >= 0.0);
            assert!(cdh == 0.0 || hdh == 0.0, "both positive at t={t}");
            // CDH - HDH == t - T_BASE for all t.
            assert_relative_eq!(cdh - hdh, t - T_BASE, max_relative = 1e-12);
        }
    }

    #[test]
    fn output_always_has_eight_columns() {
        // A single Wednesday row: Saturday/Sunday flags must still exist.
        let times = vec![hour(2025, 6, 4, 12)];
        let exog = encode_exog(&times, &[25.0], T_BASE);
        assert_eq!(exog.n_cols(), 8);
        assert_eq!(exog.columns, EXOG_COLUMNS.to_vec());
        assert_relative_eq!(exog.values[(0, 0)], 7.0); // CDH
        assert_relative_eq!(exog.values[(0, 1)], 0.0); // HDH
        // Wednesday → dow_2 set, everything else zero.
        assert_relative_eq!(exog.values[(0, 3)], 1.0);
        let others: f64 = [2, 4, 5, 6, 7]
            .iter()
            .map(|&j| exog.values[(0, j)])
            .sum();
        assert_relative_eq!(others, 0.0);
    }

    #[test]
    fn week_long_series_one_hot_per_row() {
        // 2025-06-02 is a Monday; one row per day across a full week.
        let times: Vec<_> = (0..7).map(|d| hour(2025, 6, 2 + d, 0)).collect();
        let temps = vec![18.0; 7];
        let exog = encode_exog(&times, &temps, T_BASE);

        for i in 0..7 {
            let flags: f64 = (2..8).map(|j| exog.values[(i, j)]).sum();
            let expected = if i == 0 { 0.0 } else { 1.0 };
            assert_relative_eq!(flags, expected, max_relative = 1e-12);
        }
        // Monday row has every indicator column at zero.
        for j in 2..8 {
            assert_relative_eq!(exog.values[(0, j)], 0.0);
        }
        // Sunday sets the last column.
        assert_relative_eq!(exog.values[(6, 7)], 1.0);
    }

    #[test]
    fn columns_match_is_structural() {
        let times = vec![hour(2025, 1, 6, 0)];
        let a = encode_exog(&times, &[10.0], T_BASE);
        let mut b = encode_exog(&times, &[20.0], T_BASE);
        assert!(a.columns_match(&b));
        b.columns.swap(0, 1);
        assert!(!a.columns_match(&b));
    }

    #[test]
    fn row_dot_applies_coefficients_in_order() {
        let times = vec![hour(2025, 6, 3, 0)]; // Tuesday → dow_1
        let exog = encode_exog(&times, &[20.0], T_BASE);
        let mut betas = [0.0; 8];
        betas[0] = 2.0; // CDH = 2.0 → contributes 4.0
        betas[2] = 5.0; // dow_1 → contributes 5.0
        assert_relative_eq!(exog.row_dot(0, &betas), 9.0);
    }
}
