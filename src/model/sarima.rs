//! Seasonal ARIMA model with exogenous regressors, anchored from stored
//! coefficients.
//!
//! The fit happens elsewhere; this module reconstructs the declarative model
//! *shape* (`ModelOrder`), loads an opaque coefficient vector into it, and
//! runs the conditional one-step-ahead innovation recursion over the full
//! history with those fixed coefficients. That single O(n) filtering pass is
//! what re-establishes the model's internal state; nothing is re-estimated
//! and no stationarity/invertibility constraint is enforced.
//!
//! Coefficient layout (internal to this module, opaque to every caller):
//!
//! ```text
//! [exog betas (k)] [ar (p)] [ma (q)] [seasonal ar (P)] [seasonal ma (Q)] [sigma2]
//! ```
//!
//! The multiplicative seasonal polynomials are expanded into full lag
//! coefficient vectors once at construction, so filtering and forecasting
//! share one recursion.

use nalgebra::DVector;
use thiserror::Error;

use crate::domain::ModelOrder;
use crate::features::ExogMatrix;

/// Failures while reconstructing or projecting a zone's model.
///
/// All of these are per-zone recoverable: the orchestrator folds them into a
/// sentinel record and moves on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("empty history series")]
    EmptyHistory,

    #[error("insufficient history: need at least {needed} observations, got {got}")]
    InsufficientHistory { needed: usize, got: usize },

    #[error("history series and exog matrix disagree: {series} observations vs {rows} rows")]
    HistoryShapeMismatch { series: usize, rows: usize },

    #[error("parameter vector length {got} does not match model structure (expected {expected})")]
    ParameterLength { expected: usize, got: usize },

    #[error("forecast exog columns do not match the anchoring matrix")]
    ExogColumnMismatch,

    #[error("non-finite value during {0}")]
    NonFinite(&'static str),
}

/// A ready-to-forecast seasonal model handle.
///
/// Holds the filtered state: the regression-adjusted series at every
/// differencing level plus the innovation sequence, which is all the
/// forecast recursion needs.
#[derive(Debug, Clone)]
pub struct SeasonalModel {
    order: ModelOrder,
    betas: Vec<f64>,
    /// Expanded AR lag coefficients; index `k` applies to lag `k + 1`.
    ar_full: Vec<f64>,
    /// Expanded MA lag coefficients; index `k` applies to lag `k + 1`.
    ma_full: Vec<f64>,
    columns: Vec<String>,
    /// Regression-adjusted series at each seasonal differencing level;
    /// `levels[0]` is undifferenced, `levels[seasonal_d]` drives the ARMA
    /// recursion.
    levels: Vec<Vec<f64>>,
    /// One-step-ahead innovations aligned with the deepest level.
    innovations: Vec<f64>,
}

impl SeasonalModel {
    /// Reconstruct a zone's model and filter it against history.
    ///
    /// `params` is the stored flat coefficient vector; `y` and `exog` are the
    /// zone's cleaned observation series and anchoring regressors, row-aligned.
    pub fn filter(
        order: ModelOrder,
        params: &[f64],
        y: &[f64],
        exog: &ExogMatrix,
    ) -> Result<Self, ModelError> {
        if y.is_empty() {
            return Err(ModelError::EmptyHistory);
        }
        if exog.n_rows() != y.len() {
            return Err(ModelError::HistoryShapeMismatch {
                series: y.len(),
                rows: exog.n_rows(),
            });
        }
        let needed = order.min_observations();
        if y.len() < needed {
            return Err(ModelError::InsufficientHistory {
                needed,
                got: y.len(),
            });
        }

        let k = exog.n_cols();
        let expected = order.num_params(k);
        if params.len() != expected {
            return Err(ModelError::ParameterLength {
                expected,
                got: params.len(),
            });
        }

        let betas = params[..k].to_vec();
        let ar_end = k + order.p;
        let ma_end = ar_end + order.q;
        let sar_end = ma_end + order.seasonal_p;
        let sma_end = sar_end + order.seasonal_q;
        let ar = &params[k..ar_end];
        let ma = &params[ar_end..ma_end];
        let sar = &params[ma_end..sar_end];
        let sma = &params[sar_end..sma_end];
        // Trailing value is the innovation variance; the mean forecast does
        // not use it.

        let s = order.seasonal_period;
        let ar_full = expand_multiplicative(ar, sar, s, -1.0);
        let ma_full = expand_multiplicative(ma, sma, s, 1.0);

        // Regression adjustment over the whole history in one product.
        let beta_vec = DVector::from_column_slice(&betas);
        let effects = &exog.values * &beta_vec;
        let z: Vec<f64> = y
            .iter()
            .zip(effects.iter())
            .map(|(&obs, &eff)| obs - eff)
            .collect();
        if z.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::NonFinite("regression adjustment"));
        }

        // Seasonal differencing, keeping every level for later integration.
        let mut levels = vec![z];
        for _ in 0..order.seasonal_d {
            let prev = levels.last().expect("at least one level");
            if prev.len() <= s {
                return Err(ModelError::InsufficientHistory {
                    needed,
                    got: y.len(),
                });
            }
            let diffed: Vec<f64> = (s..prev.len()).map(|t| prev[t] - prev[t - s]).collect();
            levels.push(diffed);
        }

        // Conditional innovation recursion over the deepest level. Lags that
        // reach before the start of the series contribute zero, matching the
        // conditional (CSS-style) treatment of pre-sample values.
        let w = levels.last().expect("differenced level");
        let mut innovations = Vec::with_capacity(w.len());
        for t in 0..w.len() {
            let pred = recurse_step(t, w, &innovations, &ar_full, &ma_full);
            let eps = w[t] - pred;
            if !eps.is_finite() {
                return Err(ModelError::NonFinite("history filtering"));
            }
            innovations.push(eps);
        }

        Ok(Self {
            order,
            betas,
            ar_full,
            ma_full,
            columns: exog.columns.clone(),
            levels,
            innovations,
        })
    }

    /// Exog column set the model was anchored with.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Project the filtered state forward, one step per future exog row.
    ///
    /// Future innovations are zero; each step is conditioned on the matching
    /// exog row. An empty matrix yields an empty forecast.
    pub fn forecast(&self, future: &ExogMatrix) -> Result<Vec<f64>, ModelError> {
        if future.columns != self.columns {
            return Err(ModelError::ExogColumnMismatch);
        }

        let steps = future.n_rows();
        if steps == 0 {
            return Ok(Vec::new());
        }

        let s = self.order.seasonal_period;
        let w = self.levels.last().expect("differenced level");
        let n = w.len();

        // Extend the deepest level with the ARMA recursion.
        let mut w_ext = w.clone();
        let mut eps_ext = self.innovations.clone();
        for _ in 0..steps {
            let t = w_ext.len();
            let pred = recurse_step(t, &w_ext, &eps_ext, &self.ar_full, &self.ma_full);
            w_ext.push(pred);
            eps_ext.push(0.0);
        }
        let mut fut: Vec<f64> = w_ext[n..].to_vec();

        // Undo each seasonal differencing level, shallowest last.
        for level in self.levels[..self.levels.len() - 1].iter().rev() {
            let base_len = level.len();
            let mut undone = Vec::with_capacity(steps);
            for (h, &v) in fut.iter().enumerate() {
                let idx = base_len + h - s;
                let prev = if idx < base_len {
                    level[idx]
                } else {
                    undone[idx - base_len]
                };
                undone.push(v + prev);
            }
            fut = undone;
        }

        // Add back each step's regression effect.
        let mut out = Vec::with_capacity(steps);
        for (h, &v) in fut.iter().enumerate() {
            let y_hat = v + future.row_dot(h, &self.betas);
            if !y_hat.is_finite() {
                return Err(ModelError::NonFinite("forecast extension"));
            }
            out.push(y_hat);
        }

        Ok(out)
    }
}

/// One step of the shared ARMA recursion at index `t`.
///
/// `series` holds the (possibly extended) differenced values strictly before
/// `t` at indices `< t`; `eps` the innovations likewise. Lags reaching before
/// index 0 are treated as zero.
fn recurse_step(t: usize, series: &[f64], eps: &[f64], ar_full: &[f64], ma_full: &[f64]) -> f64 {
    let mut pred = 0.0;
    for (k, &coef) in ar_full.iter().enumerate() {
        if coef != 0.0 && t > k {
            pred += coef * series[t - k - 1];
        }
    }
    for (k, &coef) in ma_full.iter().enumerate() {
        if coef != 0.0 && t > k {
            pred += coef * eps[t - k - 1];
        }
    }
    pred
}

/// Expand the product of a non-seasonal and a seasonal lag polynomial into a
/// flat lag coefficient vector (index `k` → lag `k + 1`).
///
/// `cross_sign` is −1 for AR polynomials, `(1 − φB)(1 − ΦB^s)`, where the
/// cross term enters negated, and +1 for MA polynomials, `(1 + θB)(1 + ΘB^s)`.
fn expand_multiplicative(nonseasonal: &[f64], seasonal: &[f64], s: usize, cross_sign: f64) -> Vec<f64> {
    let max_lag = nonseasonal.len() + seasonal.len() * s;
    let mut out = vec![0.0; max_lag];

    for (i, &c) in nonseasonal.iter().enumerate() {
        out[i] += c;
    }
    for (j, &cs) in seasonal.iter().enumerate() {
        let lag_s = (j + 1) * s;
        out[lag_s - 1] += cs;
        for (i, &c) in nonseasonal.iter().enumerate() {
            out[lag_s + i] += cross_sign * c * cs;
        }
    }

    out
}
