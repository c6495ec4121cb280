//! Per-zone model parameter store.
//!
//! The training stage persists one flat coefficient vector per zone as
//! `{zone}_params.json` (a bare JSON array of numbers). This module owns two
//! things and nothing else:
//!
//! - **zone discovery**: the set of forecastable zones *is* the set of
//!   parameter files, sorted by name; there is no static zone list
//! - **vector loading**: read-only, layout-opaque; interpretation belongs to
//!   the model layer

use std::fs::File;
use std::path::{Path, PathBuf};

use crate::error::AppError;

const PARAMS_SUFFIX: &str = "_params.json";

/// Enumerate zones from the parameter store, sorted by zone code.
///
/// An unreadable directory is a fatal input error; an empty result is left to
/// the caller, which treats "no stored models" as a fatal precondition.
pub fn discover_zones(models_dir: &Path) -> Result<Vec<String>, AppError> {
    let entries = std::fs::read_dir(models_dir).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to read models directory '{}': {e}", models_dir.display()),
        )
    })?;

    let mut zones = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            AppError::new(2, format!("Failed to list models directory: {e}"))
        })?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if let Some(zone) = name.strip_suffix(PARAMS_SUFFIX) {
            if !zone.is_empty() {
                zones.push(zone.to_string());
            }
        }
    }

    zones.sort();
    Ok(zones)
}

/// Path of a zone's parameter file inside the store.
pub fn params_path(models_dir: &Path, zone: &str) -> PathBuf {
    models_dir.join(format!("{zone}{PARAMS_SUFFIX}"))
}

/// Load a zone's flat coefficient vector.
///
/// The values must all be finite; a vector with NaN/inf coefficients can only
/// produce garbage forecasts, so it is rejected here rather than deep inside
/// the filter recursion.
pub fn load_params(models_dir: &Path, zone: &str) -> Result<Vec<f64>, AppError> {
    let path = params_path(models_dir, zone);
    let file = File::open(&path).map_err(|e| {
        AppError::new(2, format!("Failed to open parameter file '{}': {e}", path.display()))
    })?;

    let params: Vec<f64> = serde_json::from_reader(file).map_err(|e| {
        AppError::new(2, format!("Invalid parameter file '{}': {e}", path.display()))
    })?;

    if params.iter().any(|v| !v.is_finite()) {
        return Err(AppError::new(
            2,
            format!("Non-finite coefficient in parameter file '{}'.", path.display()),
        ));
    }

    Ok(params)
}
