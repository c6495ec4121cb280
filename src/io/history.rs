//! Historical dataset ingest and per-zone slicing.
//!
//! The merged training table (one CSV, all zones) is loaded once per run and
//! then sliced per zone to re-anchor each stored model. Design goals:
//!
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Structural filters at load time**: administrative aggregate areas and
//!   pre-cutover rows never reach the per-zone stage
//! - **Separation of concerns**: no model logic here

use std::fs::File;
use std::path::Path;

use chrono::{Datelike, NaiveDateTime};
use csv::StringRecord;

use crate::error::AppError;
use crate::features::{encode_exog, ExogMatrix};

/// Aggregate areas present in the merged table that are not true load zones.
pub const EXCLUDED_AREAS: [&str; 2] = ["AE", "RTO"];

/// First calendar year of the current model generation's training window.
pub const CUTOVER_YEAR: i32 = 2025;

const COL_TIMESTAMP: &str = "datetime_beginning_ept";
const COL_ZONE: &str = "load_area";
const COL_LOAD: &str = "mw";
const COL_TEMP: &str = "temperature_2m";

/// One usable observation from the merged table.
///
/// Load/temperature stay optional here: whether a missing value matters is
/// decided per zone, not globally.
#[derive(Debug, Clone)]
pub struct HistoryRow {
    pub ts: NaiveDateTime,
    pub zone: String,
    pub mw: Option<f64>,
    pub temp: Option<f64>,
}

/// The loaded and structurally filtered table.
#[derive(Debug, Clone)]
pub struct HistoryTable {
    pub rows: Vec<HistoryRow>,
    pub rows_read: usize,
    pub rows_skipped: usize,
}

/// A zone's cleaned observation series plus its anchoring exog matrix.
#[derive(Debug, Clone)]
pub struct ZoneHistory {
    pub times: Vec<NaiveDateTime>,
    pub loads: Vec<f64>,
    pub exog: ExogMatrix,
}

/// Load the merged table, apply structural filters, and validate the result.
///
/// Fatal conditions (the run aborts before any per-zone work):
/// - the file is missing or unreadable
/// - a required column is absent
/// - zero rows survive the cutover filter across the whole table
pub fn load_history(path: &Path) -> Result<HistoryTable, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open history CSV '{}': {e}", path.display()))
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let idx = resolve_columns(&headers)?;

    let mut rows = Vec::new();
    let mut rows_read = 0usize;
    let mut rows_skipped = 0usize;

    for record in reader.records() {
        let record = match record {
            Ok(r) => r,
            Err(_) => {
                rows_skipped += 1;
                continue;
            }
        };
        rows_read += 1;

        let Some(ts) = record.get(idx.ts).and_then(parse_timestamp) else {
            rows_skipped += 1;
            continue;
        };
        let Some(zone) = record.get(idx.zone).filter(|z| !z.is_empty()) else {
            rows_skipped += 1;
            continue;
        };

        // Structural exclusions: aggregate areas and pre-cutover rows.
        if EXCLUDED_AREAS.contains(&zone) || ts.year() < CUTOVER_YEAR {
            continue;
        }

        rows.push(HistoryRow {
            ts,
            zone: zone.to_string(),
            mw: record.get(idx.mw).and_then(parse_number),
            temp: record.get(idx.temp).and_then(parse_number),
        });
    }

    if rows.is_empty() {
        return Err(AppError::new(
            3,
            format!("No data from {CUTOVER_YEAR} onward found in '{}'.", path.display()),
        ));
    }

    Ok(HistoryTable {
        rows,
        rows_read,
        rows_skipped,
    })
}

impl HistoryTable {
    /// Build one zone's cleaned `(series, exog)` pair.
    ///
    /// Rows with a missing load or temperature are dropped and the result is
    /// sorted ascending by timestamp. An empty result is `None`: the caller
    /// treats it as a per-zone failure, never as a run abort.
    pub fn zone_history(&self, zone: &str, t_base: f64) -> Option<ZoneHistory> {
        let mut rows: Vec<(&HistoryRow, f64, f64)> = self
            .rows
            .iter()
            .filter(|r| r.zone == zone)
            .filter_map(|r| match (r.mw, r.temp) {
                (Some(mw), Some(temp)) if mw.is_finite() && temp.is_finite() => {
                    Some((r, mw, temp))
                }
                _ => None,
            })
            .collect();

        if rows.is_empty() {
            return None;
        }

        rows.sort_by_key(|(r, _, _)| r.ts);

        let times: Vec<NaiveDateTime> = rows.iter().map(|(r, _, _)| r.ts).collect();
        let loads: Vec<f64> = rows.iter().map(|(_, mw, _)| *mw).collect();
        let temps: Vec<f64> = rows.iter().map(|(_, _, t)| *t).collect();
        let exog = encode_exog(&times, &temps, t_base);

        Some(ZoneHistory { times, loads, exog })
    }
}

struct ColumnIndex {
    ts: usize,
    zone: usize,
    mw: usize,
    temp: usize,
}

fn resolve_columns(headers: &StringRecord) -> Result<ColumnIndex, AppError> {
    let find = |name: &str| -> Result<usize, AppError> {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| AppError::new(2, format!("Missing required column '{name}' in history CSV.")))
    };

    Ok(ColumnIndex {
        ts: find(COL_TIMESTAMP)?,
        zone: find(COL_ZONE)?,
        mw: find(COL_LOAD)?,
        temp: find(COL_TEMP)?,
    })
}

/// Accept the timestamp shapes that show up in merged exports: ISO with a
/// space or `T`, and the US-style `M/D/YYYY h:MM:SS AM` form.
fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    for fmt in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%m/%d/%Y %I:%M:%S %p",
    ] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(ts);
        }
    }
    None
}

fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let v = trimmed.parse::<f64>().ok()?;
    if v.is_finite() {
        Some(v)
    } else {
        None
    }
}
