//! Output record assembly and status formatting.
//!
//! The output is one flat comma-joined record that downstream consumers parse
//! by fixed position:
//!
//! ```text
//! "YYYY-MM-DD", load×24 per zone (zone order), peak hour per zone, flag per zone
//! ```
//!
//! No reordering and no aggregation across zones happens here: purely a
//! concatenation contract.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::ForecastRecord;
use crate::error::AppError;

/// Flatten all per-zone records into the single output line.
///
/// The date is quoted; every numeric field is unquoted. Zone order is the
/// caller's (model-discovery) order.
pub fn assemble_record(date_label: &str, records: &[ForecastRecord]) -> String {
    let mut fields: Vec<String> = Vec::with_capacity(1 + records.len() * 26);
    fields.push(format!("\"{date_label}\""));

    for rec in records {
        for &v in &rec.load_curve {
            fields.push(v.to_string());
        }
    }
    for rec in records {
        fields.push(rec.peak_hour.to_string());
    }
    for rec in records {
        fields.push(rec.anomaly_flag.to_string());
    }

    fields.join(",")
}

/// Write the assembled record to a file (stdout printing is the caller's job).
pub fn write_record(path: &Path, record_line: &str) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create output file '{}': {e}", path.display()))
    })?;
    writeln!(file, "{record_line}")
        .map_err(|e| AppError::new(2, format!("Failed to write output file: {e}")))?;
    Ok(())
}

/// Human-readable zone listing for the `zones` subcommand.
pub fn format_zone_listing(zones: &[String]) -> String {
    let mut out = String::new();
    out.push_str("=== loadcast - stored zone models ===\n");
    for zone in zones {
        let status = match crate::domain::zone_location(zone) {
            Some(loc) => format!("{:.2}, {:.2} ({})", loc.latitude, loc.longitude, loc.timezone),
            None => "NO LOCATION - will produce a sentinel record".to_string(),
        };
        out.push_str(&format!("{zone:<8} {status}\n"));
    }
    out.push_str(&format!("{} zone(s) discovered.\n", zones.len()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok_record(zone: &str, base: i64) -> ForecastRecord {
        ForecastRecord {
            zone: zone.to_string(),
            load_curve: (0..24).map(|h| base + h).collect(),
            peak_hour: 23,
            anomaly_flag: 0,
        }
    }

    #[test]
    fn record_layout_is_fixed_width() {
        let records = vec![ok_record("BGE", 100), ForecastRecord::failed("PS")];
        let line = assemble_record("2025-11-20", &records);
        let fields: Vec<&str> = line.split(',').collect();

        // 1 date + 2 zones × (24 + 1 + 1)
        assert_eq!(fields.len(), 1 + 2 * 26);
        assert_eq!(fields[0], "\"2025-11-20\"");
        // First zone's curve, then second zone's sentinel curve.
        assert_eq!(fields[1], "100");
        assert_eq!(fields[24], "123");
        assert_eq!(fields[25], "-1");
        assert_eq!(fields[48], "-1");
        // Peak hours follow all curves, flags follow all peaks.
        assert_eq!(fields[49], "23");
        assert_eq!(fields[50], "-1");
        assert_eq!(fields[51], "0");
        assert_eq!(fields[52], "-1");
    }

    #[test]
    fn only_date_field_is_quoted() {
        let line = assemble_record("2025-11-20", &[ok_record("BGE", 1)]);
        assert_eq!(line.matches('"').count(), 2);
        assert!(line.starts_with("\"2025-11-20\","));
    }

    #[test]
    fn empty_zone_list_still_emits_date() {
        assert_eq!(assemble_record("2025-11-20", &[]), "\"2025-11-20\"");
    }

    #[test]
    fn zone_listing_marks_unknown_zones() {
        let listing = format_zone_listing(&["COMED".to_string(), "XX".to_string()]);
        assert!(listing.contains("America/Chicago"));
        assert!(listing.contains("NO LOCATION"));
    }
}
