//! Command-line parsing for the zonal load forecaster.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the modeling/pipeline code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "loadcast", version, about = "Hourly zonal load forecaster (stored seasonal models)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the full per-zone forecast pipeline and print the output record.
    Run(RunArgs),
    /// List zones discovered in the parameter store (useful for scripting).
    Zones(ZonesArgs),
}

/// Options for a full pipeline run.
#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    /// Directory holding per-zone parameter files.
    #[arg(short = 'm', long, default_value = "models")]
    pub models_dir: PathBuf,

    /// Merged historical load/weather CSV.
    #[arg(long, default_value = "merged_all_years.csv")]
    pub history: PathBuf,

    /// Reference date used to size the backward weather window
    /// (past_days = max(0, today - reference)).
    #[arg(long, default_value = "2025-11-17")]
    pub reference_date: NaiveDate,

    /// Also write the output record to this file.
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
}

/// Options for the zone listing.
#[derive(Debug, Parser, Clone)]
pub struct ZonesArgs {
    /// Directory holding per-zone parameter files.
    #[arg(short = 'm', long, default_value = "models")]
    pub models_dir: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn run_defaults() {
        let cli = Cli::parse_from(["loadcast", "run"]);
        let Command::Run(args) = cli.command else {
            panic!("expected run subcommand");
        };
        assert_eq!(args.models_dir, PathBuf::from("models"));
        assert_eq!(args.history, PathBuf::from("merged_all_years.csv"));
        assert_eq!(args.reference_date.year(), 2025);
        assert!(args.output.is_none());
    }

    #[test]
    fn run_accepts_overrides() {
        let cli = Cli::parse_from([
            "loadcast",
            "run",
            "-m",
            "/tmp/models",
            "--history",
            "/tmp/merged.csv",
            "--reference-date",
            "2025-10-01",
            "-o",
            "/tmp/out.csv",
        ]);
        let Command::Run(args) = cli.command else {
            panic!("expected run subcommand");
        };
        assert_eq!(args.models_dir, PathBuf::from("/tmp/models"));
        assert_eq!(args.reference_date, NaiveDate::from_ymd_opt(2025, 10, 1).unwrap());
        assert_eq!(args.output, Some(PathBuf::from("/tmp/out.csv")));
    }

    #[test]
    fn zones_subcommand_parses() {
        let cli = Cli::parse_from(["loadcast", "zones", "-m", "store"]);
        assert!(matches!(cli.command, Command::Zones(_)));
    }
}
