//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - runs the per-zone forecast pipeline
//! - prints the output record (and run diagnostics to stderr)
//! - writes optional exports

use std::time::Duration;

use clap::Parser;

use crate::cli::{Command, RunArgs, ZonesArgs};
use crate::domain::{ForecastWindow, ModelOrder, PipelineConfig, T_BASE};
use crate::error::AppError;

pub mod pipeline;

/// Fixed pacing delay between per-zone weather requests (third-party rate
/// limit courtesy; never skipped).
const PACE: Duration = Duration::from_millis(200);

/// Entry point for the `loadcast` binary.
pub fn run() -> Result<(), AppError> {
    // We want a bare `loadcast` to behave like `loadcast run`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of
    // the argv list before parsing. This preserves a clean clap structure
    // while keeping the one-shot invocation ergonomic for cron jobs.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Zones(args) => handle_zones(args),
    }
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let config = pipeline_config_from_args(&args);
    let run = pipeline::run_forecast(&config)?;

    let failed = run.records.iter().filter(|r| r.is_failed()).count();
    eprintln!(
        "loadcast: {} zone(s), {} succeeded, {} failed",
        run.records.len(),
        run.records.len() - failed,
        failed
    );

    let line = crate::report::assemble_record(&run.date_label, &run.records);
    println!("{line}");

    if let Some(path) = &config.output {
        crate::report::write_record(path, &line)?;
    }

    Ok(())
}

fn handle_zones(args: ZonesArgs) -> Result<(), AppError> {
    let zones = crate::data::discover_zones(&args.models_dir)?;
    if zones.is_empty() {
        return Err(AppError::new(
            3,
            format!("No stored models found in '{}'.", args.models_dir.display()),
        ));
    }
    println!("{}", crate::report::format_zone_listing(&zones));
    Ok(())
}

pub fn pipeline_config_from_args(args: &RunArgs) -> PipelineConfig {
    PipelineConfig {
        models_dir: args.models_dir.clone(),
        history_path: args.history.clone(),
        reference_date: args.reference_date,
        t_base: T_BASE,
        order: ModelOrder::hourly(),
        window: ForecastWindow::standard(),
        pace: PACE,
        output: args.output.clone(),
    }
}

/// Rewrite argv so `loadcast` defaults to `loadcast run`.
///
/// Rules:
/// - `loadcast`                     -> `loadcast run`
/// - `loadcast -m dir ...`          -> `loadcast run -m dir ...`
/// - `loadcast --help/--version/-h` -> unchanged (top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("run".to_string());
        return argv;
    };

    let is_top_level_help_or_version =
        matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "run" | "zones");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "run flags".
    if arg1.starts_with('-') {
        argv.insert(1, "run".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
