//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - folds them into immutable `BuildConfig` / `AppConfig` values
//! - dispatches to the builder, the resolver front-ends or the log ingest

use std::io;

use clap::Parser;
use log::{info, warn};

use crate::bracket::BracketSet;
use crate::cli::{BuildArgs, Command, ExportArgs, FeedbackArgs, LookupArgs, TableArgs, UploadArgs};
use crate::domain::{AppConfig, BuildConfig};
use crate::error::{AppError, EXIT_LOOKUP_FAILED};
use crate::io::feedback::{ObservationLog, count_logged_rows, ingest_upload, record_feedback};

pub mod pipeline;

/// Entry point for the `shipcost` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // `shipcost` on its own (or with only table options) opens the prompt.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    let app_config = app_config_from_args(&cli.tables)?;

    match cli.command {
        Command::Build(args) => handle_build(&args, BuildPreset::Orders, &app_config),
        Command::Update(args) => handle_build(&args, BuildPreset::Schedule, &app_config),
        Command::Lookup(args) => handle_lookup(&args, &app_config),
        Command::Export(args) => handle_export(&args, &app_config),
        Command::Feedback(args) => handle_feedback(&args, &app_config),
        Command::Upload(args) => handle_upload(&args, &app_config),
        Command::Interactive => handle_interactive(&app_config),
    }
}

/// Default column names of the two builder entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuildPreset {
    /// Raw order exports (`variant_weight`, `delivery_cost`).
    Orders,
    /// Pre-cleaned shipment files (`weight_lb`, `delivery_cost`).
    Schedule,
}

impl BuildPreset {
    fn weight_col(self) -> &'static str {
        match self {
            BuildPreset::Orders => "variant_weight",
            BuildPreset::Schedule => "weight_lb",
        }
    }

    fn cost_col(self) -> &'static str {
        "delivery_cost"
    }
}

fn handle_build(args: &BuildArgs, preset: BuildPreset, app: &AppConfig) -> Result<(), AppError> {
    let config = build_config_from_args(args, preset, app.brackets.clone());
    let run = pipeline::run_build(&config)?;

    println!("{}", crate::report::format_build_summary(&run, &config));
    println!("Written to {}", config.output.display());
    Ok(())
}

fn handle_lookup(args: &LookupArgs, app: &AppConfig) -> Result<(), AppError> {
    let resolver = pipeline::load_resolver(app)?;

    let mut failed = 0usize;
    for sku in &args.skus {
        let result = resolver.resolve(sku);
        if result.is_err() {
            failed += 1;
        }
        println!("{}", crate::report::format_lookup(&result));
    }

    if failed > 0 {
        return Err(AppError::new(
            EXIT_LOOKUP_FAILED,
            format!("{failed} of {} lookup(s) failed.", args.skus.len()),
        ));
    }
    Ok(())
}

fn handle_export(args: &ExportArgs, app: &AppConfig) -> Result<(), AppError> {
    let resolver = pipeline::load_resolver(app)?;
    let costs = resolver.catalog_costs();
    crate::io::export::write_lookup_json(&args.output, &costs)?;

    let priced = costs.values().filter(|c| c.is_some()).count();
    println!(
        "Generated {} with {} entries ({priced} priced).",
        args.output.display(),
        costs.len()
    );
    Ok(())
}

fn handle_feedback(args: &FeedbackArgs, app: &AppConfig) -> Result<(), AppError> {
    let log = ObservationLog::new(&app.log_path);
    let receipt = record_feedback(&log, &args.sku, &args.cost)?;
    println!("{receipt}");
    Ok(())
}

fn handle_upload(args: &UploadArgs, app: &AppConfig) -> Result<(), AppError> {
    let log = ObservationLog::new(&app.log_path);
    let archive_dir = (!args.no_archive).then_some(args.archive_dir.as_path());
    let summary = ingest_upload(&log, &args.file, archive_dir)?;

    println!("{summary}");
    if let Some(path) = &summary.archived {
        println!("Saved a copy to {}", path.display());
    }
    if let Some(line) = log_size_line(&log) {
        println!("{line}");
    }
    Ok(())
}

/// Status line after an upload. The rows are already recorded, so a failed
/// recount is only logged.
fn log_size_line(log: &ObservationLog) -> Option<String> {
    match count_logged_rows(log) {
        Ok(total) => Some(format!("{} now holds {total} observation(s).", log.path().display())),
        Err(err) => {
            warn!("Could not count rows in {}: {err}", log.path().display());
            None
        }
    }
}

fn handle_interactive(app: &AppConfig) -> Result<(), AppError> {
    let resolver = pipeline::load_resolver(app)?;
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let lookups = crate::cli::prompt::run_prompt(&resolver, stdin.lock(), &mut stdout)?;
    info!("Interactive session ended after {lookups} lookup(s)");
    Ok(())
}

pub fn app_config_from_args(args: &TableArgs) -> Result<AppConfig, AppError> {
    Ok(AppConfig {
        items_path: args.items.clone(),
        schedule_path: args.schedule.clone(),
        log_path: args.log_path.clone(),
        brackets: BracketSet::from_upper_bounds(&args.brackets)?,
    })
}

fn build_config_from_args(args: &BuildArgs, preset: BuildPreset, brackets: BracketSet) -> BuildConfig {
    BuildConfig {
        inputs: args.inputs.clone(),
        output: args.output.clone(),
        weight_col: args
            .weight_col
            .clone()
            .unwrap_or_else(|| preset.weight_col().to_string()),
        cost_col: args
            .cost_col
            .clone()
            .unwrap_or_else(|| preset.cost_col().to_string()),
        unit: args.unit,
        brackets,
    }
}

/// Rewrite argv so `shipcost` defaults to `shipcost interactive`.
///
/// Rules:
/// - `shipcost`                        -> `shipcost interactive`
/// - `shipcost --items x.csv ...`      -> `shipcost interactive --items x.csv ...`
/// - `shipcost --help/--version/-h`    -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("interactive".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    if first_positional(&argv).is_some_and(is_subcommand) {
        return argv;
    }

    // Only global table flags were given: treat them as prompt flags.
    if arg1.starts_with('-') {
        argv.insert(1, "interactive".to_string());
    }
    argv
}

/// Global options that take a separate value (`--items x.csv`).
const VALUE_FLAGS: [&str; 4] = ["--items", "--schedule", "--log", "--brackets"];

/// First argument that is neither a flag nor the value of a global option.
fn first_positional(argv: &[String]) -> Option<&str> {
    let mut args = argv.iter().skip(1);
    while let Some(arg) = args.next() {
        if VALUE_FLAGS.contains(&arg.as_str()) {
            args.next();
        } else if !arg.starts_with('-') {
            return Some(arg.as_str());
        }
    }
    None
}

fn is_subcommand(arg: &str) -> bool {
    matches!(
        arg,
        "build" | "update" | "lookup" | "export" | "feedback" | "upload" | "interactive"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WeightUnit;
    use std::path::PathBuf;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_opens_prompt() {
        assert_eq!(rewrite_args(argv(&["shipcost"])), argv(&["shipcost", "interactive"]));
        assert_eq!(
            rewrite_args(argv(&["shipcost", "--items", "x.csv"])),
            argv(&["shipcost", "interactive", "--items", "x.csv"])
        );
    }

    #[test]
    fn option_values_named_like_subcommands_still_open_prompt() {
        assert_eq!(
            rewrite_args(argv(&["shipcost", "--items", "build"])),
            argv(&["shipcost", "interactive", "--items", "build"])
        );
        assert_eq!(
            rewrite_args(argv(&["shipcost", "--schedule", "export", "--log", "lookup"])),
            argv(&["shipcost", "interactive", "--schedule", "export", "--log", "lookup"])
        );
    }

    #[test]
    fn explicit_subcommands_are_untouched() {
        let lookup = argv(&["shipcost", "lookup", "ABC"]);
        assert_eq!(rewrite_args(lookup.clone()), lookup);

        let global_first = argv(&["shipcost", "--items", "x.csv", "lookup", "ABC"]);
        assert_eq!(rewrite_args(global_first.clone()), global_first);

        let eq_form = argv(&["shipcost", "--log=f.csv", "upload", "a.csv"]);
        assert_eq!(rewrite_args(eq_form.clone()), eq_form);

        let help = argv(&["shipcost", "--help"]);
        assert_eq!(rewrite_args(help.clone()), help);
    }

    #[test]
    fn presets_supply_default_columns() {
        let args = BuildArgs {
            inputs: vec!["orders.csv".to_string()],
            output: PathBuf::from("out.csv"),
            weight_col: None,
            cost_col: None,
            unit: WeightUnit::Oz,
        };

        let orders = build_config_from_args(&args, BuildPreset::Orders, BracketSet::default());
        assert_eq!(orders.weight_col, "variant_weight");
        assert_eq!(orders.cost_col, "delivery_cost");

        let schedule = build_config_from_args(&args, BuildPreset::Schedule, BracketSet::default());
        assert_eq!(schedule.weight_col, "weight_lb");

        let custom = BuildArgs {
            weight_col: Some("grams".to_string()),
            ..args
        };
        assert_eq!(
            build_config_from_args(&custom, BuildPreset::Orders, BracketSet::default()).weight_col,
            "grams"
        );
    }

    #[test]
    fn upload_succeeds_and_reports_log_size() {
        let dir = tempfile::tempdir().unwrap();
        let upload = dir.path().join("orders.csv");
        std::fs::write(&upload, "SKU,delivery_cost\nabc,4.5\nxyz,6\n").unwrap();

        let app = AppConfig {
            items_path: dir.path().join("Item.csv"),
            schedule_path: dir.path().join("shipping_schedule.csv"),
            log_path: dir.path().join("feedback.csv"),
            brackets: BracketSet::default(),
        };
        let args = UploadArgs {
            file: upload,
            archive_dir: dir.path().join("uploads"),
            no_archive: true,
        };
        handle_upload(&args, &app).unwrap();

        let log = ObservationLog::new(&app.log_path);
        assert!(log_size_line(&log).unwrap().ends_with("now holds 2 observation(s)."));
        assert!(!dir.path().join("uploads").exists());
    }

    #[test]
    fn unreadable_log_only_drops_status_line() {
        let dir = tempfile::tempdir().unwrap();
        // A directory opens but cannot be read as CSV.
        let log = ObservationLog::new(dir.path());
        assert_eq!(log_size_line(&log), None);
    }

    #[test]
    fn invalid_brackets_are_fatal() {
        let tables = TableArgs {
            items: PathBuf::from("Item.csv"),
            schedule: PathBuf::from("shipping_schedule.csv"),
            log_path: PathBuf::from("feedback.csv"),
            brackets: vec![3.0, 1.0],
        };
        let err = app_config_from_args(&tables).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_FAILURE);
    }
}
