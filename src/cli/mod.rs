//! Command-line parsing for `shipcost`.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! bracket/ingest code. Parsed arguments are folded into `BuildConfig` /
//! `AppConfig` in `app.rs`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::bracket::DEFAULT_UPPER_BOUNDS;
use crate::domain::WeightUnit;

pub mod prompt;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "shipcost", version, about = "Shipping cost estimates from weight brackets")]
pub struct Cli {
    #[command(flatten)]
    pub tables: TableArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Table locations shared by every subcommand.
///
/// Each can also come from the environment (or a `.env` file).
#[derive(Debug, Args, Clone)]
pub struct TableArgs {
    /// Item table CSV with `SKU` and `Package Weight` columns.
    #[arg(long, global = true, env = "SHIPCOST_ITEMS", default_value = "Item.csv")]
    pub items: PathBuf,

    /// Shipping schedule CSV read by lookups.
    #[arg(long, global = true, env = "SHIPCOST_SCHEDULE", default_value = "shipping_schedule.csv")]
    pub schedule: PathBuf,

    /// Append-only observations log written by `feedback` and `upload`.
    #[arg(long = "log", global = true, env = "SHIPCOST_LOG", default_value = "feedback.csv")]
    pub log_path: PathBuf,

    /// Bracket upper bounds in lb, comma-separated and increasing.
    #[arg(
        long,
        global = true,
        env = "SHIPCOST_BRACKETS",
        value_delimiter = ',',
        default_values_t = DEFAULT_UPPER_BOUNDS.to_vec()
    )]
    pub brackets: Vec<f64>,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Rebuild the shipping schedule from order exports (weight column `variant_weight`).
    Build(BuildArgs),
    /// Same as `build`, with the weight column defaulting to `weight_lb`.
    Update(BuildArgs),
    /// Print the estimated shipping cost for one or more SKUs.
    Lookup(LookupArgs),
    /// Write the SKU -> cost lookup table for the whole item catalog as JSON.
    Export(ExportArgs),
    /// Record an actual shipping cost for a SKU.
    Feedback(FeedbackArgs),
    /// Append the (SKU, cost) rows of a CSV file to the observations log.
    Upload(UploadArgs),
    /// Prompt for SKUs until `exit` (the default when no subcommand is given).
    Interactive,
}

/// Options for `build` / `update`.
#[derive(Debug, Args, Clone)]
pub struct BuildArgs {
    /// CSV files or glob patterns with weight and cost columns.
    #[arg(short = 'i', long = "input", required = true, num_args = 1..)]
    pub inputs: Vec<String>,

    /// Output CSV path.
    #[arg(short = 'o', long, default_value = "shipping_schedule.csv")]
    pub output: PathBuf,

    /// Weight column name (default depends on the subcommand).
    #[arg(long)]
    pub weight_col: Option<String>,

    /// Cost column name.
    #[arg(long)]
    pub cost_col: Option<String>,

    /// Unit of the weight column.
    #[arg(long, value_enum, default_value_t = WeightUnit::Oz)]
    pub unit: WeightUnit,
}

#[derive(Debug, Args, Clone)]
pub struct LookupArgs {
    /// SKUs to look up (case-insensitive).
    #[arg(required = true)]
    pub skus: Vec<String>,
}

#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    /// Output JSON path.
    #[arg(short = 'o', long, default_value = "sku_to_cost.json")]
    pub output: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct FeedbackArgs {
    #[arg(long)]
    pub sku: String,

    /// Actual shipping cost in dollars (e.g. 15.99).
    #[arg(long)]
    pub cost: String,
}

#[derive(Debug, Args, Clone)]
pub struct UploadArgs {
    /// CSV with a `SKU` column and `delivery_cost` and/or `shipping_cost`.
    pub file: PathBuf,

    /// Where to keep a timestamped copy of the upload.
    #[arg(long, default_value = "uploads")]
    pub archive_dir: PathBuf,

    /// Do not keep a copy of the upload.
    #[arg(long)]
    pub no_archive: bool,
}
