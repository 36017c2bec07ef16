//! Shared pipelines used by every front-end.
//!
//! - `run_build`: ingest -> bin/average -> write schedule. Both `build` and
//!   `update` call this; they only differ in default column names.
//! - `load_resolver`: item table + schedule -> `Resolver`, built once per process.

use crate::bracket::{BinningSummary, BracketTable, Resolver, build_table_with_summary};
use crate::domain::{AppConfig, BuildConfig};
use crate::error::DataError;
use crate::io::ingest::{IngestedObservations, load_observations};
use crate::io::items::load_item_table;
use crate::io::schedule::{read_schedule_csv, write_schedule_csv};

/// All computed outputs of a single builder run.
#[derive(Debug, Clone)]
pub struct BuildRun {
    pub ingest: IngestedObservations,
    pub table: BracketTable,
    pub summary: BinningSummary,
}

/// Execute the builder and write `config.output`.
///
/// Every input file is read and validated before the output is touched, so a
/// schema failure leaves any previous schedule in place.
pub fn run_build(config: &BuildConfig) -> Result<BuildRun, DataError> {
    let run = compute_build(config)?;
    write_schedule_csv(&config.output, &run.table)?;
    Ok(run)
}

/// The builder without the final write.
pub fn compute_build(config: &BuildConfig) -> Result<BuildRun, DataError> {
    let ingest = load_observations(config)?;
    let (table, summary) = build_table_with_summary(&ingest.observations, &config.brackets);
    Ok(BuildRun {
        ingest,
        table,
        summary,
    })
}

/// Load the read-only lookup tables.
pub fn load_resolver(config: &AppConfig) -> Result<Resolver, DataError> {
    let items = load_item_table(&config.items_path)?;
    let table = read_schedule_csv(&config.schedule_path, &config.brackets)?;
    Ok(Resolver::new(items, table))
}
