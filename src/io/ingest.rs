//! Observation ingest for the bracket builder.
//!
//! Turns one or more path/glob patterns into a flat list of
//! `ShipmentObservation`s in pounds.
//!
//! Design goals:
//! - **Strict schema**: a matched file without the configured weight or cost
//!   column aborts the whole run before anything is written
//! - **Row-level validation**: empty or non-numeric cells skip the row and are
//!   reported, not fatal
//! - **Deterministic**: matched paths are de-duplicated and sorted, so pattern
//!   order does not change the result

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use log::{debug, info, warn};

use crate::domain::{BuildConfig, ShipmentObservation};
use crate::error::DataError;

/// A row skipped during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub path: PathBuf,
    pub line: usize,
    pub message: String,
}

/// Ingest output: normalized observations plus what was skipped.
#[derive(Debug, Clone, Default)]
pub struct IngestedObservations {
    pub observations: Vec<ShipmentObservation>,
    pub files: Vec<PathBuf>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Expand path/glob patterns into a sorted, de-duplicated list of files.
pub fn expand_patterns(patterns: &[String]) -> Result<Vec<PathBuf>, DataError> {
    let mut matched = BTreeSet::new();

    for pattern in patterns {
        let paths = glob::glob(pattern).map_err(|source| DataError::InvalidPattern {
            pattern: pattern.clone(),
            source,
        })?;

        let mut hits = 0usize;
        for entry in paths {
            match entry {
                Ok(path) if path.is_file() => {
                    hits += 1;
                    matched.insert(path);
                }
                Ok(_) => {}
                Err(e) => warn!("Skipping unreadable path while expanding '{pattern}': {e}"),
            }
        }
        if hits == 0 {
            warn!("Pattern '{pattern}' matched no files");
        }
    }

    Ok(matched.into_iter().collect())
}

/// Load every observation file named by `config.inputs`.
pub fn load_observations(config: &BuildConfig) -> Result<IngestedObservations, DataError> {
    let files = expand_patterns(&config.inputs)?;
    if files.is_empty() {
        return Err(DataError::NoInput {
            patterns: config.inputs.clone(),
        });
    }

    let mut out = IngestedObservations::default();
    for path in &files {
        read_observation_file(path, config, &mut out)?;
    }
    out.files = files;

    if !out.row_errors.is_empty() {
        warn!(
            "Skipped {} of {} row(s) with missing or non-numeric weight/cost",
            out.row_errors.len(),
            out.rows_read
        );
    }

    Ok(out)
}

fn read_observation_file(
    path: &Path,
    config: &BuildConfig,
    out: &mut IngestedObservations,
) -> Result<(), DataError> {
    let mut reader = open_csv(path)?;
    let header_map = read_header_map(&mut reader, path)?;
    ensure_columns(path, &header_map, &[&config.weight_col, &config.cost_col])?;

    let weight_idx = header_map[&normalize_header_name(&config.weight_col)];
    let cost_idx = header_map[&normalize_header_name(&config.cost_col)];

    let before = out.observations.len();
    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header and CSV lines are 1-based.
        let line = idx + 2;
        out.rows_read += 1;

        let parsed = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| {
                let weight = parse_number(&record, weight_idx, &config.weight_col)?;
                let cost = parse_number(&record, cost_idx, &config.cost_col)?;
                Ok(ShipmentObservation {
                    weight_lb: config.unit.to_pounds(weight),
                    cost,
                })
            });

        match parsed {
            Ok(obs) => out.observations.push(obs),
            Err(message) => {
                debug!("{}:{line}: {message}", path.display());
                out.row_errors.push(RowError {
                    path: path.to_path_buf(),
                    line,
                    message,
                });
            }
        }
    }

    info!(
        "Read {} observation(s) from {}",
        out.observations.len() - before,
        path.display()
    );
    Ok(())
}

fn parse_number(record: &StringRecord, idx: usize, column: &str) -> Result<f64, String> {
    let raw = record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing value: `{column}`"))?;
    parse_finite(raw).ok_or_else(|| format!("Non-numeric `{column}` value '{raw}'"))
}

/// Parse a finite `f64`; `None` for text, NaN or infinities.
pub(crate) fn parse_finite(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Open a CSV with trimmed fields and tolerant row lengths.
pub(crate) fn open_csv(path: &Path) -> Result<csv::Reader<File>, DataError> {
    let file = File::open(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file))
}

pub(crate) fn read_header_map(
    reader: &mut csv::Reader<File>,
    path: &Path,
) -> Result<HashMap<String, usize>, DataError> {
    let headers = reader.headers().map_err(|source| DataError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(build_header_map(headers))
}

pub(crate) fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        // First occurrence wins for duplicated headers.
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

pub(crate) fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_lowercase()
}

/// Fail with `DataError::Schema` naming every absent column.
pub(crate) fn ensure_columns(
    path: &Path,
    header_map: &HashMap<String, usize>,
    required: &[&str],
) -> Result<(), DataError> {
    let missing: Vec<String> = required
        .iter()
        .filter(|name| !header_map.contains_key(&normalize_header_name(name)))
        .map(|name| format!("`{name}`"))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(DataError::Schema {
            path: path.to_path_buf(),
            missing,
        })
    }
}

pub(crate) fn get_optional<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Option<&'a str> {
    let idx = header_map.get(&normalize_header_name(name))?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}
