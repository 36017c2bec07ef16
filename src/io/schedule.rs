//! Read/write the shipping schedule CSV.
//!
//! The schedule is the hand-off between the offline builder and the online
//! resolver. Two columns:
//!
//! - `Weight Bracket (lb)`: the bracket label (`≤ 1 lb`, `3–6 lb`, ...)
//! - `avg Shipping Charge`: `$X.XX`, or empty when the bracket has no data
//!
//! Labels are matched against the configured `BracketSet` by exact text; the
//! numeric bounds always come from the set, never from the file.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use log::{info, warn};

use crate::bracket::{BracketSet, BracketTable};
use crate::error::DataError;
use crate::io::ingest::{ensure_columns, get_optional, open_csv, parse_finite, read_header_map};

pub const LABEL_COLUMN: &str = "Weight Bracket (lb)";
pub const COST_COLUMN: &str = "avg Shipping Charge";

/// Serialize a table as schedule CSV.
pub fn write_schedule<W: Write>(writer: W, table: &BracketTable) -> Result<(), csv::Error> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record([LABEL_COLUMN, COST_COLUMN])?;
    for entry in table.entries() {
        out.write_record([entry.bracket.label.as_str(), entry.cost_display().as_str()])?;
    }
    out.flush()?;
    Ok(())
}

/// Write the schedule CSV file.
pub fn write_schedule_csv(path: &Path, table: &BracketTable) -> Result<(), DataError> {
    let file = File::create(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_schedule(file, table).map_err(|source| DataError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Wrote {} bracket(s) to {}", table.len(), path.display());
    Ok(())
}

/// Read a schedule CSV against the configured brackets.
///
/// Brackets missing from the file come back as "no data".
pub fn read_schedule_csv(path: &Path, brackets: &BracketSet) -> Result<BracketTable, DataError> {
    if !path.is_file() {
        return Err(DataError::NotFound(path.to_path_buf()));
    }

    let mut reader = open_csv(path)?;
    let header_map = read_header_map(&mut reader, path)?;
    ensure_columns(path, &header_map, &[LABEL_COLUMN, COST_COLUMN])?;

    let mut table = BracketTable::empty(brackets);
    let mut seen = vec![false; brackets.len()];

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = result.map_err(|source| DataError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

        let Some(label) = get_optional(&record, &header_map, LABEL_COLUMN) else {
            continue;
        };
        let pos = brackets
            .position_of_label(label)
            .ok_or_else(|| DataError::UnknownBracket {
                path: path.to_path_buf(),
                label: label.to_string(),
            })?;

        let cost = match get_optional(&record, &header_map, COST_COLUMN) {
            None => None,
            Some(raw) => Some(parse_currency(raw).ok_or_else(|| DataError::InvalidCell {
                path: path.to_path_buf(),
                line,
                column: COST_COLUMN.to_string(),
                value: raw.to_string(),
            })?),
        };

        table.set_cost(pos, cost);
        seen[pos] = true;
    }

    let missing: Vec<&str> = brackets
        .iter()
        .zip(&seen)
        .filter(|(_, seen)| !**seen)
        .map(|(b, _)| b.label.as_str())
        .collect();
    if !missing.is_empty() {
        warn!(
            "{} has no row for bracket(s) {}; treating them as no data",
            path.display(),
            missing.join(", ")
        );
    }

    Ok(table)
}

/// `$5.00`, `5.00` → 5.0. Pandas writes blank cells as `nan` in some exports.
fn parse_currency(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("nan") {
        return None;
    }
    parse_finite(trimmed.trim_start_matches('$'))
}
