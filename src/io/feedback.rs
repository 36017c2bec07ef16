//! Observations log: single submissions and bulk CSV uploads.
//!
//! The log (`SKU,shipping_cost`) is append-only. Every append holds an
//! exclusive lock on the file and writes its rows with a single `write_all`,
//! so concurrent submitters never interleave rows. The header is written only
//! when the file is new or empty.
//!
//! The log is not read back here; operators feed it to the builder when they
//! regenerate the schedule.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use log::{debug, info, warn};
use serde::Serialize;

use crate::domain::{format_currency, normalize_sku};
use crate::error::{DataError, IngestError};
use crate::io::ingest::{get_optional, open_csv, parse_finite, read_header_map};

pub const LOG_HEADER: [&str; 2] = ["SKU", "shipping_cost"];

/// Upload columns: SKU plus the first non-empty of the cost candidates.
const UPLOAD_SKU_COLUMN: &str = "SKU";
const UPLOAD_COST_COLUMNS: [&str; 2] = ["delivery_cost", "shipping_cost"];

#[derive(Debug, Serialize)]
struct LogRow<'a> {
    #[serde(rename = "SKU")]
    sku: &'a str,
    shipping_cost: f64,
}

/// Handle on the append-only observations log.
#[derive(Debug, Clone)]
pub struct ObservationLog {
    path: PathBuf,
}

impl ObservationLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `(sku, cost)` rows under an exclusive file lock.
    pub fn append(&self, rows: &[(String, f64)]) -> Result<usize, DataError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let io_err = |source: std::io::Error| DataError::Io {
            path: self.path.clone(),
            source,
        };
        let csv_err = |source: csv::Error| DataError::Csv {
            path: self.path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err)?;
        file.lock().map_err(io_err)?;

        // Checked under the lock so only one writer emits the header.
        let write_header = file.metadata().map_err(io_err)?.len() == 0;

        let mut out = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        if write_header {
            out.write_record(LOG_HEADER).map_err(csv_err)?;
        }
        for (sku, cost) in rows {
            out.serialize(LogRow {
                sku,
                shipping_cost: *cost,
            })
            .map_err(csv_err)?;
        }
        let buf = out.into_inner().map_err(|e| io_err(e.into_error()))?;

        file.write_all(&buf).map_err(io_err)?;
        file.flush().map_err(io_err)?;
        file.unlock().map_err(io_err)?;

        info!("Appended {} row(s) to {}", rows.len(), self.path.display());
        Ok(rows.len())
    }
}

/// A recorded single submission.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackReceipt {
    pub sku: String,
    pub cost: f64,
}

impl fmt::Display for FeedbackReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Recorded shipping cost {} for SKU {}.",
            format_currency(self.cost),
            self.sku
        )
    }
}

/// Validate and append one actual shipping cost. The log is untouched on error.
pub fn record_feedback(log: &ObservationLog, sku: &str, cost: &str) -> Result<FeedbackReceipt, IngestError> {
    let sku = normalize_sku(sku);
    let cost = cost.trim();
    if sku.is_empty() || cost.is_empty() {
        return Err(IngestError::MissingField);
    }

    let value = parse_cost(cost).ok_or_else(|| IngestError::InvalidValue(cost.to_string()))?;
    log.append(&[(sku.clone(), value)])?;

    Ok(FeedbackReceipt { sku, cost: value })
}

/// A cost is any finite, non-negative number.
pub fn parse_cost(raw: &str) -> Option<f64> {
    parse_finite(raw).filter(|v| *v >= 0.0)
}

/// Outcome of a bulk upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadSummary {
    pub file_name: String,
    pub rows_read: usize,
    pub recorded: usize,
    pub skipped: usize,
    pub archived: Option<PathBuf>,
}

impl fmt::Display for UploadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Uploaded and recorded {}: {} of {} row(s) recorded, {} skipped.",
            self.file_name, self.recorded, self.rows_read, self.skipped
        )
    }
}

/// Append every valid `(SKU, cost)` row of an uploaded CSV.
///
/// Rows with a blank SKU or a missing/non-numeric/negative cost are skipped
/// individually. When `archive_dir` is set, a timestamped copy of the upload
/// is kept there.
pub fn ingest_upload(
    log: &ObservationLog,
    path: &Path,
    archive_dir: Option<&Path>,
) -> Result<UploadSummary, IngestError> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        == Some(true);
    if !is_csv {
        return Err(IngestError::NotCsv(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(DataError::NotFound(path.to_path_buf()).into());
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let archived = match archive_dir {
        Some(dir) => Some(archive_upload(path, dir, &file_name)?),
        None => None,
    };

    let mut reader = open_csv(path)?;
    let header_map = read_header_map(&mut reader, path)?;

    let mut missing = Vec::new();
    if !header_map.contains_key(&UPLOAD_SKU_COLUMN.to_lowercase()) {
        missing.push(format!("`{UPLOAD_SKU_COLUMN}`"));
    }
    if !UPLOAD_COST_COLUMNS.iter().any(|c| header_map.contains_key(*c)) {
        missing.push(format!("`{}` or `{}`", UPLOAD_COST_COLUMNS[0], UPLOAD_COST_COLUMNS[1]));
    }
    if !missing.is_empty() {
        return Err(DataError::Schema {
            path: path.to_path_buf(),
            missing,
        }
        .into());
    }

    let mut rows = Vec::new();
    let mut rows_read = 0usize;
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        rows_read += 1;

        let Ok(record) = result else {
            debug!("{}:{line}: unreadable row skipped", path.display());
            continue;
        };
        let sku = get_optional(&record, &header_map, UPLOAD_SKU_COLUMN).map(normalize_sku);
        let cost = UPLOAD_COST_COLUMNS
            .iter()
            .find_map(|col| get_optional(&record, &header_map, col));

        match (sku, cost.and_then(parse_cost)) {
            (Some(sku), Some(cost)) => rows.push((sku, cost)),
            _ => debug!("{}:{line}: row without SKU or valid cost skipped", path.display()),
        }
    }

    let recorded = log.append(&rows)?;
    let skipped = rows_read - recorded;
    if skipped > 0 {
        warn!("Skipped {skipped} of {rows_read} row(s) in {file_name}");
    }

    Ok(UploadSummary {
        file_name,
        rows_read,
        recorded,
        skipped,
        archived,
    })
}

fn archive_upload(path: &Path, dir: &Path, file_name: &str) -> Result<PathBuf, DataError> {
    fs::create_dir_all(dir).map_err(|source| DataError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let target = dir.join(format!("{ts}_{file_name}"));
    fs::copy(path, &target).map_err(|source| DataError::Io {
        path: target.clone(),
        source,
    })?;
    debug!("Archived upload to {}", target.display());
    Ok(target)
}

/// Number of data rows currently in the log (header excluded).
pub fn count_logged_rows(log: &ObservationLog) -> Result<usize, DataError> {
    if !log.path().exists() {
        return Ok(0);
    }
    let file = File::open(log.path()).map_err(|source| DataError::Io {
        path: log.path().to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);
    let mut rows = 0usize;
    for record in reader.records() {
        record.map_err(|source| DataError::Csv {
            path: log.path().to_path_buf(),
            source,
        })?;
        rows += 1;
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_in(dir: &Path) -> ObservationLog {
        ObservationLog::new(dir.join("feedback.csv"))
    }

    #[test]
    fn feedback_appends_with_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_in(dir.path());

        let receipt = record_feedback(&log, " abc123", "15.99").unwrap();
        assert_eq!(receipt.to_string(), "Recorded shipping cost $15.99 for SKU ABC123.");
        record_feedback(&log, "xyz", "5").unwrap();

        let text = fs::read_to_string(log.path()).unwrap();
        assert_eq!(text, "SKU,shipping_cost\nABC123,15.99\nXYZ,5.0\n");
        assert_eq!(count_logged_rows(&log).unwrap(), 2);
    }

    #[test]
    fn concurrent_appends_do_not_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_in(dir.path());

        std::thread::scope(|scope| {
            for t in 0..8 {
                let log = log.clone();
                scope.spawn(move || {
                    for i in 0..25 {
                        let rows = vec![(format!("T{t}A{i}"), 1.5), (format!("T{t}B{i}"), 2.25)];
                        assert_eq!(log.append(&rows).unwrap(), 2);
                    }
                });
            }
        });

        let text = fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 1 + 8 * 25 * 2);
        assert_eq!(lines.iter().filter(|l| **l == "SKU,shipping_cost").count(), 1);
        assert_eq!(lines[0], "SKU,shipping_cost");
        assert!(lines.iter().all(|l| l.split(',').count() == 2));
        // Each batch lands as one contiguous pair.
        for pair in lines[1..].chunks(2) {
            let a = pair[0].split(',').next().unwrap();
            let b = pair[1].split(',').next().unwrap();
            assert_eq!(a.replacen('A', "B", 1), b);
        }
    }

    #[test]
    fn invalid_cost_leaves_log_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_in(dir.path());
        record_feedback(&log, "A1", "2.50").unwrap();
        let before = fs::read_to_string(log.path()).unwrap();

        let err = record_feedback(&log, "A1", "abc").unwrap_err();
        assert!(matches!(err, IngestError::InvalidValue(ref v) if v == "abc"));
        assert!(matches!(record_feedback(&log, "A1", "-3"), Err(IngestError::InvalidValue(_))));
        assert!(matches!(record_feedback(&log, "  ", "3"), Err(IngestError::MissingField)));

        assert_eq!(fs::read_to_string(log.path()).unwrap(), before);
    }

    #[test]
    fn invalid_cost_on_fresh_log_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_in(dir.path());
        assert!(record_feedback(&log, "A1", "abc").is_err());
        assert!(!log.path().exists());
    }

    #[test]
    fn upload_skips_bad_rows_and_falls_back_to_shipping_cost() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_in(dir.path());
        let upload = dir.path().join("orders.csv");
        fs::write(
            &upload,
            "SKU,delivery_cost,shipping_cost\nabc,4.5,\nxyz,,6\n,3,\nbad,n/a,\nneg,-1,\n",
        )
        .unwrap();

        let archive = dir.path().join("uploads");
        let summary = ingest_upload(&log, &upload, Some(&archive)).unwrap();
        assert_eq!(summary.rows_read, 5);
        assert_eq!(summary.recorded, 2);
        assert_eq!(summary.skipped, 3);
        assert!(summary.archived.as_ref().unwrap().exists());

        let text = fs::read_to_string(log.path()).unwrap();
        assert_eq!(text, "SKU,shipping_cost\nABC,4.5\nXYZ,6.0\n");
    }

    #[test]
    fn upload_requires_csv_and_columns() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_in(dir.path());

        let txt = dir.path().join("orders.txt");
        fs::write(&txt, "SKU,delivery_cost\nA,1\n").unwrap();
        assert!(matches!(ingest_upload(&log, &txt, None), Err(IngestError::NotCsv(_))));

        let no_cost = dir.path().join("no_cost.csv");
        fs::write(&no_cost, "SKU,price\nA,1\n").unwrap();
        assert!(matches!(
            ingest_upload(&log, &no_cost, None),
            Err(IngestError::Data(DataError::Schema { .. }))
        ));
        assert!(!log.path().exists());
    }
}
