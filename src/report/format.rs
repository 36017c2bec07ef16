//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the bracket/ingest code stays free of presentation concerns
//! - output changes are localized

use crate::app::pipeline::BuildRun;
use crate::bracket::BracketTable;
use crate::domain::{BuildConfig, CostEstimate, WeightUnit};
use crate::error::LookupError;
use crate::io::ingest::RowError;

/// How many skipped rows to list before summarizing the rest.
const MAX_ROW_ERRORS_SHOWN: usize = 10;

/// Format the builder run summary (inputs, counts, resulting table).
pub fn format_build_summary(run: &BuildRun, config: &BuildConfig) -> String {
    let mut out = String::new();

    out.push_str("=== shipcost - shipping schedule build ===\n");
    out.push_str(&format!(
        "Columns: weight=`{}` ({}) | cost=`{}`\n",
        config.weight_col,
        unit_label(config.unit),
        config.cost_col
    ));
    out.push_str(&format!("Files: {}\n", run.ingest.files.len()));
    for path in &run.ingest.files {
        out.push_str(&format!("  - {}\n", path.display()));
    }
    out.push_str(&format!(
        "Rows: read={} | used={} | skipped={} | outside brackets={}\n",
        run.ingest.rows_read,
        run.summary.binned,
        run.ingest.row_errors.len(),
        run.summary.dropped_out_of_range
    ));

    if !run.ingest.row_errors.is_empty() {
        out.push_str(&format_row_errors(&run.ingest.row_errors));
    }

    out.push('\n');
    out.push_str(&format_table(&run.table, Some(&run.summary.per_bracket)));
    out
}

/// Aligned two/three-column view of a bracket table.
pub fn format_table(table: &BracketTable, counts: Option<&[usize]>) -> String {
    let label_width = table
        .entries()
        .iter()
        .map(|e| e.bracket.label.chars().count())
        .max()
        .unwrap_or(0)
        .max("Bracket".len());

    let mut out = String::new();
    match counts {
        Some(_) => out.push_str(&format!("{:<label_width$}  {:>10}  {:>6}\n", "Bracket", "Avg cost", "n")),
        None => out.push_str(&format!("{:<label_width$}  {:>10}\n", "Bracket", "Avg cost")),
    }

    for (idx, entry) in table.entries().iter().enumerate() {
        let cost = entry.cost.map(|_| entry.cost_display()).unwrap_or_else(|| "-".to_string());
        // `{:<width$}` pads by chars, so multi-byte labels (≤, –) still align.
        match counts.and_then(|c| c.get(idx)) {
            Some(n) => out.push_str(&format!("{:<label_width$}  {:>10}  {:>6}\n", entry.bracket.label, cost, n)),
            None => out.push_str(&format!("{:<label_width$}  {:>10}\n", entry.bracket.label, cost)),
        }
    }
    out
}

/// One line per lookup, success or failure.
pub fn format_lookup(result: &Result<CostEstimate, LookupError>) -> String {
    match result {
        Ok(estimate) => estimate.to_string(),
        Err(err) => err.to_string(),
    }
}

fn format_row_errors(errors: &[RowError]) -> String {
    let mut out = String::from("Skipped rows:\n");
    for err in errors.iter().take(MAX_ROW_ERRORS_SHOWN) {
        out.push_str(&format!("  {}:{}: {}\n", err.path.display(), err.line, err.message));
    }
    if errors.len() > MAX_ROW_ERRORS_SHOWN {
        out.push_str(&format!("  ... and {} more\n", errors.len() - MAX_ROW_ERRORS_SHOWN));
    }
    out
}

fn unit_label(unit: WeightUnit) -> &'static str {
    match unit {
        WeightUnit::Oz => "oz",
        WeightUnit::Lb => "lb",
    }
}
