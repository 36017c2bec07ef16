//! Export the SKU → cost lookup table as JSON.
//!
//! The export is meant for static consumers (a storefront, a spreadsheet
//! import): one key per uppercased SKU, value is the cost or `null` when the
//! SKU could not be priced. Keys are sorted so the file diffs cleanly.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::info;

use crate::error::DataError;

/// Write the lookup table to `path` (pretty-printed JSON object).
pub fn write_lookup_json(path: &Path, costs: &BTreeMap<String, Option<f64>>) -> Result<(), DataError> {
    let io_err = |source: std::io::Error| DataError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, costs).map_err(|e| io_err(e.into()))?;
    writeln!(writer).map_err(io_err)?;
    writer.flush().map_err(io_err)?;

    info!("Wrote {} SKU cost(s) to {}", costs.len(), path.display());
    Ok(())
}
