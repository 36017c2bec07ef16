//! Item table (`SKU`, `Package Weight`) loading.

use std::path::Path;

use log::{info, warn};

use crate::domain::{ItemTable, normalize_sku};
use crate::error::DataError;
use crate::io::ingest::{ensure_columns, get_optional, open_csv, parse_finite, read_header_map};

pub const SKU_COLUMN: &str = "SKU";
pub const WEIGHT_COLUMN: &str = "Package Weight";

/// Load SKU → weight (lb). Rows without a SKU or a numeric weight are skipped.
pub fn load_item_table(path: &Path) -> Result<ItemTable, DataError> {
    if !path.is_file() {
        return Err(DataError::NotFound(path.to_path_buf()));
    }

    let mut reader = open_csv(path)?;
    let header_map = read_header_map(&mut reader, path)?;
    ensure_columns(path, &header_map, &[SKU_COLUMN, WEIGHT_COLUMN])?;

    let mut items = ItemTable::new();
    let mut skipped = 0usize;

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = result.map_err(|source| DataError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

        let sku = get_optional(&record, &header_map, SKU_COLUMN).map(normalize_sku);
        let weight = get_optional(&record, &header_map, WEIGHT_COLUMN).and_then(parse_finite);

        match (sku, weight) {
            (Some(sku), Some(weight)) => {
                items.insert(&sku, weight);
            }
            (sku, _) => {
                skipped += 1;
                warn!(
                    "{}:{line}: skipping item {} without a numeric `{WEIGHT_COLUMN}`",
                    path.display(),
                    sku.as_deref().unwrap_or("<blank SKU>")
                );
            }
        }
    }

    info!(
        "Loaded {} item(s) from {} ({skipped} skipped)",
        items.len(),
        path.display()
    );
    Ok(items)
}
