//! SKU cost resolver.
//!
//! Owns the two read-only tables it needs (SKU weights and bracket costs).
//! It is built once at startup and shared by the `lookup`, `export` and
//! interactive front-ends.

use std::collections::BTreeMap;

use log::debug;

use crate::bracket::table::BracketTable;
use crate::domain::{CostEstimate, ItemTable, normalize_sku};
use crate::error::LookupError;

#[derive(Debug, Clone)]
pub struct Resolver {
    items: ItemTable,
    table: BracketTable,
}

impl Resolver {
    pub fn new(items: ItemTable, table: BracketTable) -> Self {
        Self { items, table }
    }

    pub fn items(&self) -> &ItemTable {
        &self.items
    }

    pub fn table(&self) -> &BracketTable {
        &self.table
    }

    /// Estimate the shipping cost for one SKU.
    pub fn resolve(&self, sku: &str) -> Result<CostEstimate, LookupError> {
        let sku = normalize_sku(sku);

        let weight = self
            .items
            .weight(&sku)
            .ok_or_else(|| LookupError::UnknownSku { sku: sku.clone() })?;

        let entry = self
            .table
            .lookup(weight)
            .ok_or_else(|| LookupError::OutOfRange {
                sku: sku.clone(),
                weight,
            })?;

        let cost = entry.cost.ok_or_else(|| LookupError::NoData {
            sku: sku.clone(),
            weight,
            label: entry.bracket.label.clone(),
        })?;

        debug!("{sku}: {weight} lb -> {} -> {cost}", entry.bracket.label);

        Ok(CostEstimate {
            sku,
            weight,
            bracket: entry.bracket.label.clone(),
            cost,
        })
    }

    /// Resolve many SKUs; failures map to `None` instead of aborting.
    pub fn resolve_many<I, S>(&self, skus: I) -> BTreeMap<String, Option<f64>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        skus.into_iter()
            .map(|sku| {
                let key = normalize_sku(sku.as_ref());
                let cost = self.resolve(&key).ok().map(|e| e.cost);
                (key, cost)
            })
            .collect()
    }

    /// Cost for every SKU in the item table (the JSON lookup export).
    pub fn catalog_costs(&self) -> BTreeMap<String, Option<f64>> {
        self.resolve_many(self.items.skus())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::set::BracketSet;

    fn resolver() -> Resolver {
        let set = BracketSet::from_upper_bounds(&[1.0, 3.0, 6.0, 10.0, 20.0]).unwrap();
        let table = BracketTable::with_costs(&set, &[Some(5.0), Some(7.25), None, Some(12.0), Some(18.5)]);
        let items: ItemTable = [
            ("ABC123", 0.5),
            ("ZERO", 0.0),
            ("EDGE", 3.0),
            ("MID", 4.0),
            ("BIG", 50.0),
            ("NEG", -1.0),
        ]
        .into_iter()
        .collect();
        Resolver::new(items, table)
    }

    #[test]
    fn lookup_is_case_and_whitespace_insensitive() {
        let estimate = resolver().resolve("abc123 ").unwrap();
        assert_eq!(estimate.sku, "ABC123");
        assert_eq!(estimate.bracket, "≤ 1 lb");
        assert_eq!(estimate.cost_display(), "$5.00");
    }

    #[test]
    fn zero_weight_maps_to_first_bracket() {
        assert_eq!(resolver().resolve("zero").unwrap().cost, 5.0);
    }

    #[test]
    fn upper_bound_is_inclusive() {
        let estimate = resolver().resolve("EDGE").unwrap();
        assert_eq!(estimate.bracket, "1–3 lb");
        assert_eq!(estimate.cost_display(), "$7.25");
    }

    #[test]
    fn unknown_sku_names_the_sku() {
        let err = resolver().resolve("XYZ").unwrap_err();
        assert_eq!(err, LookupError::UnknownSku { sku: "XYZ".to_string() });
        assert!(err.to_string().contains("XYZ"));
    }

    #[test]
    fn out_of_range_names_weight_and_sku() {
        let err = resolver().resolve("big").unwrap_err();
        assert!(matches!(err, LookupError::OutOfRange { weight, .. } if weight == 50.0));
        let msg = err.to_string();
        assert!(msg.contains("50") && msg.contains("BIG"), "{msg}");

        assert!(matches!(resolver().resolve("NEG"), Err(LookupError::OutOfRange { .. })));
    }

    #[test]
    fn empty_bracket_is_no_data() {
        let err = resolver().resolve("MID").unwrap_err();
        match err {
            LookupError::NoData { label, weight, .. } => {
                assert_eq!(label, "3–6 lb");
                assert_eq!(weight, 4.0);
            }
            other => panic!("expected NoData, got {other:?}"),
        }
    }

    #[test]
    fn resolve_many_maps_failures_to_none() {
        let costs = resolver().resolve_many(["abc123", "xyz", "big", " edge "]);
        assert_eq!(costs.len(), 4);
        assert_eq!(costs["ABC123"], Some(5.0));
        assert_eq!(costs["XYZ"], None);
        assert_eq!(costs["BIG"], None);
        assert_eq!(costs["EDGE"], Some(7.25));
    }

    #[test]
    fn catalog_covers_every_item() {
        let costs = resolver().catalog_costs();
        assert_eq!(costs.len(), 6);
        assert_eq!(costs["MID"], None);
        assert_eq!(costs["ZERO"], Some(5.0));
    }
}
