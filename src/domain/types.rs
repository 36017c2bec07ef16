//! Shared domain types.
//!
//! These are the values that flow between ingest, the bracket builder, the
//! resolver and the front-ends. Configuration values are built once in
//! `app.rs` and passed down by reference; nothing here is global.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;

use crate::bracket::BracketSet;

const OUNCES_PER_POUND: f64 = 16.0;

/// Unit of the weight column in observation files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WeightUnit {
    Oz,
    Lb,
}

impl WeightUnit {
    pub fn to_pounds(self, value: f64) -> f64 {
        match self {
            WeightUnit::Oz => value / OUNCES_PER_POUND,
            WeightUnit::Lb => value,
        }
    }
}

/// One historical shipment, already normalized to pounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShipmentObservation {
    pub weight_lb: f64,
    pub cost: f64,
}

/// Canonical form of a SKU key: trimmed and uppercased.
pub fn normalize_sku(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// SKU → package weight (lb).
///
/// Keys are always stored normalized, so lookups are case- and
/// whitespace-insensitive.
#[derive(Debug, Clone, Default)]
pub struct ItemTable {
    weights: HashMap<String, f64>,
}

impl ItemTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) a SKU. Returns the previous weight, if any.
    pub fn insert(&mut self, sku: &str, weight_lb: f64) -> Option<f64> {
        self.weights.insert(normalize_sku(sku), weight_lb)
    }

    pub fn weight(&self, sku: &str) -> Option<f64> {
        self.weights.get(&normalize_sku(sku)).copied()
    }

    pub fn skus(&self) -> impl Iterator<Item = &str> {
        self.weights.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<(S, f64)> for ItemTable {
    fn from_iter<T: IntoIterator<Item = (S, f64)>>(iter: T) -> Self {
        let mut table = ItemTable::new();
        for (sku, weight) in iter {
            table.insert(sku.as_ref(), weight);
        }
        table
    }
}

/// Successful SKU lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct CostEstimate {
    pub sku: String,
    pub weight: f64,
    pub bracket: String,
    pub cost: f64,
}

impl CostEstimate {
    pub fn cost_display(&self) -> String {
        format_currency(self.cost)
    }
}

impl fmt::Display for CostEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Estimated shipping cost for SKU '{}' (weight {} lb): {}",
            self.sku,
            self.weight,
            self.cost_display()
        )
    }
}

/// `$X.XX`
pub fn format_currency(value: f64) -> String {
    format!("${value:.2}")
}

/// Round to whole cents, ties to even (`4.125` -> `4.12`, `4.135` -> `4.14`).
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Resolved settings for one builder run.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// File paths or glob patterns.
    pub inputs: Vec<String>,
    pub output: PathBuf,
    pub weight_col: String,
    pub cost_col: String,
    pub unit: WeightUnit,
    pub brackets: BracketSet,
}

/// Resolved settings for the lookup/ingest side.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub items_path: PathBuf,
    pub schedule_path: PathBuf,
    pub log_path: PathBuf,
    pub brackets: BracketSet,
}
