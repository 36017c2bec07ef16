//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - input conventions (`WeightUnit`, `ShipmentObservation`)
//! - the SKU weight table (`ItemTable`) and lookup results (`CostEstimate`)
//! - resolved run configuration (`BuildConfig`, `AppConfig`)

pub mod types;

pub use types::*;
