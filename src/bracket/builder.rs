//! Bracket table builder.
//!
//! Bins observations into the canonical brackets and averages cost per
//! bracket. The result does not depend on observation order: costs within a
//! bracket are summed in sorted order before taking the mean.

use log::{info, warn};

use crate::bracket::set::BracketSet;
use crate::bracket::table::BracketTable;
use crate::domain::{ShipmentObservation, round_cents};

/// Counts gathered while binning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinningSummary {
    pub observations: usize,
    pub binned: usize,
    /// Observations whose weight matched no bracket (negative, non-finite,
    /// or above the last upper bound). They are not averaged anywhere.
    pub dropped_out_of_range: usize,
    /// Observation count per bracket, same order as the table.
    pub per_bracket: Vec<usize>,
}

/// Build the bracket table from observations.
pub fn build_table(observations: &[ShipmentObservation], brackets: &BracketSet) -> BracketTable {
    build_table_with_summary(observations, brackets).0
}

/// Build the bracket table and report how observations were binned.
pub fn build_table_with_summary(
    observations: &[ShipmentObservation],
    brackets: &BracketSet,
) -> (BracketTable, BinningSummary) {
    let mut bins: Vec<Vec<f64>> = vec![Vec::new(); brackets.len()];
    let mut dropped = 0usize;

    for obs in observations {
        match brackets.index_of(obs.weight_lb) {
            Some(idx) => bins[idx].push(obs.cost),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        warn!(
            "Dropped {dropped} observation(s) outside the bracket range [0, {}] lb",
            brackets.max_weight()
        );
    }

    let mut table = BracketTable::empty(brackets);
    for (idx, costs) in bins.iter_mut().enumerate() {
        table.set_cost(idx, mean_cost(costs));
    }

    let summary = BinningSummary {
        observations: observations.len(),
        binned: observations.len() - dropped,
        dropped_out_of_range: dropped,
        per_bracket: bins.iter().map(Vec::len).collect(),
    };
    info!(
        "Binned {} of {} observation(s) into {} bracket(s)",
        summary.binned,
        summary.observations,
        brackets.len()
    );

    (table, summary)
}

/// Mean of `costs` rounded to cents; `None` for an empty bin.
fn mean_cost(costs: &mut [f64]) -> Option<f64> {
    if costs.is_empty() {
        return None;
    }
    costs.sort_by(f64::total_cmp);
    let sum: f64 = costs.iter().sum();
    Some(round_cents(sum / costs.len() as f64))
}
