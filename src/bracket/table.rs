//! Bracket → average cost table.
//!
//! A `BracketTable` always has exactly one entry per canonical bracket, in
//! ascending weight order. A bracket without observations keeps its label
//! and has `cost: None` ("no data"), never zero.

use crate::bracket::set::{BracketSet, WeightBracket};
use crate::domain::format_currency;

#[derive(Debug, Clone, PartialEq)]
pub struct BracketCostEntry {
    pub bracket: WeightBracket,
    pub cost: Option<f64>,
}

impl BracketCostEntry {
    /// `$X.XX`, or an empty string for "no data".
    pub fn cost_display(&self) -> String {
        self.cost.map(format_currency).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BracketTable {
    entries: Vec<BracketCostEntry>,
}

impl BracketTable {
    /// Every bracket present, no costs yet.
    pub fn empty(brackets: &BracketSet) -> Self {
        let entries = brackets
            .iter()
            .map(|bracket| BracketCostEntry {
                bracket: bracket.clone(),
                cost: None,
            })
            .collect();
        Self { entries }
    }

    /// Pair brackets with costs by position. Missing trailing costs are "no data".
    pub fn with_costs(brackets: &BracketSet, costs: &[Option<f64>]) -> Self {
        let mut table = Self::empty(brackets);
        for (entry, cost) in table.entries.iter_mut().zip(costs) {
            entry.cost = *cost;
        }
        table
    }

    pub fn entries(&self) -> &[BracketCostEntry] {
        &self.entries
    }

    pub fn set_cost(&mut self, idx: usize, cost: Option<f64>) {
        if let Some(entry) = self.entries.get_mut(idx) {
            entry.cost = cost;
        }
    }

    /// First entry (ascending) whose bracket contains `weight_lb`.
    pub fn lookup(&self, weight_lb: f64) -> Option<&BracketCostEntry> {
        self.entries.iter().find(|e| e.bracket.contains(weight_lb))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_table_keeps_every_label() {
        let set = BracketSet::from_upper_bounds(&[1.0, 3.0]).unwrap();
        let table = BracketTable::empty(&set);
        assert_eq!(table.len(), 2);
        assert!(table.entries().iter().all(|e| e.cost.is_none()));
        assert_eq!(table.entries()[1].bracket.label, "1–3 lb");
        assert_eq!(table.entries()[1].cost_display(), "");
    }

    #[test]
    fn lookup_uses_bracket_membership() {
        let set = BracketSet::from_upper_bounds(&[1.0, 3.0]).unwrap();
        let table = BracketTable::with_costs(&set, &[Some(5.0), Some(7.5)]);

        assert_eq!(table.lookup(0.0).and_then(|e| e.cost), Some(5.0));
        assert_eq!(table.lookup(1.0).and_then(|e| e.cost), Some(5.0));
        assert_eq!(table.lookup(2.0).map(|e| e.cost_display()), Some("$7.50".to_string()));
        assert!(table.lookup(3.5).is_none());
    }
}
