//! Canonical weight brackets.
//!
//! A `BracketSet` is defined only by its ordered upper bounds (lb). Lower
//! bounds and display labels are derived from them; labels are never parsed
//! back into numbers.
//!
//! Membership rule:
//! - first bracket: `0 <= w <= high`
//! - every later bracket: `low < w <= high`, with `low` = previous `high`

use crate::error::DataError;

/// Upper bounds used when none are configured.
pub const DEFAULT_UPPER_BOUNDS: [f64; 7] = [1.0, 2.0, 3.0, 6.0, 10.0, 15.0, 20.0];

#[derive(Debug, Clone, PartialEq)]
pub struct WeightBracket {
    pub low: f64,
    pub high: f64,
    pub label: String,
    /// Only the first bracket is closed on the low side.
    pub includes_low: bool,
}

impl WeightBracket {
    pub fn contains(&self, weight: f64) -> bool {
        let above_low = if self.includes_low {
            weight >= self.low
        } else {
            weight > self.low
        };
        above_low && weight <= self.high
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BracketSet {
    brackets: Vec<WeightBracket>,
}

impl BracketSet {
    /// Build the set from strictly increasing, positive upper bounds.
    pub fn from_upper_bounds(bounds: &[f64]) -> Result<Self, DataError> {
        if bounds.is_empty() {
            return Err(DataError::InvalidBrackets(
                "at least one upper bound is required".to_string(),
            ));
        }

        let mut low = 0.0_f64;
        for (idx, &high) in bounds.iter().enumerate() {
            if !(high.is_finite() && high > low) {
                return Err(DataError::InvalidBrackets(format!(
                    "bound #{} ({high}) must be finite and greater than {low}",
                    idx + 1
                )));
            }
            low = high;
        }

        Ok(Self::from_checked_bounds(bounds))
    }

    fn from_checked_bounds(bounds: &[f64]) -> Self {
        let mut brackets = Vec::with_capacity(bounds.len());
        let mut low = 0.0_f64;
        for (idx, &high) in bounds.iter().enumerate() {
            let first = idx == 0;
            brackets.push(WeightBracket {
                low,
                high,
                label: bracket_label(low, high, first),
                includes_low: first,
            });
            low = high;
        }
        Self { brackets }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WeightBracket> {
        self.brackets.iter()
    }

    pub fn len(&self) -> usize {
        self.brackets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.brackets.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&WeightBracket> {
        self.brackets.get(idx)
    }

    /// Index of the bracket containing `weight_lb`, scanning in ascending order.
    pub fn index_of(&self, weight_lb: f64) -> Option<usize> {
        self.brackets.iter().position(|b| b.contains(weight_lb))
    }

    pub fn position_of_label(&self, label: &str) -> Option<usize> {
        self.brackets.iter().position(|b| b.label == label)
    }

    pub fn upper_bounds(&self) -> Vec<f64> {
        self.brackets.iter().map(|b| b.high).collect()
    }

    pub fn max_weight(&self) -> f64 {
        self.brackets.last().map_or(0.0, |b| b.high)
    }
}

impl Default for BracketSet {
    fn default() -> Self {
        Self::from_checked_bounds(&DEFAULT_UPPER_BOUNDS)
    }
}

impl<'a> IntoIterator for &'a BracketSet {
    type Item = &'a WeightBracket;
    type IntoIter = std::slice::Iter<'a, WeightBracket>;

    fn into_iter(self) -> Self::IntoIter {
        self.brackets.iter()
    }
}

/// `≤ 1 lb` for the first bracket, `3–6 lb` (en dash) for the rest.
fn bracket_label(low: f64, high: f64, first: bool) -> String {
    if first {
        format!("≤ {high} lb")
    } else {
        format!("{low}–{high} lb")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_derive_from_bounds() {
        let set = BracketSet::from_upper_bounds(&[1.0, 3.0, 6.0, 10.0]).unwrap();
        let labels: Vec<&str> = set.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["≤ 1 lb", "1–3 lb", "3–6 lb", "6–10 lb"]);

        let fractional = BracketSet::from_upper_bounds(&[0.5, 2.5]).unwrap();
        assert_eq!(fractional.get(1).unwrap().label, "0.5–2.5 lb");
    }

    #[test]
    fn default_matches_default_bounds() {
        let set = BracketSet::default();
        assert_eq!(set, BracketSet::from_upper_bounds(&DEFAULT_UPPER_BOUNDS).unwrap());
        assert_eq!(set.max_weight(), 20.0);
    }

    #[test]
    fn rejects_bad_bounds() {
        assert!(BracketSet::from_upper_bounds(&[]).is_err());
        assert!(BracketSet::from_upper_bounds(&[0.0, 1.0]).is_err());
        assert!(BracketSet::from_upper_bounds(&[2.0, 1.0]).is_err());
        assert!(BracketSet::from_upper_bounds(&[1.0, 1.0]).is_err());
        assert!(BracketSet::from_upper_bounds(&[1.0, f64::NAN]).is_err());
        assert!(BracketSet::from_upper_bounds(&[1.0, f64::INFINITY]).is_err());
    }

    #[test]
    fn brackets_are_contiguous() {
        let set = BracketSet::default();
        for pair in set.iter().collect::<Vec<_>>().windows(2) {
            assert_eq!(pair[0].high, pair[1].low);
        }
        assert_eq!(set.get(0).unwrap().low, 0.0);
    }

    #[test]
    fn membership_is_low_open_high_closed() {
        let set = BracketSet::from_upper_bounds(&[1.0, 3.0, 6.0]).unwrap();
        assert_eq!(set.index_of(0.0), Some(0));
        assert_eq!(set.index_of(0.5), Some(0));
        assert_eq!(set.index_of(1.0), Some(0));
        assert_eq!(set.index_of(1.000_1), Some(1));
        assert_eq!(set.index_of(3.0), Some(1));
        assert_eq!(set.index_of(6.0), Some(2));
        assert_eq!(set.index_of(6.01), None);
        assert_eq!(set.index_of(-0.1), None);
        assert_eq!(set.index_of(f64::NAN), None);
    }

    #[test]
    fn every_weight_in_range_matches_exactly_one_bracket() {
        let set = BracketSet::default();
        let mut w = 0.0;
        while w <= set.max_weight() {
            let hits: Vec<&WeightBracket> = set.iter().filter(|b| b.contains(w)).collect();
            assert_eq!(hits.len(), 1, "weight {w} matched {} brackets", hits.len());
            let b = hits[0];
            assert!(w == 0.0 || (b.low < w && w <= b.high), "weight {w} in {}", b.label);
            w += 0.125;
        }
    }
}
