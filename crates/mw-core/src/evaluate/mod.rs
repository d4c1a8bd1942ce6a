//! Metric aggregation over (submission, region, year) cells.
//!
//! Each metric family first accumulates per concrete cell, then derives the
//! `All` roll-ups by recombining the raw accumulators through [`Combine`].
//! Ratios and summary statistics are only computed after combination.

pub mod accuracy;
pub mod count_deviation;
pub mod join;
pub mod regression;

pub use accuracy::{aggregate_accuracy, AccuracyRecord};
pub use count_deviation::{count_deviation, unit_counts, CountDeviationRecord, UnitCount};
pub use join::{full_outer_join, left_join};
pub use regression::{regression_metrics, RegressionMetricRecord};

use mw_common::{Scope, Submission};
use std::collections::BTreeMap;

/// One output cell: a submission at a region and year, either possibly `All`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellKey {
    pub submission: Submission,
    pub region: Scope<String>,
    pub year: Scope<i32>,
}

impl CellKey {
    pub fn new(submission: Submission, region: impl Into<String>, year: i32) -> Self {
        CellKey {
            submission,
            region: Scope::Each(region.into()),
            year: Scope::Each(year),
        }
    }

    /// Neither dimension is rolled up.
    pub fn is_concrete(&self) -> bool {
        !self.region.is_all() && !self.year.is_all()
    }

    /// Label used in warnings, e.g. `A/m/s north 2021`.
    pub fn label(&self) -> String {
        format!("{} {} {}", self.submission, self.region, self.year)
    }
}

/// Dimensions collapsed by a roll-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollUp {
    /// region = All, per year.
    Region,
    /// year = All, per region.
    Year,
    /// region = All and year = All.
    Both,
}

impl RollUp {
    pub const LEVELS: [RollUp; 3] = [RollUp::Region, RollUp::Year, RollUp::Both];

    /// Key of the roll-up cell a concrete cell contributes to.
    pub fn collapse(self, key: &CellKey) -> CellKey {
        let mut rolled = key.clone();
        if matches!(self, RollUp::Region | RollUp::Both) {
            rolled.region = Scope::All;
        }
        if matches!(self, RollUp::Year | RollUp::Both) {
            rolled.year = Scope::All;
        }
        rolled
    }
}

/// Accumulators that merge across cells.
pub trait Combine: Default {
    fn combine(&mut self, other: &Self);
}

/// Collapse the concrete cells of `cells` along `level`.
pub fn roll_up<V: Combine>(cells: &BTreeMap<CellKey, V>, level: RollUp) -> BTreeMap<CellKey, V> {
    let mut rolled: BTreeMap<CellKey, V> = BTreeMap::new();
    for (key, value) in cells.iter().filter(|(k, _)| k.is_concrete()) {
        rolled.entry(level.collapse(key)).or_default().combine(value);
    }
    rolled
}

/// Concrete cells plus every roll-up level, in key order.
pub fn with_roll_ups<V: Combine>(cells: BTreeMap<CellKey, V>) -> BTreeMap<CellKey, V> {
    let levels: Vec<BTreeMap<CellKey, V>> = RollUp::LEVELS
        .iter()
        .map(|&level| roll_up(&cells, level))
        .collect();
    let mut all = cells;
    for level in levels {
        all.extend(level);
    }
    all
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Count(u64);

    impl Combine for Count {
        fn combine(&mut self, other: &Self) {
            self.0 += other.0;
        }
    }

    fn sub() -> Submission {
        Submission::new("A", "m", "s")
    }

    #[test]
    fn test_collapse_levels() {
        let key = CellKey::new(sub(), "north", 2021);
        let r = RollUp::Region.collapse(&key);
        assert_eq!(r.region, Scope::All);
        assert_eq!(r.year, Scope::Each(2021));
        let y = RollUp::Year.collapse(&key);
        assert_eq!(y.region, Scope::Each("north".to_string()));
        assert_eq!(y.year, Scope::All);
        let b = RollUp::Both.collapse(&key);
        assert!(b.region.is_all() && b.year.is_all());
    }

    #[test]
    fn test_with_roll_ups_sums_counts() {
        let mut cells = BTreeMap::new();
        cells.insert(CellKey::new(sub(), "north", 2021), Count(1));
        cells.insert(CellKey::new(sub(), "south", 2021), Count(2));
        cells.insert(CellKey::new(sub(), "north", 2022), Count(4));

        let all = with_roll_ups(cells);
        let key = |region: Scope<String>, year: Scope<i32>| CellKey {
            submission: sub(),
            region,
            year,
        };
        assert_eq!(all[&key(Scope::All, Scope::Each(2021))], Count(3));
        assert_eq!(all[&key(Scope::All, Scope::Each(2022))], Count(4));
        assert_eq!(all[&key(Scope::Each("north".to_string()), Scope::All)], Count(5));
        assert_eq!(all[&key(Scope::Each("south".to_string()), Scope::All)], Count(2));
        assert_eq!(all[&key(Scope::All, Scope::All)], Count(7));
        // 3 concrete + 2 per-year + 2 per-region + 1 total
        assert_eq!(all.len(), 8);
    }

    #[test]
    fn test_roll_ups_are_per_submission() {
        let other = Submission::new("B", "m", "s");
        let mut cells = BTreeMap::new();
        cells.insert(CellKey::new(sub(), "north", 2021), Count(1));
        cells.insert(CellKey::new(other.clone(), "north", 2021), Count(10));
        let totals = roll_up(&cells, RollUp::Both);
        assert_eq!(totals.len(), 2);
        let key = RollUp::Both.collapse(&CellKey::new(other, "x", 0));
        assert_eq!(totals[&key], Count(10));
    }

    #[test]
    fn test_roll_up_ignores_existing_roll_up_rows() {
        let mut cells = BTreeMap::new();
        cells.insert(CellKey::new(sub(), "north", 2021), Count(1));
        let once = with_roll_ups(cells);
        let twice = with_roll_ups(once);
        let key = RollUp::Both.collapse(&CellKey::new(sub(), "north", 2021));
        assert_eq!(twice[&key], Count(1));
    }

    #[test]
    fn test_roll_up_rows_sort_after_concrete() {
        let mut cells = BTreeMap::new();
        cells.insert(CellKey::new(sub(), "north", 2021), Count(1));
        cells.insert(CellKey::new(sub(), "south", 2021), Count(1));
        let keys: Vec<String> = with_roll_ups(cells).keys().map(|k| k.label()).collect();
        assert_eq!(
            keys,
            vec![
                "A/m/s north 2021",
                "A/m/s north All",
                "A/m/s south 2021",
                "A/m/s south All",
                "A/m/s All 2021",
                "A/m/s All All",
            ]
        );
    }
}
