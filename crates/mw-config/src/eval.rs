//! Evaluation parameters.
//!
//! All matching and cleaning thresholds are runtime parameters; nothing in
//! the pipeline reads the defaults directly.

use serde::{Deserialize, Serialize};

use crate::{DEFAULT_EVENT_MIN_DIFFERENCE, DEFAULT_RANGE_END, DEFAULT_RANGE_START, DEFAULT_TOLERANCE};

/// Inclusive day-of-year interval of the valid mowing season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoyRange {
    pub start: u16,
    pub end: u16,
}

impl DoyRange {
    pub fn new(start: u16, end: u16) -> Self {
        DoyRange { start, end }
    }

    pub fn contains(&self, doy: u16) -> bool {
        self.start <= doy && doy <= self.end
    }
}

impl Default for DoyRange {
    fn default() -> Self {
        DoyRange::new(DEFAULT_RANGE_START, DEFAULT_RANGE_END)
    }
}

impl std::str::FromStr for DoyRange {
    type Err = String;

    /// Accepts `start,end`, `start..end` or `start-end`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parts: Vec<&str> = if s.contains("..") {
            s.splitn(2, "..").collect()
        } else if s.contains(',') {
            s.splitn(2, ',').collect()
        } else {
            s.splitn(2, '-').collect()
        };
        if parts.len() != 2 {
            return Err(format!("expected 'start,end', got '{}'", s));
        }
        let start = parts[0]
            .trim()
            .parse::<u16>()
            .map_err(|e| format!("invalid range start '{}': {}", parts[0].trim(), e))?;
        let end = parts[1]
            .trim()
            .trim_start_matches('=')
            .parse::<u16>()
            .map_err(|e| format!("invalid range end '{}': {}", parts[1].trim(), e))?;
        Ok(DoyRange { start, end })
    }
}

impl std::fmt::Display for DoyRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Which matched pairs feed the date regression metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricScope {
    /// Only pairs within tolerance.
    #[default]
    TruePositives,
    /// Every nearest-match pair regardless of distance.
    AllMatched,
}

impl std::str::FromStr for MetricScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "true_positives" | "tp" => Ok(MetricScope::TruePositives),
            "all_matched" | "all" => Ok(MetricScope::AllMatched),
            _ => Err(format!("unknown metric scope: {}", s)),
        }
    }
}

impl std::fmt::Display for MetricScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricScope::TruePositives => write!(f, "true_positives"),
            MetricScope::AllMatched => write!(f, "all_matched"),
        }
    }
}

/// Parameters of one evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvalConfig {
    /// Maximum day difference for a true positive.
    pub tolerance: u32,
    /// Valid mowing season; events outside are discarded.
    pub valid_range: DoyRange,
    /// Minimum spacing between reference events of one unit/year.
    pub event_min_difference: u32,
    /// Pair selection for date regression metrics.
    pub metric_scope: MetricScope,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            tolerance: DEFAULT_TOLERANCE,
            valid_range: DoyRange::default(),
            event_min_difference: DEFAULT_EVENT_MIN_DIFFERENCE,
            metric_scope: MetricScope::default(),
        }
    }
}

impl EvalConfig {
    /// Set tolerance.
    pub fn with_tolerance(mut self, tolerance: u32) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set valid mowing range.
    pub fn with_valid_range(mut self, range: DoyRange) -> Self {
        self.valid_range = range;
        self
    }

    /// Set minimum event spacing.
    pub fn with_event_min_difference(mut self, days: u32) -> Self {
        self.event_min_difference = days;
        self
    }

    /// Set regression metric scope.
    pub fn with_metric_scope(mut self, scope: MetricScope) -> Self {
        self.metric_scope = scope;
        self
    }
}
