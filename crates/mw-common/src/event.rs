//! Reference and predicted mowing event records.
//!
//! Events are plain immutable values. `doy` is the day of year (1-366).
//! Fields are flat so the records serialize directly to CSV rows.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One ground-truth mowing occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct ReferenceEvent {
    pub unit_id: String,
    pub year: i32,
    pub region: String,
    pub doy: u16,
}

/// One submitted mowing detection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct PredictedEvent {
    pub group_id: String,
    pub method: String,
    pub data_source: String,
    pub region: String,
    pub unit_id: String,
    pub year: i32,
    pub doy: u16,
}

impl PredictedEvent {
    /// Identity of the submission this prediction belongs to.
    pub fn submission(&self) -> Submission {
        Submission {
            group_id: self.group_id.clone(),
            method: self.method.clone(),
            data_source: self.data_source.clone(),
        }
    }
}

/// A group's set of predictions for one method and data source.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Submission {
    pub group_id: String,
    pub method: String,
    pub data_source: String,
}

impl Submission {
    pub fn new(
        group_id: impl Into<String>,
        method: impl Into<String>,
        data_source: impl Into<String>,
    ) -> Self {
        Submission {
            group_id: group_id.into(),
            method: method.into(),
            data_source: data_source.into(),
        }
    }
}

impl std::fmt::Display for Submission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.group_id, self.method, self.data_source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_from_prediction() {
        let p = PredictedEvent {
            group_id: "A".to_string(),
            method: "s1-coherence".to_string(),
            data_source: "S1".to_string(),
            region: "north".to_string(),
            unit_id: "42".to_string(),
            year: 2021,
            doy: 140,
        };
        assert_eq!(p.submission(), Submission::new("A", "s1-coherence", "S1"));
        assert_eq!(p.submission().to_string(), "A/s1-coherence/S1");
    }

    #[test]
    fn test_submission_ordering_is_lexicographic() {
        let a = Submission::new("A", "m2", "x");
        let b = Submission::new("A", "m10", "x");
        let c = Submission::new("B", "a", "a");
        assert!(b < a);
        assert!(a < c);
    }
}
