//! Match result returned to callers.

use serde::{Deserialize, Serialize};

/// Best-matching region for a set of points.
///
/// `score` is `inside / total_points`; `total_points` is never zero, so an
/// empty input still yields a well-defined zero score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    /// IAU code of the region, `None` when nothing matched
    pub iau: Option<String>,
    pub score: f64,
    pub inside: usize,
    pub total_points: usize,
}

impl MatchResult {
    /// The "no match" result for `num_points` input points
    pub fn empty(num_points: usize) -> Self {
        Self {
            iau: None,
            score: 0.0,
            inside: 0,
            total_points: num_points.max(1),
        }
    }

    pub fn is_match(&self) -> bool {
        self.inside > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_guards_zero_points() {
        let result = MatchResult::empty(0);
        assert_eq!(result.total_points, 1);
        assert_eq!(result.score, 0.0);
        assert!(!result.is_match());
    }

    #[test]
    fn test_serializes_camel_case() {
        let result = MatchResult {
            iau: Some("ORI".to_string()),
            score: 0.5,
            inside: 1,
            total_points: 2,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["totalPoints"], 2);
        assert_eq!(json["iau"], "ORI");

        let none = serde_json::to_value(MatchResult::empty(3)).unwrap();
        assert!(none["iau"].is_null());
    }
}
