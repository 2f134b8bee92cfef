//! Check results delivered by the health-check runner

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one check execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Free-form details reported by the check
    pub details: Option<String>,
    /// Failure reason; `None` means the check passed
    pub error: Option<String>,
    /// How long the execution took
    pub duration: Duration,
    /// When the execution finished
    pub timestamp: DateTime<Utc>,
    /// Failures in a row, including this one
    pub contiguous_failures: u64,
    /// Start of the current failure streak
    pub time_of_first_failure: Option<DateTime<Utc>>,
}

impl CheckResult {
    /// Create a passing result
    pub fn passing(duration: Duration) -> Self {
        Self {
            details: None,
            error: None,
            duration,
            timestamp: Utc::now(),
            contiguous_failures: 0,
            time_of_first_failure: None,
        }
    }

    /// Create a failing result
    pub fn failing(error: impl Into<String>, duration: Duration) -> Self {
        let now = Utc::now();
        Self {
            details: None,
            error: Some(error.into()),
            duration,
            timestamp: now,
            contiguous_failures: 1,
            time_of_first_failure: Some(now),
        }
    }

    /// Set details
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Continue the failure streak of `previous`.
    ///
    /// A passing result resets the streak; a failing one extends it and keeps
    /// the start time of the streak.
    pub fn following(mut self, previous: Option<&CheckResult>) -> Self {
        if self.is_healthy() {
            self.contiguous_failures = 0;
            self.time_of_first_failure = None;
            return self;
        }
        if let Some(prev) = previous.filter(|p| !p.is_healthy()) {
            self.contiguous_failures = prev.contiguous_failures + 1;
            self.time_of_first_failure = prev.time_of_first_failure.or(Some(prev.timestamp));
        }
        self
    }

    /// Check if the result is healthy
    pub fn is_healthy(&self) -> bool {
        self.error.is_none()
    }

    /// Duration in whole milliseconds, saturating at `i64::MAX`
    pub fn duration_millis(&self) -> i64 {
        i64::try_from(self.duration.as_millis()).unwrap_or(i64::MAX)
    }
}

/// True if every result is healthy; an empty map counts as healthy.
pub fn all_healthy(results: &HashMap<String, CheckResult>) -> bool {
    results.values().all(CheckResult::is_healthy)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passing_and_failing() {
        let ok = CheckResult::passing(Duration::from_millis(25));
        assert!(ok.is_healthy());
        assert_eq!(ok.duration_millis(), 25);
        assert_eq!(ok.contiguous_failures, 0);

        let bad = CheckResult::failing("connection refused", Duration::from_millis(3));
        assert!(!bad.is_healthy());
        assert_eq!(bad.contiguous_failures, 1);
        assert!(bad.time_of_first_failure.is_some());
    }

    #[test]
    fn test_failure_streak() {
        let first = CheckResult::failing("down", Duration::ZERO);
        let second = CheckResult::failing("still down", Duration::ZERO).following(Some(&first));
        assert_eq!(second.contiguous_failures, 2);
        assert_eq!(second.time_of_first_failure, first.time_of_first_failure);

        let recovered = CheckResult::passing(Duration::ZERO).following(Some(&second));
        assert_eq!(recovered.contiguous_failures, 0);
        assert!(recovered.time_of_first_failure.is_none());

        let fresh = CheckResult::failing("down", Duration::ZERO).following(Some(&recovered));
        assert_eq!(fresh.contiguous_failures, 1);
    }

    #[test]
    fn test_all_healthy() {
        let mut results = HashMap::new();
        assert!(all_healthy(&results));

        results.insert("a".to_string(), CheckResult::passing(Duration::ZERO));
        assert!(all_healthy(&results));

        results.insert("b".to_string(), CheckResult::failing("x", Duration::ZERO));
        assert!(!all_healthy(&results));
    }

    #[test]
    fn test_serialization() {
        let result = CheckResult::passing(Duration::from_millis(10)).with_details("ok");
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"details\":\"ok\""));

        let deserialized: CheckResult = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, result);
    }
}
