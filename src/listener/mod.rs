//! Health Result Adapter
//!
//! Turns check lifecycle callbacks into gauge records:
//!
//! | Event                 | Gauge    | Tags                                           | Value  |
//! |-----------------------|----------|------------------------------------------------|--------|
//! | check registered/done | status   | `check`, `check_passing` (, `classification`)  | 1 / 0  |
//! | check registered/done | duration | `check`, `check_passing` (, `classification`)  | millis |
//! | results updated       | status   | `check=all_checks`, `check_passing` (, ...)    | 1 / 0  |
//!
//! The classification tag is omitted entirely when none is configured.

mod config;

pub use config::{
    Classification, ListenerConfig, DURATION_METRIC_NAME, STATUS_METRIC_NAME,
};

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::attributes::KeyValue;
use crate::domain::{all_healthy, CheckListener, CheckResult, HealthListener};
use crate::error::Result;
use crate::gauge::Int64Gauge;
use crate::registry::MeterRegistry;

/// `check` tag value used for the aggregate status
pub const VAL_ALL_CHECKS: &str = "all_checks";

/// Tag key naming the check
pub const KEY_CHECK: &str = "check";

/// Tag key carrying whether the check passed
pub const KEY_CHECK_PASSING: &str = "check_passing";

/// Tag key carrying the configured classification
pub const KEY_CLASSIFICATION: &str = "classification";

/// Records check results on a status gauge and a duration gauge
#[derive(Debug, Clone)]
pub struct MetricsListener {
    classification: Option<Classification>,
    status: Int64Gauge,
    duration: Int64Gauge,
}

impl MetricsListener {
    /// Register both gauges on `registry`.
    ///
    /// Fails if the configuration is invalid or either gauge name is invalid
    /// or already taken.
    pub fn new(registry: &MeterRegistry, config: ListenerConfig) -> Result<Self> {
        config.validate()?;

        let status = registry.int64_gauge(
            &config.status_metric,
            "Health check status (1 = passing, 0 = failing)",
        )?;
        let duration = registry.int64_gauge(
            &config.duration_metric,
            "Health check execution time in milliseconds",
        )?;

        Ok(Self {
            classification: config.classification,
            status,
            duration,
        })
    }

    /// Create with the default configuration
    pub fn with_defaults(registry: &MeterRegistry) -> Result<Self> {
        Self::new(registry, ListenerConfig::default())
    }

    /// Configured classification
    pub fn classification(&self) -> Option<&Classification> {
        self.classification.as_ref()
    }

    /// Status gauge
    pub fn status_gauge(&self) -> &Int64Gauge {
        &self.status
    }

    /// Duration gauge
    pub fn duration_gauge(&self) -> &Int64Gauge {
        &self.duration
    }

    fn record_check(&self, name: &str, result: &CheckResult) {
        let passing = result.is_healthy();
        let tags = self.tags(name, passing);

        if let Err(e) = self.status.record(i64::from(passing), &tags) {
            warn!(check = name, error = %e, "Failed to record check status");
        }
        if let Err(e) = self.duration.record(result.duration_millis(), &tags) {
            warn!(check = name, error = %e, "Failed to record check duration");
        }

        debug!(
            check = name,
            passing,
            duration_ms = result.duration_millis(),
            "Recorded check result"
        );
    }

    fn tags(&self, check: &str, passing: bool) -> Vec<KeyValue> {
        let mut tags = vec![
            KeyValue::string(KEY_CHECK, check),
            KeyValue::bool(KEY_CHECK_PASSING, passing),
        ];
        if let Some(classification) = &self.classification {
            tags.push(KeyValue::string(KEY_CLASSIFICATION, classification.as_str()));
        }
        tags
    }
}

impl CheckListener for MetricsListener {
    fn on_check_registered(&self, name: &str, result: &CheckResult) {
        self.record_check(name, result);
    }

    fn on_check_started(&self, _name: &str) {}

    fn on_check_completed(&self, name: &str, result: &CheckResult) {
        self.record_check(name, result);
    }
}

impl HealthListener for MetricsListener {
    fn on_results_updated(&self, results: &HashMap<String, CheckResult>) {
        let passing = all_healthy(results);
        let tags = self.tags(VAL_ALL_CHECKS, passing);

        if let Err(e) = self.status.record(i64::from(passing), &tags) {
            warn!(error = %e, "Failed to record aggregate status");
        }
        debug!(checks = results.len(), passing, "Recorded aggregate status");
    }
}

// =============================================================================
// Tests
// =============================================================================
