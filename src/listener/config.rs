//! Listener configuration

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default status gauge name
pub const STATUS_METRIC_NAME: &str = "health/status";

/// Default duration gauge name
pub const DURATION_METRIC_NAME: &str = "health/execute_time";

/// Check category attached as the `classification` tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Classification {
    Liveness,
    Readiness,
    Startup,
    Custom(String),
}

impl Classification {
    /// Tag value for this classification
    pub fn as_str(&self) -> &str {
        match self {
            Classification::Liveness => "liveness",
            Classification::Readiness => "readiness",
            Classification::Startup => "startup",
            Classification::Custom(s) => s,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Classification {
    fn from(value: String) -> Self {
        match value.as_str() {
            "liveness" => Classification::Liveness,
            "readiness" => Classification::Readiness,
            "startup" => Classification::Startup,
            _ => Classification::Custom(value),
        }
    }
}

impl From<&str> for Classification {
    fn from(value: &str) -> Self {
        Classification::from(value.to_string())
    }
}

impl From<Classification> for String {
    fn from(value: Classification) -> Self {
        match value {
            Classification::Custom(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl FromStr for Classification {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Classification::from(s))
    }
}

/// Configuration for [`super::MetricsListener`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Optional classification tag; absent means the tag is omitted
    pub classification: Option<Classification>,

    /// Status gauge name
    pub status_metric: String,

    /// Duration gauge name
    pub duration_metric: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            classification: None,
            status_metric: STATUS_METRIC_NAME.to_string(),
            duration_metric: DURATION_METRIC_NAME.to_string(),
        }
    }
}

impl ListenerConfig {
    /// Parse from a YAML document; missing fields take their defaults
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: ListenerConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the classification tag
    pub fn with_classification(mut self, classification: impl Into<Classification>) -> Self {
        self.classification = Some(classification.into());
        self
    }

    /// Tag checks as liveness checks
    pub fn liveness(self) -> Self {
        self.with_classification(Classification::Liveness)
    }

    /// Tag checks as readiness checks
    pub fn readiness(self) -> Self {
        self.with_classification(Classification::Readiness)
    }

    /// Tag checks as startup checks
    pub fn startup(self) -> Self {
        self.with_classification(Classification::Startup)
    }

    /// Override both gauge names
    pub fn with_metric_names(
        mut self,
        status_metric: impl Into<String>,
        duration_metric: impl Into<String>,
    ) -> Self {
        self.status_metric = status_metric.into();
        self.duration_metric = duration_metric.into();
        self
    }

    /// Check the configuration for consistency
    pub fn validate(&self) -> Result<()> {
        if let Some(Classification::Custom(s)) = &self.classification {
            if s.is_empty() {
                return Err(Error::Config(
                    "classification must not be empty; omit it instead".to_string(),
                ));
            }
        }
        if self.status_metric == self.duration_metric {
            return Err(Error::Config(format!(
                "status and duration metrics share the name '{}'",
                self.status_metric
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_defaults() {
        let config = ListenerConfig::default();
        assert_eq!(config.classification, None);
        assert_eq!(config.status_metric, "health/status");
        assert_eq!(config.duration_metric, "health/execute_time");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_classification_parsing() {
        let parse = |s: &str| s.parse::<Classification>().unwrap();
        assert_eq!(parse("liveness"), Classification::Liveness);
        assert_eq!(parse("readiness"), Classification::Readiness);
        assert_eq!(parse("startup"), Classification::Startup);
        assert_eq!(parse("demo"), Classification::Custom("demo".to_string()));
        assert_eq!(Classification::Startup.to_string(), "startup");
    }

    #[test]
    fn test_builders() {
        assert_eq!(
            ListenerConfig::default().liveness().classification,
            Some(Classification::Liveness)
        );
        assert_eq!(
            ListenerConfig::default().with_classification("demo").classification,
            Some(Classification::Custom("demo".to_string()))
        );
    }

    #[test]
    fn test_from_yaml() {
        let config = ListenerConfig::from_yaml_str("classification: readiness\n").unwrap();
        assert_eq!(config.classification, Some(Classification::Readiness));
        assert_eq!(config.status_metric, STATUS_METRIC_NAME);

        let config = ListenerConfig::from_yaml_str(
            "classification: batch\nstatus_metric: jobs/status\nduration_metric: jobs/time\n",
        )
        .unwrap();
        assert_eq!(
            config.classification,
            Some(Classification::Custom("batch".to_string()))
        );
        assert_eq!(config.duration_metric, "jobs/time");
    }

    #[test]
    fn test_validation() {
        let empty = ListenerConfig::default().with_classification("");
        assert_matches!(empty.validate(), Err(Error::Config(_)));

        let clash = ListenerConfig::default().with_metric_names("same", "same");
        assert_matches!(clash.validate(), Err(Error::Config(_)));

        assert_matches!(
            ListenerConfig::from_yaml_str("status_metric: [1, 2]"),
            Err(Error::Yaml(_))
        );
    }
}
