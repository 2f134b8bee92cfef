//! Domain Ports
//!
//! Callbacks the external health-check runner delivers. The runner may invoke
//! them from several worker threads at once, so implementations take `&self`
//! and must be `Send + Sync`.
//!
//! ```text
//! ┌───────────────────┐  on_check_*            ┌──────────────────┐
//! │ health-check      │ ─────────────────────▶ │ CheckListener    │
//! │ runner (external) │  on_results_updated    │ HealthListener   │
//! └───────────────────┘ ─────────────────────▶ └──────────────────┘
//! ```

use std::collections::HashMap;

use super::result::CheckResult;

/// Per-check lifecycle callbacks
pub trait CheckListener: Send + Sync {
    /// A check was registered, with its initial result
    fn on_check_registered(&self, name: &str, result: &CheckResult);

    /// A check execution is about to start
    fn on_check_started(&self, name: &str);

    /// A check execution finished
    fn on_check_completed(&self, name: &str, result: &CheckResult);
}

/// Aggregate callback with the latest result of every check
pub trait HealthListener: Send + Sync {
    /// Latest results changed
    fn on_results_updated(&self, results: &HashMap<String, CheckResult>);
}
