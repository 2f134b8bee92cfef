//! Health-check domain: results and the listener ports the runner calls.

pub mod ports;
mod result;

pub use ports::{CheckListener, HealthListener};
pub use result::{all_healthy, CheckResult};
