//! healthgauge - Health-Check Results as Last-Value Gauges
//!
//! Bridges a periodic health-check runner to a pull-based metrics collector.
//! Check events become tagged gauge records; every collection cycle reports
//! the values recorded since the previous one.
//!
//! # Architecture
//!
//! ```text
//! Check Runner ──▶ MetricsListener ──record──▶ LastValueStore
//!                                                    │ drain
//! Collector ──collect──▶ MeterRegistry ──observe──▶ Gauge Observer ──▶ PointSink
//! ```
//!
//! # Modules
//!
//! - [`adapters`] - Prometheus text exporter
//! - [`attributes`] - Typed tags and the canonical tag-set key
//! - [`domain`] - Check results and listener ports
//! - [`error`] - Error types
//! - [`gauge`] - Last-value store, gauge instrument and observer
//! - [`listener`] - Health result adapter
//! - [`registry`] - Instrument registration and collection

pub mod adapters;
pub mod attributes;
pub mod domain;
pub mod error;
pub mod gauge;
pub mod listener;
pub mod registry;

// Re-export commonly used types
pub use attributes::{KeyValue, Value};
pub use domain::{CheckListener, CheckResult, HealthListener};
pub use error::{Error, Result};
pub use gauge::{Int64Gauge, LastValueStore};
pub use listener::{Classification, ListenerConfig, MetricsListener};
pub use registry::{CollectionReport, DataPoint, MeterRegistry, PointSink};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
