//! Exporter Adapters
//!
//! Point sinks for concrete metrics backends. The core only knows the
//! [`crate::registry::PointSink`] seam; adapters own the wire format.
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use healthgauge::adapters::PrometheusExporter;
//! use healthgauge::registry::MeterRegistry;
//!
//! let meters = Arc::new(MeterRegistry::new("health"));
//! let exporter = PrometheusExporter::new(meters.clone())?;
//!
//! // Each scrape is one collection cycle
//! let body = exporter.scrape()?;
//! ```

mod prometheus;

pub use self::prometheus::{
    sanitize_metric_name, ExporterMetrics, PrometheusExporter, PrometheusTextSink,
};
