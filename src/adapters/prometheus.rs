//! Prometheus Text Exporter
//!
//! Renders one collection cycle in the Prometheus text exposition format.
//! Each scrape drains the gauges, so a series only appears in the scrape that
//! follows its most recent update.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::sync::Arc;

use prometheus::{Encoder, IntCounter, Registry, TextEncoder};
use tracing::debug;

use crate::error::{EmitError, Result};
use crate::registry::{CollectionReport, DataPoint, MeterRegistry, PointSink};

/// Prometheus-safe form of an instrument name (`health/status` → `health_status`)
pub fn sanitize_metric_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == ':' { c } else { '_' })
        .collect()
}

fn is_valid_label_name(name: &str) -> bool {
    let mut chars = name.chars();
    let first_ok = chars
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_')
        .unwrap_or(false);
    first_ok && !name.starts_with("__") && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn escape_label_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}

#[derive(Debug, Default)]
struct Family {
    help: String,
    samples: Vec<String>,
}

/// Point sink producing Prometheus text for one collection
#[derive(Debug, Default)]
pub struct PrometheusTextSink {
    descriptions: HashMap<String, String>,
    families: BTreeMap<String, Family>,
}

impl PrometheusTextSink {
    /// Create a sink using the instrument descriptions of `registry` as help text
    pub fn new(registry: &MeterRegistry) -> Self {
        Self {
            descriptions: registry
                .instruments()
                .into_iter()
                .map(|i| (i.name, i.description))
                .collect(),
            families: BTreeMap::new(),
        }
    }

    /// Number of samples accepted so far
    pub fn len(&self) -> usize {
        self.families.values().map(|f| f.samples.len()).sum()
    }

    /// Check if no samples were accepted
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Render all accepted samples, grouped by metric family
    pub fn render(&self) -> String {
        let mut output = String::new();
        for (name, family) in &self.families {
            if !family.help.is_empty() {
                let _ = writeln!(output, "# HELP {} {}", name, escape_help(&family.help));
            }
            let _ = writeln!(output, "# TYPE {} gauge", name);
            for sample in &family.samples {
                output.push_str(sample);
                output.push('\n');
            }
        }
        output
    }
}

impl PointSink for PrometheusTextSink {
    fn emit(&mut self, point: DataPoint) -> std::result::Result<(), EmitError> {
        if let Some(kv) = point.tags.iter().find(|kv| !is_valid_label_name(&kv.key)) {
            return Err(EmitError::InvalidLabelName {
                instrument: point.instrument,
                label: kv.key.clone(),
            });
        }

        let name = sanitize_metric_name(&point.instrument);
        let mut sample = name.clone();
        if !point.tags.is_empty() {
            let labels: Vec<String> = point
                .tags
                .iter()
                .map(|kv| format!("{}=\"{}\"", kv.key, escape_label_value(&kv.value.to_string())))
                .collect();
            let _ = write!(sample, "{{{}}}", labels.join(","));
        }
        let _ = write!(sample, " {}", point.value);

        let help = self.descriptions.get(&point.instrument).cloned();
        let family = self.families.entry(name).or_default();
        if family.help.is_empty() {
            family.help = help.unwrap_or_default();
        }
        family.samples.push(sample);
        Ok(())
    }
}

// =============================================================================
// Self Metrics
// =============================================================================

/// Counters describing the exporter itself
#[derive(Debug, Clone)]
pub struct ExporterMetrics {
    collections: IntCounter,
    points: IntCounter,
    emit_failures: IntCounter,
}

impl ExporterMetrics {
    /// Create the counters and register them on `registry`
    pub fn register(registry: &Registry) -> Result<Self> {
        let collections = IntCounter::new(
            "healthgauge_collections_total",
            "Total number of collection cycles",
        )?;
        let points = IntCounter::new(
            "healthgauge_points_total",
            "Total number of gauge points exported",
        )?;
        let emit_failures = IntCounter::new(
            "healthgauge_emit_failures_total",
            "Total number of gauge points dropped by the exporter",
        )?;

        registry.register(Box::new(collections.clone()))?;
        registry.register(Box::new(points.clone()))?;
        registry.register(Box::new(emit_failures.clone()))?;

        Ok(Self {
            collections,
            points,
            emit_failures,
        })
    }

    /// Account for one collection
    pub fn observe(&self, report: &CollectionReport) {
        self.collections.inc();
        self.points.inc_by(report.points as u64);
        self.emit_failures.inc_by(report.emit_failures as u64);
    }

    /// Total collection cycles
    pub fn collections(&self) -> u64 {
        self.collections.get()
    }

    /// Total dropped points
    pub fn emit_failures(&self) -> u64 {
        self.emit_failures.get()
    }
}

// =============================================================================
// Exporter
// =============================================================================

/// Scrape handler: one call is one collection cycle
pub struct PrometheusExporter {
    meters: Arc<MeterRegistry>,
    registry: Registry,
    metrics: ExporterMetrics,
}

impl PrometheusExporter {
    /// Create an exporter over `meters` with its own self-metrics registry
    pub fn new(meters: Arc<MeterRegistry>) -> Result<Self> {
        let registry = Registry::new();
        let metrics = ExporterMetrics::register(&registry)?;
        Ok(Self {
            meters,
            registry,
            metrics,
        })
    }

    /// Self-metrics
    pub fn metrics(&self) -> &ExporterMetrics {
        &self.metrics
    }

    /// Prometheus registry holding the self-metrics; callers may register more
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Collect the gauges and render them followed by the self-metrics
    pub fn scrape(&self) -> Result<String> {
        let mut sink = PrometheusTextSink::new(&self.meters);
        let report = self.meters.collect(&mut sink);
        self.metrics.observe(&report);

        let mut output = sink.render();

        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        output.push_str(&String::from_utf8_lossy(&buffer));

        debug!(
            points = report.points,
            emit_failures = report.emit_failures,
            bytes = output.len(),
            "Rendered scrape"
        );
        Ok(output)
    }

    /// Content type of [`PrometheusExporter::scrape`] output
    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }
}

impl std::fmt::Debug for PrometheusExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrometheusExporter")
            .field("meters", &self.meters)
            .field("collections", &self.metrics.collections())
            .finish()
    }
}
