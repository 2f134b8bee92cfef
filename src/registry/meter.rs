//! Meter Registry
//!
//! Explicitly constructed metrics pipeline binding. Instruments register a
//! callback; [`MeterRegistry::collect`] runs every callback once, in
//! registration order, feeding the caller's sink.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use super::point::{DataPoint, Int64Observer, PointSink};
use crate::attributes::KeyValue;
use crate::error::{EmitError, RegistrationError};
use crate::gauge::Int64Gauge;

/// Maximum instrument name length
pub const MAX_INSTRUMENT_NAME_LEN: usize = 255;

/// Per-collection callback of an int64 instrument
pub type Int64Callback = Box<dyn Fn(&mut dyn Int64Observer) + Send + Sync>;

/// Name and description of a registered instrument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentDescriptor {
    pub name: String,
    pub description: String,
}

/// Outcome of one collection cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionReport {
    /// Instruments whose callbacks ran
    pub instruments: usize,
    /// Points accepted by the sink
    pub points: usize,
    /// Points the sink rejected; they are not retried
    pub emit_failures: usize,
    /// Stored entries dropped because their key no longer decodes
    pub discarded: usize,
}

impl CollectionReport {
    /// True if every stored entry reached the sink
    pub fn is_clean(&self) -> bool {
        self.emit_failures == 0 && self.discarded == 0
    }
}

struct Instrument {
    descriptor: InstrumentDescriptor,
    callback: Int64Callback,
}

/// Metrics pipeline instance
pub struct MeterRegistry {
    name: String,
    instruments: RwLock<Vec<Instrument>>,
    collecting: Mutex<()>,
    collections: AtomicU64,
}

impl MeterRegistry {
    /// Create an empty registry
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instruments: RwLock::new(Vec::new()),
            collecting: Mutex::new(()),
            collections: AtomicU64::new(0),
        }
    }

    /// Registry name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a callback invoked once per collection.
    pub fn register_int64_callback<F>(
        &self,
        name: &str,
        description: &str,
        callback: F,
    ) -> Result<(), RegistrationError>
    where
        F: Fn(&mut dyn Int64Observer) + Send + Sync + 'static,
    {
        validate_name(name)?;

        let mut instruments = self.instruments.write();
        if instruments.iter().any(|i| i.descriptor.name == name) {
            return Err(RegistrationError::Duplicate {
                name: name.to_string(),
            });
        }

        instruments.push(Instrument {
            descriptor: InstrumentDescriptor {
                name: name.to_string(),
                description: description.to_string(),
            },
            callback: Box::new(callback),
        });

        info!(registry = %self.name, instrument = name, "Registered instrument");
        Ok(())
    }

    /// Create a last-value gauge and register its observer.
    pub fn int64_gauge(
        &self,
        name: &str,
        description: &str,
    ) -> Result<Int64Gauge, RegistrationError> {
        let gauge = Int64Gauge::new(name);
        let observed = gauge.clone();
        self.register_int64_callback(name, description, move |observer| {
            observed.observe(observer);
        })?;
        Ok(gauge)
    }

    /// Registered instruments, in registration order
    pub fn instruments(&self) -> Vec<InstrumentDescriptor> {
        self.instruments
            .read()
            .iter()
            .map(|i| i.descriptor.clone())
            .collect()
    }

    /// Run one collection cycle into `sink`.
    ///
    /// Overlapping calls are serialized; each sees its own complete cycle.
    pub fn collect(&self, sink: &mut dyn PointSink) -> CollectionReport {
        let _cycle = self.collecting.lock();
        let mut report = CollectionReport::default();

        for instrument in self.instruments.read().iter() {
            let mut observer = InstrumentObserver {
                instrument: &instrument.descriptor.name,
                sink: &mut *sink,
                emitted: 0,
                failed: 0,
                discarded: 0,
            };
            (instrument.callback)(&mut observer);

            report.instruments += 1;
            report.points += observer.emitted;
            report.emit_failures += observer.failed;
            report.discarded += observer.discarded;
        }

        self.collections.fetch_add(1, Ordering::Relaxed);
        debug!(
            registry = %self.name,
            instruments = report.instruments,
            points = report.points,
            emit_failures = report.emit_failures,
            discarded = report.discarded,
            "Collection complete"
        );

        report
    }

    /// Number of completed collections
    pub fn collections(&self) -> u64 {
        self.collections.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for MeterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeterRegistry")
            .field("name", &self.name)
            .field("instruments", &self.instruments.read().len())
            .field("collections", &self.collections())
            .finish()
    }
}

struct InstrumentObserver<'a> {
    instrument: &'a str,
    sink: &'a mut dyn PointSink,
    emitted: usize,
    failed: usize,
    discarded: usize,
}

impl Int64Observer for InstrumentObserver<'_> {
    fn observe(&mut self, value: i64, tags: &[KeyValue]) -> Result<(), EmitError> {
        let result = self.sink.emit(DataPoint {
            instrument: self.instrument.to_string(),
            tags: tags.to_vec(),
            value,
        });
        match result {
            Ok(()) => self.emitted += 1,
            Err(_) => self.failed += 1,
        }
        result
    }

    fn discarded(&mut self, count: usize) {
        self.discarded += count;
    }
}

fn validate_name(name: &str) -> Result<(), RegistrationError> {
    let invalid = |reason: String| RegistrationError::InvalidName {
        name: name.to_string(),
        reason,
    };

    let first = name
        .chars()
        .next()
        .ok_or_else(|| invalid("name must not be empty".to_string()))?;
    if name.len() > MAX_INSTRUMENT_NAME_LEN {
        return Err(invalid(format!(
            "name exceeds {} characters",
            MAX_INSTRUMENT_NAME_LEN
        )));
    }
    if !first.is_ascii_alphabetic() {
        return Err(invalid("name must start with an ASCII letter".to_string()));
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-' | '/')))
    {
        return Err(invalid(format!("invalid character '{}'", c)));
    }

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::sync::Arc;

    #[test]
    fn test_gauge_points_carry_instrument_name() {
        let registry = MeterRegistry::new("test");
        let gauge = registry.int64_gauge("health/status", "status").unwrap();
        gauge.record(1, &[KeyValue::string("check", "db")]).unwrap();

        let mut points = Vec::new();
        let report = registry.collect(&mut points);

        assert_eq!(report.instruments, 1);
        assert_eq!(report.points, 1);
        assert!(report.is_clean());
        assert_eq!(
            points,
            vec![DataPoint {
                instrument: "health/status".to_string(),
                tags: vec![KeyValue::string("check", "db")],
                value: 1,
            }]
        );
        assert_eq!(registry.collections(), 1);
    }

    #[test]
    fn test_gauges_drain_independently() {
        let registry = MeterRegistry::new("test");
        let status = registry.int64_gauge("status", "").unwrap();
        let duration = registry.int64_gauge("duration", "").unwrap();

        status.record(1, &[]).unwrap();
        duration.record(40, &[]).unwrap();
        duration.record(45, &[]).unwrap();

        let mut points = Vec::new();
        registry.collect(&mut points);
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].instrument, "duration");
        assert_eq!(points[1].value, 45);

        status.record(0, &[]).unwrap();
        let mut points = Vec::new();
        registry.collect(&mut points);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].instrument, "status");
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let registry = MeterRegistry::new("test");
        registry.int64_gauge("health/status", "").unwrap();

        assert_matches!(
            registry.int64_gauge("health/status", ""),
            Err(RegistrationError::Duplicate { name }) if name == "health/status"
        );
        assert_eq!(registry.instruments().len(), 1);
    }

    #[test]
    fn test_invalid_names_rejected() {
        let registry = MeterRegistry::new("test");
        let too_long = format!("a{}", "b".repeat(MAX_INSTRUMENT_NAME_LEN));

        for name in ["", "9lives", "_hidden", "has space", "emoji✓", too_long.as_str()] {
            assert_matches!(
                registry.int64_gauge(name, ""),
                Err(RegistrationError::InvalidName { .. }),
                "name {:?} should be rejected",
                name
            );
        }
        assert!(registry.instruments().is_empty());
    }

    #[test]
    fn test_raw_callback_runs_once_per_collection() {
        let registry = MeterRegistry::new("test");
        let calls = Arc::new(AtomicU64::new(0));
        let counted = calls.clone();

        registry
            .register_int64_callback("process.up", "liveness", move |observer| {
                counted.fetch_add(1, Ordering::Relaxed);
                let _ = observer.observe(1, &[]);
            })
            .unwrap();

        for _ in 0..3 {
            let mut points = Vec::new();
            registry.collect(&mut points);
            assert_eq!(points.len(), 1);
        }
        assert_eq!(calls.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn test_emit_failures_are_reported() {
        struct Closed;
        impl PointSink for Closed {
            fn emit(&mut self, _point: DataPoint) -> Result<(), EmitError> {
                Err(EmitError::Closed("shutting down".to_string()))
            }
        }

        let registry = MeterRegistry::new("test");
        let gauge = registry.int64_gauge("status", "").unwrap();
        gauge.record(1, &[KeyValue::string("a", "1")]).unwrap();
        gauge.record(1, &[KeyValue::string("a", "2")]).unwrap();

        let report = registry.collect(&mut Closed);
        assert_eq!(report.points, 0);
        assert_eq!(report.emit_failures, 2);
        assert!(!report.is_clean());
        assert_eq!(gauge.pending(), 0);
    }

    #[test]
    fn test_undecodable_entries_are_reported() {
        let registry = MeterRegistry::new("test");
        let gauge = registry.int64_gauge("status", "").unwrap();
        gauge.store().insert_raw("{broken", 1);
        gauge.record(1, &[KeyValue::string("a", "1")]).unwrap();

        let mut points = Vec::new();
        let report = registry.collect(&mut points);

        assert_eq!(report.points, 1);
        assert_eq!(report.discarded, 1);
        assert_eq!(report.emit_failures, 0);
        assert!(!report.is_clean());
        assert_eq!(gauge.pending(), 0);
    }
}
