//! Int64 last-value gauge instrument

use std::sync::Arc;

use super::observer::{observe_store, ObserveSummary};
use super::store::{LastValueStore, StoreStats};
use crate::attributes::KeyValue;
use crate::error::CodecError;
use crate::registry::Int64Observer;

/// Named last-value gauge.
///
/// Cheap to clone; clones share one store. Created through
/// [`crate::registry::MeterRegistry::int64_gauge`], which also wires its
/// observer into every collection.
#[derive(Debug, Clone)]
pub struct Int64Gauge {
    name: Arc<str>,
    store: Arc<LastValueStore>,
}

impl Int64Gauge {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            store: Arc::new(LastValueStore::new()),
        }
    }

    /// Instrument name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Record the current value for a tag set
    pub fn record(&self, value: i64, tags: &[KeyValue]) -> Result<(), CodecError> {
        self.store.record(value, tags)
    }

    /// Drain every pending value into `observer`
    pub fn observe(&self, observer: &mut dyn Int64Observer) -> ObserveSummary {
        observe_store(&self.name, &self.store, observer)
    }

    /// Number of tag sets waiting for the next collection
    pub fn pending(&self) -> usize {
        self.store.len()
    }

    /// Store counters
    pub fn stats(&self) -> StoreStats {
        self.store.stats()
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &LastValueStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EmitError;

    #[derive(Default)]
    struct Collect(Vec<(i64, Vec<KeyValue>)>);

    impl Int64Observer for Collect {
        fn observe(&mut self, value: i64, tags: &[KeyValue]) -> Result<(), EmitError> {
            self.0.push((value, tags.to_vec()));
            Ok(())
        }
    }

    #[test]
    fn test_clones_share_store() {
        let gauge = Int64Gauge::new("test.shared");
        let clone = gauge.clone();

        clone.record(5, &[KeyValue::string("a", "b")]).unwrap();
        assert_eq!(gauge.pending(), 1);

        let mut sink = Collect::default();
        let summary = gauge.observe(&mut sink);
        assert_eq!(summary.emitted, 1);
        assert_eq!(sink.0, vec![(5, vec![KeyValue::string("a", "b")])]);
        assert_eq!(clone.pending(), 0);
        assert_eq!(gauge.stats().drained, 1);
    }
}
