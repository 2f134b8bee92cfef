//! Gauge Observer
//!
//! Collection-time glue: drains a store and forwards every entry through the
//! pipeline's emit call. Runs to completion inside one collection.
//!
//! Points whose emit fails are lost. The entry is retired before the emit
//! result is known, and nothing is re-buffered.

use tracing::warn;

use super::store::LastValueStore;
use crate::registry::Int64Observer;

/// Outcome of observing one gauge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObserveSummary {
    /// Points accepted by the sink
    pub emitted: usize,
    /// Points the sink rejected (already retired from the store)
    pub failed: usize,
    /// Entries discarded for undecodable keys
    pub discarded: usize,
}

/// Drain `store` into `observer`.
pub(crate) fn observe_store(
    instrument: &str,
    store: &LastValueStore,
    observer: &mut dyn Int64Observer,
) -> ObserveSummary {
    let mut summary = ObserveSummary::default();

    let drained = store.drain(|tags, value| {
        match observer.observe(value, &tags) {
            Ok(()) => summary.emitted += 1,
            Err(e) => {
                summary.failed += 1;
                warn!(instrument, error = %e, value, "Dropping gauge point after emit failure");
            }
        }
        true
    });

    summary.discarded = drained.discarded;
    if drained.discarded > 0 {
        observer.discarded(drained.discarded);
    }
    summary
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::KeyValue;
    use crate::error::EmitError;

    struct RejectBools {
        accepted: Vec<(i64, Vec<KeyValue>)>,
    }

    impl Int64Observer for RejectBools {
        fn observe(&mut self, value: i64, tags: &[KeyValue]) -> Result<(), EmitError> {
            if tags.iter().any(|kv| kv.value.as_bool().is_some()) {
                return Err(EmitError::Closed("bools rejected".to_string()));
            }
            self.accepted.push((value, tags.to_vec()));
            Ok(())
        }
    }

    #[test]
    fn test_emit_failure_retires_entry() {
        let store = LastValueStore::new();
        store.record(1, &[KeyValue::string("a", "x")]).unwrap();
        store.record(2, &[KeyValue::bool("b", true)]).unwrap();

        let mut sink = RejectBools { accepted: vec![] };
        let summary = observe_store("test.gauge", &store, &mut sink);

        assert_eq!(summary.emitted, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(sink.accepted, vec![(1, vec![KeyValue::string("a", "x")])]);
        assert!(store.is_empty());
    }

    #[test]
    fn test_empty_store_emits_nothing() {
        let store = LastValueStore::new();
        let mut sink = RejectBools { accepted: vec![] };

        assert_eq!(
            observe_store("test.gauge", &store, &mut sink),
            ObserveSummary::default()
        );
    }
}
