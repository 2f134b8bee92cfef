//! Collected data points and the emit seam

use crate::attributes::{KeyValue, Value};
use crate::error::EmitError;

/// One collected observation
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    /// Instrument that produced the point
    pub instrument: String,
    /// Tags, sorted ascending by key
    pub tags: Vec<KeyValue>,
    /// Observed value
    pub value: i64,
}

impl DataPoint {
    /// Look up a tag value by key
    pub fn tag(&self, key: &str) -> Option<&Value> {
        self.tags.iter().find(|kv| kv.key == key).map(|kv| &kv.value)
    }
}

/// Destination for collected points, supplied by the exporter on each
/// collection.
pub trait PointSink {
    /// Accept one point
    fn emit(&mut self, point: DataPoint) -> Result<(), EmitError>;
}

impl PointSink for Vec<DataPoint> {
    fn emit(&mut self, point: DataPoint) -> Result<(), EmitError> {
        self.push(point);
        Ok(())
    }
}

/// Emit call available to an instrument callback during collection
pub trait Int64Observer {
    /// Report one value for a tag set
    fn observe(&mut self, value: i64, tags: &[KeyValue]) -> Result<(), EmitError>;

    /// Account for entries the instrument dropped without emitting
    fn discarded(&mut self, _count: usize) {}
}
