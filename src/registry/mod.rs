//! Metrics pipeline
//!
//! Instrument registration, per-period callbacks and the `observe` emit call.
//! The registry is an ordinary value: construct one, hand references to the
//! components that record into it, and call [`MeterRegistry::collect`] from
//! whatever owns the collection period.

mod meter;
mod point;

pub use meter::{
    CollectionReport, InstrumentDescriptor, Int64Callback, MeterRegistry,
    MAX_INSTRUMENT_NAME_LEN,
};
pub use point::{DataPoint, Int64Observer, PointSink};
