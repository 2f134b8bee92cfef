//! Last-value gauge
//!
//! # Architecture
//!
//! ```text
//! producers ──record──▶ ┌──────────────────┐ ◀──drain── observer ──observe──▶ sink
//!  (any thread)         │  LastValueStore  │            (one collection
//!                       │  key → i64       │             at a time)
//!                       └──────────────────┘
//! ```
//!
//! Reporting is edge-triggered: a tag set shows up in the first collection
//! after it was recorded and then disappears until recorded again.

mod instrument;
mod observer;
mod store;

pub use instrument::Int64Gauge;
pub use observer::ObserveSummary;
pub use store::{DrainSummary, LastValueStore, StoreStats};
