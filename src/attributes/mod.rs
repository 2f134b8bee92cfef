//! Attribute Codec
//!
//! Typed tags attached to observations, and the canonical string identity of a
//! tag set.
//!
//! # Wire Format
//!
//! ```text
//! [{"Key":"a","Value":{"Type":"STRING","Value":"1"}},{"Key":"d","Value":{"Type":"BOOL","Value":true}}]
//! ```
//!
//! Elements are sorted ascending by `Key`; keys are unique. The same string is
//! used as the map key inside the last-value store.

mod codec;
mod proptest;
mod value;

pub use codec::{deserialize, serialize, serialize_set, CanonicalKey};
pub use value::{AttributeSet, KeyValue, Value, ValueKind};
