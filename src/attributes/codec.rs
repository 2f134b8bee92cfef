//! Canonical tag-set encoding
//!
//! `serialize` is a pure function of the tag set: input order and duplicate
//! keys never change the output. `deserialize` accepts exactly what
//! `serialize` produces (plus unsorted input, which it sorts) and rejects
//! anything else with a [`CodecError`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::value::{AttributeSet, KeyValue, Value};
use crate::error::CodecError;

/// Canonical string identity of a tag set
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    /// Wrap an already-encoded string without validating it
    pub(crate) fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The encoded form
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the encoded string
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct WireAttribute {
    #[serde(rename = "Key")]
    key: String,
    #[serde(rename = "Value")]
    value: WireValue,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "Type", content = "Value")]
enum WireValue {
    #[serde(rename = "BOOL")]
    Bool(bool),
    #[serde(rename = "INT64")]
    Int64(i64),
    #[serde(rename = "FLOAT64")]
    Float64(f64),
    #[serde(rename = "STRING")]
    String(String),
}

impl WireValue {
    fn encode(key: &str, value: &Value) -> Result<Self, CodecError> {
        Ok(match value {
            Value::Bool(b) => WireValue::Bool(*b),
            Value::I64(i) => WireValue::Int64(*i),
            // -0.0 == 0.0, so both must share one key
            Value::F64(f) if *f == 0.0 => WireValue::Float64(0.0),
            Value::F64(f) if f.is_finite() => WireValue::Float64(*f),
            Value::F64(f) => {
                return Err(CodecError::UnsupportedValue {
                    key: key.to_string(),
                    reason: format!("non-finite FLOAT64 {}", f),
                })
            }
            Value::String(s) => WireValue::String(s.clone()),
        })
    }

    fn decode(self) -> Value {
        match self {
            WireValue::Bool(b) => Value::Bool(b),
            WireValue::Int64(i) => Value::I64(i),
            WireValue::Float64(f) => Value::F64(f),
            WireValue::String(s) => Value::String(s),
        }
    }
}

// =============================================================================
// Encode / Decode
// =============================================================================

/// Encode a tag list into its canonical key.
///
/// Later duplicates replace earlier ones before encoding.
pub fn serialize(tags: &[KeyValue]) -> Result<CanonicalKey, CodecError> {
    let set: AttributeSet = tags.iter().collect();
    serialize_set(&set)
}

/// Encode an already-deduplicated tag set into its canonical key.
pub fn serialize_set(set: &AttributeSet) -> Result<CanonicalKey, CodecError> {
    let mut wire = Vec::with_capacity(set.len());
    for (key, value) in set.iter() {
        if key.is_empty() {
            return Err(CodecError::EmptyKey);
        }
        wire.push(WireAttribute {
            key: key.to_string(),
            value: WireValue::encode(key, value)?,
        });
    }

    let encoded = serde_json::to_string(&wire).map_err(CodecError::Encode)?;
    Ok(CanonicalKey(encoded))
}

/// Decode a canonical key back into tags, sorted ascending by key.
pub fn deserialize(key: &str) -> Result<Vec<KeyValue>, CodecError> {
    let wire: Vec<WireAttribute> = serde_json::from_str(key).map_err(CodecError::Malformed)?;

    let mut decoded = BTreeMap::new();
    for attribute in wire {
        if attribute.key.is_empty() {
            return Err(CodecError::EmptyKey);
        }
        if decoded.contains_key(&attribute.key) {
            return Err(CodecError::DuplicateKey { key: attribute.key });
        }
        decoded.insert(attribute.key, attribute.value.decode());
    }

    Ok(decoded
        .into_iter()
        .map(|(key, value)| KeyValue { key, value })
        .collect())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_serialize_basic() {
        let key = serialize(&[KeyValue::string("a", "b"), KeyValue::string("c", "d")]).unwrap();
        assert_eq!(
            key.as_str(),
            r#"[{"Key":"a","Value":{"Type":"STRING","Value":"b"}},{"Key":"c","Value":{"Type":"STRING","Value":"d"}}]"#
        );
    }

    #[test]
    fn test_serialize_sorts_by_key() {
        let key = serialize(&[
            KeyValue::string("z", "3"),
            KeyValue::string("a", "1"),
            KeyValue::string("g", "2"),
        ])
        .unwrap();
        assert_eq!(
            key.as_str(),
            concat!(
                r#"[{"Key":"a","Value":{"Type":"STRING","Value":"1"}},"#,
                r#"{"Key":"g","Value":{"Type":"STRING","Value":"2"}},"#,
                r#"{"Key":"z","Value":{"Type":"STRING","Value":"3"}}]"#
            )
        );
    }

    #[test]
    fn test_serialize_typed_values() {
        let key = serialize(&[
            KeyValue::string("a", "1"),
            KeyValue::bool("d", true),
            KeyValue::i64("n", -7),
        ])
        .unwrap();
        assert_eq!(
            key.as_str(),
            concat!(
                r#"[{"Key":"a","Value":{"Type":"STRING","Value":"1"}},"#,
                r#"{"Key":"d","Value":{"Type":"BOOL","Value":true}},"#,
                r#"{"Key":"n","Value":{"Type":"INT64","Value":-7}}]"#
            )
        );
    }

    #[test]
    fn test_serialize_empty_set() {
        assert_eq!(serialize(&[]).unwrap().as_str(), "[]");
        assert!(deserialize("[]").unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let key = serialize(&[
            KeyValue::string("a", "old"),
            KeyValue::string("b", "x"),
            KeyValue::string("a", "new"),
        ])
        .unwrap();
        let expected =
            serialize(&[KeyValue::string("a", "new"), KeyValue::string("b", "x")]).unwrap();

        assert_eq!(key, expected);
        assert!(!key.as_str().contains("old"));
    }

    #[test]
    fn test_round_trip() {
        let tags = vec![
            KeyValue::string("check", "db"),
            KeyValue::bool("check_passing", false),
            KeyValue::f64("ratio", 0.25),
        ];
        let decoded = deserialize(serialize(&tags).unwrap().as_str()).unwrap();
        assert_eq!(decoded, tags);
    }

    #[test]
    fn test_float_round_trip_is_exact() {
        for f in [
            1.0715660391465826e-75,
            0.1 + 0.2,
            f64::MIN_POSITIVE,
            5e-324,
            f64::MAX,
            -1.7976931348623157e308,
            123456789.98765433,
        ] {
            let tags = vec![KeyValue::f64("f", f)];
            let decoded = deserialize(serialize(&tags).unwrap().as_str()).unwrap();
            assert_matches!(&decoded[0].value, Value::F64(v) if v.to_bits() == f.to_bits());
        }
    }

    #[test]
    fn test_negative_zero_shares_key_with_zero() {
        let negative = serialize(&[KeyValue::f64("f", -0.0)]).unwrap();
        let positive = serialize(&[KeyValue::f64("f", 0.0)]).unwrap();
        assert_eq!(negative, positive);
        assert_eq!(
            negative.as_str(),
            r#"[{"Key":"f","Value":{"Type":"FLOAT64","Value":0.0}}]"#
        );
    }

    #[test]
    fn test_non_finite_float_rejected() {
        let result = serialize(&[KeyValue::string("a", "b"), KeyValue::f64("bad", f64::NAN)]);
        assert_matches!(result, Err(CodecError::UnsupportedValue { key, .. }) if key == "bad");

        let result = serialize(&[KeyValue::f64("inf", f64::INFINITY)]);
        assert_matches!(result, Err(CodecError::UnsupportedValue { .. }));
    }

    #[test]
    fn test_empty_key_rejected() {
        assert_matches!(
            serialize(&[KeyValue::string("", "x")]),
            Err(CodecError::EmptyKey)
        );
    }

    #[test]
    fn test_malformed_input_is_an_error() {
        assert_matches!(deserialize("not json"), Err(CodecError::Malformed(_)));
        assert_matches!(deserialize(""), Err(CodecError::Malformed(_)));
        assert_matches!(deserialize(r#"{"Key":"a"}"#), Err(CodecError::Malformed(_)));
    }

    #[test]
    fn test_unknown_type_is_an_error() {
        let input = r#"[{"Key":"a","Value":{"Type":"SLICE","Value":[1,2]}}]"#;
        assert_matches!(deserialize(input), Err(CodecError::Malformed(_)));
    }

    #[test]
    fn test_mismatched_native_value_is_an_error() {
        let input = r#"[{"Key":"a","Value":{"Type":"BOOL","Value":"yes"}}]"#;
        assert_matches!(deserialize(input), Err(CodecError::Malformed(_)));
    }

    #[test]
    fn test_duplicate_key_in_input_is_an_error() {
        let input = concat!(
            r#"[{"Key":"a","Value":{"Type":"STRING","Value":"1"}},"#,
            r#"{"Key":"a","Value":{"Type":"STRING","Value":"2"}}]"#
        );
        assert_matches!(deserialize(input), Err(CodecError::DuplicateKey { key }) if key == "a");
    }

    #[test]
    fn test_deserialize_sorts_unsorted_input() {
        let input = concat!(
            r#"[{"Key":"z","Value":{"Type":"STRING","Value":"1"}},"#,
            r#"{"Key":"b","Value":{"Type":"BOOL","Value":false}}]"#
        );
        let decoded = deserialize(input).unwrap();
        assert_eq!(
            decoded,
            vec![KeyValue::bool("b", false), KeyValue::string("z", "1")]
        );
    }

    #[test]
    fn test_escaped_strings_round_trip() {
        let tags = vec![KeyValue::string("path", "a \"quoted\"\nvalue\\")];
        let key = serialize(&tags).unwrap();
        assert_eq!(deserialize(key.as_str()).unwrap(), tags);
    }
}
