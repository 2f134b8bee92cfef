//! Property-Based Tests for the Attribute Codec
//!
//! # Test Properties
//!
//! 1. **Roundtrip**: deserialize(serialize(tags)) = tags as a set
//! 2. **Order Insensitivity**: permuting the input never changes the key
//! 3. **Last Wins**: a repeated key only contributes its final value
//! 4. **Injectivity**: different sets never share a key

#![cfg(test)]

use proptest::prelude::*;

use super::codec::{deserialize, serialize};
use super::value::{AttributeSet, KeyValue, Value};

// =============================================================================
// Property Strategies
// =============================================================================

fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z_]{1,8}"
}

fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::I64),
        any::<f64>().prop_filter("finite", |f| f.is_finite()).prop_map(Value::F64),
        ".{0,12}".prop_map(Value::String),
    ]
}

/// Tags with unique keys, in arbitrary order.
fn unique_tags_strategy() -> impl Strategy<Value = Vec<KeyValue>> {
    prop::collection::btree_map(key_strategy(), value_strategy(), 0..8).prop_flat_map(|map| {
        let tags: Vec<KeyValue> = map
            .into_iter()
            .map(|(key, value)| KeyValue { key, value })
            .collect();
        Just(tags).prop_shuffle()
    })
}

/// Tags that may repeat keys.
fn tags_strategy() -> impl Strategy<Value = Vec<KeyValue>> {
    prop::collection::vec(
        (key_strategy(), value_strategy()).prop_map(|(key, value)| KeyValue { key, value }),
        0..10,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_roundtrip(tags in tags_strategy()) {
        let key = serialize(&tags)?;
        let decoded = deserialize(key.as_str())?;

        let expected: AttributeSet = tags.iter().collect();
        prop_assert_eq!(decoded, expected.to_vec());
    }

    #[test]
    fn prop_float_bits_survive(f in any::<f64>().prop_filter("finite", |f| f.is_finite() && *f != 0.0)) {
        let decoded = deserialize(serialize(&[KeyValue::f64("f", f)])?.as_str())?;
        prop_assert_eq!(decoded.len(), 1);
        match &decoded[0].value {
            Value::F64(v) => prop_assert_eq!(v.to_bits(), f.to_bits()),
            other => prop_assert!(false, "decoded {:?}", other),
        }
    }

    #[test]
    fn prop_order_insensitive(
        tags in unique_tags_strategy(),
        seed in any::<prop::sample::Index>(),
    ) {
        let mut rotated = tags.clone();
        if !rotated.is_empty() {
            let shift = seed.index(rotated.len());
            rotated.rotate_left(shift);
        }
        rotated.reverse();

        prop_assert_eq!(serialize(&tags)?, serialize(&rotated)?);
    }

    #[test]
    fn prop_last_duplicate_wins(
        tags in unique_tags_strategy(),
        replacement in value_strategy(),
    ) {
        prop_assume!(!tags.is_empty());

        let target = tags[0].key.clone();
        let mut with_duplicate = tags.clone();
        with_duplicate.push(KeyValue { key: target.clone(), value: replacement.clone() });

        let mut expected = tags.clone();
        expected[0].value = replacement;

        prop_assert_eq!(serialize(&with_duplicate)?, serialize(&expected)?);
    }

    #[test]
    fn prop_distinct_sets_distinct_keys(
        left in unique_tags_strategy(),
        right in unique_tags_strategy(),
    ) {
        let left_set: AttributeSet = left.iter().collect();
        let right_set: AttributeSet = right.iter().collect();
        prop_assume!(left_set != right_set);

        prop_assert_ne!(serialize(&left)?, serialize(&right)?);
    }
}
