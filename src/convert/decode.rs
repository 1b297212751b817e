//
// Copyright 2026 cfplist Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

use ordered_float::OrderedFloat;

use std::collections::BTreeMap;

use crate::convert::MAX_DEPTH;
use crate::engine::{self, Raw, TypeTag};
use crate::error::{Error, Result};
use crate::value::Value;

/// Decodes a native value into an equivalent, freshly allocated managed
/// value.
///
/// Dictionaries decode into key-sorted maps; the numeric kind is taken from
/// the native value's own tag, never inferred from magnitude. The reference
/// passed in is borrowed, not consumed: ownership stays with the caller.
pub fn decode_value(value: Raw) -> Result<Value> {
    decode_at_depth(value, 0)
}

fn decode_at_depth(value: Raw, depth: usize) -> Result<Value> {
    if depth == MAX_DEPTH {
        return Err(Error::NestingTooDeep);
    }
    match engine::type_of(value) {
        TypeTag::String => Ok(Value::String(engine::string_value(value))),
        TypeTag::Boolean => Ok(Value::Boolean(engine::boolean_value(value))),
        TypeTag::Integer => Ok(Value::Integer(engine::integer_value(value))),
        TypeTag::Real => Ok(Value::Real(OrderedFloat(engine::real_value(value)))),
        TypeTag::Data => Err(Error::UnsupportedType("data")),
        TypeTag::Array => {
            let length = engine::array_len(value);
            let mut items = Vec::with_capacity(length);
            for index in 0..length {
                let item = engine::array_get(value, index)
                    .ok_or(Error::NullReference("array element"))?;
                items.push(decode_at_depth(item, depth + 1)?);
            }
            Ok(Value::Array(items))
        }
        TypeTag::Dictionary => {
            let mut entries = BTreeMap::new();
            for (key, entry_value) in engine::dictionary_pairs(value) {
                if engine::type_of(key) != TypeTag::String {
                    return Err(Error::UnsupportedKeyType);
                }
                // A duplicate key replaces the earlier entry.
                entries.insert(engine::string_value(key), decode_at_depth(entry_value, depth + 1)?);
            }
            Ok(Value::Dictionary(entries))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{encode_value, EncodeContext};
    use crate::engine::handle::ScopedRef;
    use crate::engine::live_value_count;

    fn round_trip(value: &Value) -> Value {
        let mut context = EncodeContext::new();
        let native = encode_value(&mut context, value).unwrap();
        decode_value(native.get().unwrap()).unwrap()
    }

    #[test]
    fn test_scalar_round_trips() {
        for value in [
            Value::Boolean(true),
            Value::Boolean(false),
            Value::Integer(0),
            Value::Integer(-1),
            Value::Integer(i64::max_value()),
            Value::Integer(i64::min_value()),
            Value::from(0.0),
            Value::from(-2.5),
            Value::String(String::new()),
            Value::from("hello"),
        ]
        .iter()
        {
            assert_eq!(&round_trip(value), value);
        }
    }

    #[test]
    fn test_integers_do_not_become_reals() {
        assert_eq!(round_trip(&Value::Integer(3)), Value::Integer(3));
        assert_eq!(round_trip(&Value::from(3.0)), Value::from(3.0));
    }

    #[test]
    fn test_container_round_trip() {
        let mut inner = BTreeMap::new();
        inner.insert(String::from("flag"), Value::Boolean(false));
        let mut entries = BTreeMap::new();
        entries.insert(
            String::from("items"),
            Value::Array(vec![Value::Integer(1), Value::from("two"), Value::from(3.0)]),
        );
        entries.insert(String::from("nested"), Value::Dictionary(inner));
        let value = Value::Dictionary(entries);
        assert_eq!(round_trip(&value), value);
    }

    #[test]
    fn test_empty_containers_decode_fresh_and_empty() {
        assert_eq!(round_trip(&Value::Array(vec![])), Value::Array(vec![]));
        assert_eq!(
            round_trip(&Value::Dictionary(BTreeMap::new())),
            Value::Dictionary(BTreeMap::new())
        );
    }

    #[test]
    fn test_data_value_is_unsupported() {
        let data: ScopedRef = ScopedRef::owned(engine::data_create(vec![1, 2, 3]));
        assert_eq!(
            decode_value(data.get().unwrap()),
            Err(Error::UnsupportedType("data"))
        );
    }

    #[test]
    fn test_non_string_key_fails_whole_decode() {
        let mut context = EncodeContext::new();
        let before = live_value_count();
        {
            let dictionary: ScopedRef = ScopedRef::owned(engine::dictionary_create(2));
            let raw = dictionary.get().unwrap();

            let good = encode_value(&mut context, &Value::from("ok")).unwrap();
            let key: ScopedRef = ScopedRef::owned(engine::string_create("good"));
            engine::dictionary_set(raw, key.get().unwrap(), good.get().unwrap());

            let bad_key: ScopedRef = ScopedRef::owned(engine::integer_create(9));
            let bad_value = encode_value(&mut context, &Value::Integer(1)).unwrap();
            engine::dictionary_set(raw, bad_key.get().unwrap(), bad_value.get().unwrap());

            assert_eq!(decode_value(raw), Err(Error::UnsupportedKeyType));
        }
        assert_eq!(live_value_count(), before);
    }
}
