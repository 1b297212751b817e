//
// Copyright 2026 cfplist Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

use std::collections::BTreeMap;

use crate::convert::EncodeContext;
use crate::engine::handle::{ArrayValue, DictionaryValue, NumberValue, ScopedRef, StringValue};
use crate::engine;
use crate::error::{Error, Result};
use crate::value::Value;

/// Encodes a managed value into an equivalent native value.
///
/// Strings, integers and reals allocate fresh native values. Booleans yield
/// a non-owned reference to one of the two shared singletons. Containers
/// encode their children in order; a failure anywhere abandons the whole
/// call, and dropping the partially filled container handle releases
/// everything it had retained.
pub fn encode_value(context: &mut EncodeContext, value: &Value) -> Result<ScopedRef> {
    context.enter()?;
    let result = match value {
        Value::String(contents) => {
            Ok(ScopedRef::<StringValue>::owned(engine::string_create(contents)).upcast())
        }
        Value::Integer(inner) => {
            Ok(ScopedRef::<NumberValue>::owned(engine::integer_create(*inner)).upcast())
        }
        Value::Real(inner) => {
            Ok(ScopedRef::<NumberValue>::owned(engine::real_create(inner.into_inner())).upcast())
        }
        Value::Boolean(inner) => Ok(ScopedRef::shared(context.boolean(*inner))),
        Value::Array(items) => encode_array(context, items).map(ScopedRef::upcast),
        Value::Dictionary(entries) => dictionary_value(context, entries).map(ScopedRef::upcast),
    };
    context.leave();
    result
}

/// Encodes a slice of managed values into a native array of the same length,
/// in index order.
pub fn encode_array(context: &mut EncodeContext, items: &[Value]) -> Result<ScopedRef<ArrayValue>> {
    let raw = engine::array_create(items.len());
    let array = ScopedRef::owned(raw);
    for item in items {
        let element = encode_value(context, item)?;
        let element_raw = element
            .get()
            .ok_or(Error::NullReference("encoded array element"))?;
        // The array retains the element; the scoped handle releases its own
        // reference when it goes out of scope at the end of the iteration.
        engine::array_push(raw, element_raw);
    }
    Ok(array)
}

/// Encodes an ordered map into a native dictionary. This is the bulk
/// construction path behind [`crate::Document::from_dictionary`].
pub fn encode_dictionary(entries: &BTreeMap<String, Value>) -> Result<ScopedRef<DictionaryValue>> {
    let mut context = EncodeContext::new();
    dictionary_value(&mut context, entries)
}

fn dictionary_value(
    context: &mut EncodeContext,
    entries: &BTreeMap<String, Value>,
) -> Result<ScopedRef<DictionaryValue>> {
    let raw = engine::dictionary_create(entries.len());
    let dictionary = ScopedRef::owned(raw);
    for (key, value) in entries {
        let native_key = ScopedRef::<StringValue>::owned(engine::string_create(key));
        let native_value = encode_value(context, value)?;
        let key_raw = native_key
            .get()
            .ok_or(Error::NullReference("encoded dictionary key"))?;
        let value_raw = native_value
            .get()
            .ok_or(Error::NullReference("encoded dictionary value"))?;
        engine::dictionary_set(raw, key_raw, value_raw);
    }
    Ok(dictionary)
}
