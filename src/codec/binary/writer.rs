//
// Copyright 2026 cfplist Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! Serialization of a native value graph into a binary property list.
//!
//! The writer flattens the graph into an object list in depth-first order,
//! assigning one identifier per distinct native value. A value referenced
//! from more than one container, such as a boolean singleton, is emitted
//! once and referenced by identifier everywhere it appears. The root object
//! is always identifier zero.

use std::collections::HashMap;

use crate::codec::binary::format::{
    HEADER_MAGIC_NUMBER,
    HEADER_SIZE,
    HEADER_VERSION_00,
    TRAILER_PREAMBLE_UNUSED_SIZE,
    ObjectFormat,
};
use crate::codec::binary::utils::{minimum_width, push_be};
use crate::engine::{self, Raw, TypeTag};
use crate::error::{Error, Result};

/// Serializes the native value graph rooted at the argument into a complete
/// binary property list document.
pub fn serialize(root: Raw) -> Result<Vec<u8>> {
    let mut objects = Vec::new();
    let mut identifiers = HashMap::new();
    flatten(root, &mut objects, &mut identifiers)?;

    // References are sized to fit the largest identifier.
    let object_reference_size = minimum_width((objects.len() - 1) as u64);

    // Emit the object table, recording the offset of each object.
    let mut object_table = Vec::new();
    let mut offsets = Vec::with_capacity(objects.len());
    for &object in &objects {
        offsets.push(HEADER_SIZE + object_table.len());
        write_object(&mut object_table, object, &identifiers, object_reference_size)?;
    }

    // Offsets are bounded above by the start of the offset table itself.
    let offset_table_offset = HEADER_SIZE + object_table.len();
    let offset_table_entry_size = minimum_width(offset_table_offset as u64);

    let mut output = Vec::with_capacity(
        offset_table_offset + offsets.len() * offset_table_entry_size + 32
    );
    output.extend_from_slice(HEADER_MAGIC_NUMBER);
    output.push(HEADER_VERSION_00.0);
    output.push(HEADER_VERSION_00.1);
    output.extend_from_slice(&object_table);
    for &offset in &offsets {
        push_be(&mut output, offset as u64, offset_table_entry_size);
    }

    // Trailer.
    output.extend_from_slice(&[0; TRAILER_PREAMBLE_UNUSED_SIZE]);
    output.push(0);
    output.push(offset_table_entry_size as u8);
    output.push(object_reference_size as u8);
    push_be(&mut output, objects.len() as u64, 8);
    push_be(&mut output, 0, 8);
    push_be(&mut output, offset_table_offset as u64, 8);

    Ok(output)
}

/// Assigns an identifier to the value and, in depth-first order, to every
/// value reachable from it. A value that already has an identifier is not
/// visited again, which both deduplicates shared values and bounds the walk
/// on any graph the engine can represent.
fn flatten(
    value: Raw,
    objects: &mut Vec<Raw>,
    identifiers: &mut HashMap<Raw, usize>,
) -> Result<()> {
    if identifiers.contains_key(&value) {
        return Ok(());
    }
    identifiers.insert(value, objects.len());
    objects.push(value);

    match engine::type_of(value) {
        TypeTag::Array => {
            for index in 0 .. engine::array_len(value) {
                let element = engine::array_get(value, index)
                    .ok_or(Error::NullReference("array element"))?;
                flatten(element, objects, identifiers)?;
            }
        }
        TypeTag::Dictionary => {
            for (key, entry_value) in engine::dictionary_pairs(value) {
                flatten(key, objects, identifiers)?;
                flatten(entry_value, objects, identifiers)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Emits the marker byte for a variable-length object. Counts of fifteen and
/// above do not fit in the marker and spill into a trailing integer object.
fn push_marker_with_count(buffer: &mut Vec<u8>, format: ObjectFormat, count: usize) {
    if count < 0b0000_1111 {
        buffer.push(format.tag_bits() | count as u8);
    } else {
        buffer.push(format.tag_bits() | 0b0000_1111);
        push_integer(buffer, count as i64);
    }
}

/// Emits a complete integer object in the narrowest of the supported widths.
/// Negative values always occupy the full signed 64-bit representation.
fn push_integer(buffer: &mut Vec<u8>, value: i64) {
    if value < 0 {
        buffer.push(ObjectFormat::SInt64.tag_bits());
        push_be(buffer, value as u64, 8);
        return;
    }
    let width = minimum_width(value as u64);
    let format = match width {
        1 => ObjectFormat::UInt8,
        2 => ObjectFormat::UInt16,
        4 => ObjectFormat::UInt32,
        _ => ObjectFormat::SInt64,
    };
    buffer.push(format.tag_bits());
    push_be(buffer, value as u64, width);
}

/// Emits a complete string object: ASCII where the contents permit, UTF-16
/// big-endian otherwise.
fn push_string(buffer: &mut Vec<u8>, value: &str) {
    if value.is_ascii() {
        push_marker_with_count(buffer, ObjectFormat::AsciiString, value.len());
        buffer.extend_from_slice(value.as_bytes());
    } else {
        let code_units = value.encode_utf16().collect::<Vec<u16>>();
        push_marker_with_count(buffer, ObjectFormat::Utf16String, code_units.len());
        for code_unit in code_units {
            push_be(buffer, code_unit as u64, 2);
        }
    }
}

/// Emits the complete wire representation of a single object into the object
/// table buffer. Container entries are written as object references.
fn write_object(
    buffer: &mut Vec<u8>,
    value: Raw,
    identifiers: &HashMap<Raw, usize>,
    object_reference_size: usize,
) -> Result<()> {
    let reference_of = |value: Raw| -> Result<usize> {
        identifiers
            .get(&value)
            .copied()
            .ok_or(Error::NullReference("object identifier"))
    };

    match engine::type_of(value) {
        TypeTag::Boolean => {
            buffer.push(ObjectFormat::Boolean.tag_bits() | engine::boolean_value(value) as u8);
        }
        TypeTag::Integer => {
            push_integer(buffer, engine::integer_value(value));
        }
        TypeTag::Real => {
            buffer.push(ObjectFormat::Float64.tag_bits());
            push_be(buffer, engine::real_value(value).to_bits(), 8);
        }
        TypeTag::String => {
            push_string(buffer, &engine::string_value(value));
        }
        TypeTag::Data => {
            let contents = engine::data_value(value);
            push_marker_with_count(buffer, ObjectFormat::Data, contents.len());
            buffer.extend_from_slice(&contents);
        }
        TypeTag::Array => {
            let length = engine::array_len(value);
            push_marker_with_count(buffer, ObjectFormat::Array, length);
            for index in 0 .. length {
                let element = engine::array_get(value, index)
                    .ok_or(Error::NullReference("array element"))?;
                push_be(buffer, reference_of(element)? as u64, object_reference_size);
            }
        }
        TypeTag::Dictionary => {
            let pairs = engine::dictionary_pairs(value);
            push_marker_with_count(buffer, ObjectFormat::Dictionary, pairs.len());
            for &(key, _) in &pairs {
                push_be(buffer, reference_of(key)? as u64, object_reference_size);
            }
            for &(_, entry_value) in &pairs {
                push_be(buffer, reference_of(entry_value)? as u64, object_reference_size);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::codec::binary::reader;
    use crate::convert::{decode_value, encode_value, EncodeContext};
    use crate::value::Value;

    use super::serialize;

    fn round_trip(value: &Value) -> Value {
        let mut context = EncodeContext::new();
        let native = encode_value(&mut context, value).unwrap();
        let bytes = serialize(native.get().unwrap()).unwrap();
        let back = reader::parse(&bytes).unwrap();
        decode_value(back.get().unwrap()).unwrap()
    }

    #[test]
    fn test_starts_with_magic_number_and_version() {
        let mut context = EncodeContext::new();
        let native = encode_value(&mut context, &Value::Dictionary(BTreeMap::new())).unwrap();
        let bytes = serialize(native.get().unwrap()).unwrap();
        assert_eq!(&bytes[0 .. 8], b"bplist00");
    }

    #[test]
    fn test_scalars_survive_the_wire() {
        for value in [
            Value::Boolean(true),
            Value::Boolean(false),
            Value::Integer(0),
            Value::Integer(255),
            Value::Integer(256),
            Value::Integer(1i64 << 40),
            Value::Integer(-42),
            Value::Integer(i64::min_value()),
            Value::from(0.0),
            Value::from(-2.5),
            Value::from("ascii only"),
            Value::from("üñïçôdé"),
            Value::String(String::new()),
        ]
        .iter()
        {
            assert_eq!(&round_trip(value), value);
        }
    }

    #[test]
    fn test_nested_containers_survive_the_wire() {
        let mut inner = BTreeMap::new();
        inner.insert(String::from("depth"), Value::Integer(2));
        let mut entries = BTreeMap::new();
        entries.insert(
            String::from("values"),
            Value::Array(vec![Value::Boolean(false), Value::from(1.25), Value::from("x")]),
        );
        entries.insert(String::from("inner"), Value::Dictionary(inner));
        let value = Value::Dictionary(entries);
        assert_eq!(round_trip(&value), value);
    }

    #[test]
    fn test_long_array_uses_extended_count() {
        // 20 elements exceed the 4-bit inline count.
        let value = Value::Array((0 .. 20).map(Value::Integer).collect());
        assert_eq!(round_trip(&value), value);
    }

    #[test]
    fn test_booleans_are_emitted_once() {
        let value = Value::Array(vec![Value::Boolean(true); 10]);
        let mut context = EncodeContext::new();
        let native = encode_value(&mut context, &value).unwrap();
        let bytes = serialize(native.get().unwrap()).unwrap();

        // One array object, one boolean object.
        let trailer = &bytes[bytes.len() - 32 ..];
        let number_of_objects = u64::from_be_bytes([
            trailer[8], trailer[9], trailer[10], trailer[11],
            trailer[12], trailer[13], trailer[14], trailer[15],
        ]);
        assert_eq!(number_of_objects, 2);

        assert_eq!(round_trip(&value), value);
    }
}
