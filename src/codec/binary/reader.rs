//
// Copyright 2026 cfplist Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! Parsing of a binary property list document into a native value graph.
//!
//! The reader walks the object table starting from the root object named in
//! the trailer and allocates an owned native value for every reachable
//! object. References are validated against the offset table, container
//! recursion is depth-capped, and reference cycles are rejected. Any failure
//! unwinds the walk and the scoped handles release everything allocated so
//! far.

use std::collections::BTreeSet;

use crate::codec::binary::format::{
    HEADER_SIZE,
    HEADER_VERSION_00,
    TRAILER_SIZE,
    ObjectFormat,
    OffsetTable,
};
use crate::codec::binary::{objects, structure};
use crate::convert::MAX_DEPTH;
use crate::engine;
use crate::engine::handle::ScopedRef;
use crate::error::{Error, Result};

/// Everything the structural segments say about how to locate objects.
#[derive(Clone, Eq, PartialEq, Debug)]
struct Metadata {
    offset_table: OffsetTable,
    /// Width in bytes of an object reference inside a container.
    object_reference_size: usize,
    /// Identifier of the object the walk starts from.
    root_object: usize,
    /// The byte range of the input within which objects may reside.
    object_table_range: std::ops::Range<usize>,
}

impl Metadata {
    /// Looks up the byte offset of an object, validating the identifier.
    fn offset_of(&self, object: usize) -> Result<usize> {
        if object >= self.offset_table.len() {
            Err(Error::InvalidObjectReference)
        } else {
            Ok(self.offset_table[object])
        }
    }
}

/// Parses the structural segments needed to interpret the object table.
///
/// The shortest well-formed document is the header, a single one-byte object
/// such as an empty array, its one-byte offset table entry, and the trailer;
/// anything shorter is rejected before the segments are examined.
fn parse_metadata(input: &[u8]) -> Result<Metadata> {
    if input.len() < HEADER_SIZE + 2 + TRAILER_SIZE {
        return Err(Error::Eof);
    }

    // The magic number and version marker come first.
    let header_slice = &input[0 .. HEADER_SIZE];
    let (_, header) = structure::header(header_slice).map_err(|_| {
        Error::MissingOrInvalidHeader
    })?;
    if header.version != HEADER_VERSION_00 {
        return Err(Error::UnsupportedVersion);
    }

    // The trailer at the end of the input locates everything else.
    let trailer_slice = &input[input.len() - TRAILER_SIZE .. ];
    let (_, trailer) = structure::trailer(trailer_slice).map_err(|_| {
        Error::MissingOrInvalidTrailer
    })?;
    if trailer.root_object >= trailer.number_of_objects {
        return Err(Error::InvalidRootObject);
    }

    // The offset table must fit between its declared start and the trailer.
    // All three fields come straight off the wire, so the arithmetic is
    // checked rather than trusted.
    let offset_table_start = trailer.offset_table_offset;
    let offset_table_end = trailer
        .number_of_objects
        .checked_mul(trailer.offset_table_entry_size)
        .and_then(|length| offset_table_start.checked_add(length))
        .ok_or(Error::MissingOrInvalidOffsetTable)?;
    if offset_table_end > (input.len() - TRAILER_SIZE) {
        return Err(Error::MissingOrInvalidOffsetTable);
    }

    let offset_table_slice = &input[offset_table_start .. offset_table_end];
    let (_, offset_table) = structure::offset_table(
        trailer.number_of_objects,
        trailer.offset_table_entry_size
    )(offset_table_slice).map_err(|_| {
        Error::MissingOrInvalidOffsetTable
    })?;

    Ok(Metadata {
        offset_table,
        object_reference_size: trailer.object_reference_size,
        root_object: trailer.root_object,
        object_table_range: (HEADER_SIZE .. offset_table_start)
    })
}

/// Addresses objects in the object table by identifier.
#[derive(Debug)]
struct ObjectTable<'a> {
    input: &'a [u8],
    metadata: Metadata,
}

/// Defines a typed object accessor in terms of the corresponding parser.
macro_rules! define_parser {
    ($name:ident, $parser:expr, $type:ty, $expected_error:path) => {
        fn $name(&self, object: usize) -> Result<$type> {
            let data = self.data_for(object)?;
            $parser(data)
                .map(|(_, value)| value)
                .map_err(|_| $expected_error)
        }
    };
}

impl<'a> ObjectTable<'a> {

    /// Returns the input from the start of the object onward. The offset is
    /// validated to land inside the object table; the object parsers bound
    /// how much of the tail they consume.
    fn data_for(&self, object: usize) -> Result<&[u8]> {
        let offset = self.metadata.offset_of(object)?;
        if !self.metadata.object_table_range.contains(&offset) {
            return Err(Error::InvalidOffsetToObject);
        }
        Ok(&self.input[offset .. ])
    }

    /// Parses the marker byte for the specified object and returns the format.
    fn kind_of(&self, object: usize) -> Result<ObjectFormat> {
        let data = self.data_for(object)?;
        objects::any_marker(data)
            .map(|(_, (format, _))| format)
            .map_err(|_| Error::InvalidOrUnsupportedObjectFormat)
    }

    define_parser![
        parse_boolean,
        objects::boolean,
        bool,
        Error::ExpectedBool
    ];
    define_parser![
        parse_uint8,
        objects::uint8,
        u8,
        Error::ExpectedInteger
    ];
    define_parser![
        parse_uint16,
        objects::uint16,
        u16,
        Error::ExpectedInteger
    ];
    define_parser![
        parse_uint32,
        objects::uint32,
        u32,
        Error::ExpectedInteger
    ];
    define_parser![
        parse_sint64,
        objects::sint64,
        i64,
        Error::ExpectedInteger
    ];
    define_parser![
        parse_float32,
        objects::float32,
        f32,
        Error::ExpectedReal
    ];
    define_parser![
        parse_float64,
        objects::float64,
        f64,
        Error::ExpectedReal
    ];
    define_parser![
        parse_data,
        objects::data,
        &[u8],
        Error::ExpectedData
    ];
    define_parser![
        parse_ascii_string,
        objects::ascii_string,
        &str,
        Error::ExpectedAsciiString
    ];
    define_parser![
        parse_utf16_string,
        objects::utf16_string,
        String,
        Error::ExpectedUtf16String
    ];

    /// Parses an array of objects whose reference size is determined in metadata.
    fn parse_array(&self, object: usize) -> Result<Vec<usize>> {
        let data = self.data_for(object)?;
        objects::array(self.metadata.object_reference_size)(data)
            .map(|(_, objects)| objects)
            .map_err(|_| Error::ExpectedArray)
    }

    /// Parses a dictionary of objects whose reference size is determined in metadata.
    fn parse_dictionary(&self, object: usize) -> Result<Vec<(usize, usize)>> {
        let data = self.data_for(object)?;
        objects::dictionary(self.metadata.object_reference_size)(data)
            .map(|(_, pairs)| pairs)
            .map_err(|_| Error::ExpectedDictionary)
    }

}

/// Builds native values from the objects in the object table.
struct Builder<'a> {
    object_table: ObjectTable<'a>,
    /// Ordered set of the collections being processed to detect cycles.
    collection_stack: BTreeSet<usize>,
}

impl<'a> Builder<'a> {

    /// Pushes a container onto the stack of containers currently being built.
    /// A container already on the stack is referencing itself, directly or
    /// through a descendant.
    #[must_use = "the result must be checked to avoid creating a cycle"]
    fn enter_collection(&mut self, object: usize) -> Result<()> {
        if self.collection_stack.insert(object) {
            Ok(())
        } else {
            Err(Error::CycleDetected)
        }
    }

    /// Pops the specified collection from the stack.
    fn exit_collection(&mut self, object: usize) {
        let was_present = self.collection_stack.remove(&object);
        assert!(was_present, "unbalanced calls in object stack tracking");
    }

    /// Builds an owned native value for the specified object and, recursively,
    /// every object reachable from it.
    fn build(&mut self, object: usize, depth: usize) -> Result<ScopedRef> {
        if depth == MAX_DEPTH {
            return Err(Error::NestingTooDeep);
        }

        let format = self.object_table.kind_of(object)?;
        match format {

            // The two boolean literals map onto the shared singletons.
            ObjectFormat::Boolean => {
                let value = self.object_table.parse_boolean(object)?;
                Ok(ScopedRef::shared(engine::boolean(value)))
            }

            // All integer widths collapse into the signed 64-bit native kind.
            ObjectFormat::UInt8 => {
                let value = self.object_table.parse_uint8(object)?;
                Ok(ScopedRef::owned(engine::integer_create(value as i64)))
            }
            ObjectFormat::UInt16 => {
                let value = self.object_table.parse_uint16(object)?;
                Ok(ScopedRef::owned(engine::integer_create(value as i64)))
            }
            ObjectFormat::UInt32 => {
                let value = self.object_table.parse_uint32(object)?;
                Ok(ScopedRef::owned(engine::integer_create(value as i64)))
            }
            ObjectFormat::SInt64 => {
                let value = self.object_table.parse_sint64(object)?;
                Ok(ScopedRef::owned(engine::integer_create(value)))
            }

            // Both float widths collapse into the double-precision native kind.
            ObjectFormat::Float32 => {
                let value = self.object_table.parse_float32(object)?;
                Ok(ScopedRef::owned(engine::real_create(value as f64)))
            }
            ObjectFormat::Float64 => {
                let value = self.object_table.parse_float64(object)?;
                Ok(ScopedRef::owned(engine::real_create(value)))
            }

            ObjectFormat::AsciiString => {
                let value = self.object_table.parse_ascii_string(object)?;
                Ok(ScopedRef::owned(engine::string_create(value)))
            }
            ObjectFormat::Utf16String => {
                let value = self.object_table.parse_utf16_string(object)?;
                Ok(ScopedRef::owned(engine::string_create(&value)))
            }

            ObjectFormat::Data => {
                let value = self.object_table.parse_data(object)?;
                Ok(ScopedRef::owned(engine::data_create(Vec::from(value))))
            }

            // Well-formed object kinds the engine does not model.
            ObjectFormat::Fill =>
                Err(Error::UnsupportedObjectType("fill")),
            ObjectFormat::Date =>
                Err(Error::UnsupportedObjectType("date")),
            ObjectFormat::Uid =>
                Err(Error::UnsupportedObjectType("uid")),

            ObjectFormat::Array => {
                let references = self.object_table.parse_array(object)?;
                self.enter_collection(object)?;
                let result = self.build_array(&references, depth);
                self.exit_collection(object);
                result
            }

            ObjectFormat::Dictionary => {
                let pairs = self.object_table.parse_dictionary(object)?;
                self.enter_collection(object)?;
                let result = self.build_dictionary(&pairs, depth);
                self.exit_collection(object);
                result
            }
        }
    }

    fn build_array(&mut self, references: &[usize], depth: usize) -> Result<ScopedRef> {
        let raw = engine::array_create(references.len());
        let array = ScopedRef::owned(raw);
        for &reference in references {
            let element = self.build(reference, depth + 1)?;
            let element_raw = element
                .get()
                .ok_or(Error::NullReference("parsed array element"))?;
            engine::array_push(raw, element_raw);
        }
        Ok(array)
    }

    fn build_dictionary(&mut self, pairs: &[(usize, usize)], depth: usize) -> Result<ScopedRef> {
        let raw = engine::dictionary_create(pairs.len());
        let dictionary = ScopedRef::owned(raw);
        for &(key, value) in pairs {
            // Keys are stored as arbitrary objects on the wire. A non-string
            // key is preserved here and faults later, if and when the entry
            // is decoded into the managed object model.
            let native_key = self.build(key, depth + 1)?;
            let native_value = self.build(value, depth + 1)?;
            let key_raw = native_key
                .get()
                .ok_or(Error::NullReference("parsed dictionary key"))?;
            let value_raw = native_value
                .get()
                .ok_or(Error::NullReference("parsed dictionary value"))?;
            engine::dictionary_set(raw, key_raw, value_raw);
        }
        Ok(dictionary)
    }

}

/// Parses a complete binary property list document and returns an owned
/// reference to the root of the reconstructed native value graph.
pub fn parse(input: &[u8]) -> Result<ScopedRef> {
    let metadata = parse_metadata(input)?;
    let root_object = metadata.root_object;
    let mut builder = Builder {
        object_table: ObjectTable { input, metadata },
        collection_stack: BTreeSet::new(),
    };
    builder.build(root_object, 0)
}

#[cfg(test)]
mod tests {
    use crate::engine::{self, TypeTag};
    use crate::error::Error;

    use super::parse;

    /// Assembles a complete document around the supplied object table bytes
    /// with single-byte offsets and references.
    fn document(object_table: &[u8], offsets: &[u8], root_object: u8) -> Vec<u8> {
        let mut input = Vec::new();
        input.extend_from_slice(b"bplist00");
        input.extend_from_slice(object_table);
        let offset_table_offset = input.len();
        input.extend_from_slice(offsets);
        input.extend_from_slice(&[0, 0, 0, 0, 0]);
        input.push(0);
        input.push(1);
        input.push(1);
        input.extend_from_slice(&(offsets.len() as u64).to_be_bytes());
        input.extend_from_slice(&(root_object as u64).to_be_bytes());
        input.extend_from_slice(&(offset_table_offset as u64).to_be_bytes());
        input
    }

    #[test]
    fn test_parse_single_entry_dictionary() {
        let input = document(
            &[
                // Dictionary(1 entry): key = object 1, value = object 2.
                0xD1, 0x01, 0x02,
                // AsciiString("a").
                0x51, 0x61,
                // Boolean(true).
                0x09,
            ],
            &[0x08, 0x0B, 0x0D],
            0,
        );

        let root = parse(&input).unwrap();
        let raw = root.get().unwrap();
        assert_eq!(engine::type_of(raw), TypeTag::Dictionary);
        assert_eq!(engine::dictionary_len(raw), 1);

        let value = engine::dictionary_get(raw, "a").unwrap();
        assert_eq!(engine::type_of(value), TypeTag::Boolean);
        assert_eq!(engine::boolean_value(value), true);
        assert_eq!(value, engine::boolean(true));
    }

    #[test]
    fn test_parse_integer_widths_collapse() {
        let input = document(
            &[
                // Array(3): UInt8(5), UInt16(256), SInt64(-1).
                0xA3, 0x01, 0x02, 0x03,
                0x10, 0x05,
                0x11, 0x01, 0x00,
                0x13, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
            ],
            &[0x08, 0x0C, 0x0E, 0x11],
            0,
        );

        let root = parse(&input).unwrap();
        let raw = root.get().unwrap();
        assert_eq!(engine::array_len(raw), 3);
        for (index, expected) in [5i64, 256, -1].iter().enumerate() {
            let element = engine::array_get(raw, index).unwrap();
            assert_eq!(engine::type_of(element), TypeTag::Integer);
            assert_eq!(engine::integer_value(element), *expected);
        }
    }

    #[test]
    fn test_parse_rejects_self_referential_array() {
        let input = document(
            &[
                // Array(1) whose only element is the array itself.
                0xA1, 0x00,
            ],
            &[0x08],
            0,
        );
        assert!(matches!(parse(&input), Err(Error::CycleDetected)));
    }

    #[test]
    fn test_parse_rejects_date_object() {
        let input = document(
            &[
                // Date(CFAbsoluteTime = 0).
                0x33, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            ],
            &[0x08],
            0,
        );
        assert!(matches!(parse(&input), Err(Error::UnsupportedObjectType("date"))));
    }

    #[test]
    fn test_parse_rejects_out_of_range_root() {
        let input = document(&[0xA0], &[0x08], 7);
        assert!(matches!(parse(&input), Err(Error::InvalidRootObject)));
    }

    #[test]
    fn test_parse_rejects_truncated_input() {
        assert!(matches!(parse(b"bplist00"), Err(Error::Eof)));
    }

    #[test]
    fn test_parse_failure_releases_partial_graph() {
        engine::boolean(true);
        let before = engine::live_value_count();
        let input = document(
            &[
                // Array(2): AsciiString("ok"), Fill.
                0xA2, 0x01, 0x02,
                0x52, 0x6F, 0x6B,
                0x0F,
            ],
            &[0x08, 0x0B, 0x0E],
            0,
        );
        assert!(matches!(parse(&input), Err(Error::UnsupportedObjectType("fill"))));
        assert_eq!(engine::live_value_count(), before);
    }
}
