//
// Copyright 2026 cfplist Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! Parsers for the individual objects within the object table.
//!
//! [`any_marker`] recognizes every format the wire defines, so the reader can
//! classify an object before deciding whether it is representable. Value
//! parsers exist only for the formats the engine models.

use ascii::AsciiStr;
use nom::{
    IResult,
    branch::alt,
    bytes::complete::take,
    combinator::{map, map_res},
    error::ErrorKind,
    multi::many_m_n,
    number::complete::{be_u8, be_u16, be_u32, be_i64, be_f32, be_f64},
};

use std::convert::TryFrom;

use crate::codec::binary::format::ObjectFormat;
use crate::codec::binary::utils::be_usize_n;

/// Every object format, in marker byte order.
const ALL_FORMATS: [ObjectFormat; 15] = [
    ObjectFormat::Boolean,
    ObjectFormat::Fill,
    ObjectFormat::UInt8,
    ObjectFormat::UInt16,
    ObjectFormat::UInt32,
    ObjectFormat::SInt64,
    ObjectFormat::Float32,
    ObjectFormat::Float64,
    ObjectFormat::Date,
    ObjectFormat::Data,
    ObjectFormat::AsciiString,
    ObjectFormat::Utf16String,
    ObjectFormat::Uid,
    ObjectFormat::Array,
    ObjectFormat::Dictionary,
];

/// Returns a parser that consumes one marker byte of the given format and
/// yields the inline value bits the marker carries.
fn marker(
    format: ObjectFormat
) -> impl Fn(&[u8]) -> IResult<&[u8], u8> {
    move |input: &[u8]| {
        let (rest, bytes) = take(1usize)(input)?;
        if bytes[0] & format.tag_mask() != format.tag_bits() {
            return Err(nom::Err::Error((input, ErrorKind::Tag)));
        }
        Ok((rest, bytes[0] & format.value_mask()))
    }
}

/// Parses a marker byte of any defined format, yielding the format and the
/// inline value bits.
pub fn any_marker(input: &[u8]) -> IResult<&[u8], (ObjectFormat, u8)> {
    let (rest, bytes) = take(1usize)(input)?;
    for &format in ALL_FORMATS.iter() {
        if bytes[0] & format.tag_mask() == format.tag_bits() {
            return Ok((rest, (format, bytes[0] & format.value_mask())));
        }
    }
    Err(nom::Err::Error((input, ErrorKind::Alt)))
}

/// Parses a boolean object. The literal lives in the marker itself.
pub fn boolean(input: &[u8]) -> IResult<&[u8], bool> {
    map(
        marker(ObjectFormat::Boolean),
        |bits| bits == 1
    )(input)
}

/// Defines a parser for a fixed-width scalar object: the marker byte followed
/// by the value in network byte order.
macro_rules! fixed_width_object {
    ($(#[$doc:meta])* $name:ident, $format:path, $payload:expr, $type:ty) => {
        $(#[$doc])*
        pub fn $name(input: &[u8]) -> IResult<&[u8], $type> {
            let (input, _) = marker($format)(input)?;
            $payload(input)
        }
    };
}

fixed_width_object![
    /// Parses an unsigned 8-bit integer object.
    uint8, ObjectFormat::UInt8, be_u8, u8
];
fixed_width_object![
    /// Parses an unsigned 16-bit integer object.
    uint16, ObjectFormat::UInt16, be_u16, u16
];
fixed_width_object![
    /// Parses an unsigned 32-bit integer object.
    uint32, ObjectFormat::UInt32, be_u32, u32
];
fixed_width_object![
    /// Parses a signed 64-bit integer object.
    sint64, ObjectFormat::SInt64, be_i64, i64
];
fixed_width_object![
    /// Parses a single-precision floating point object.
    float32, ObjectFormat::Float32, be_f32, f32
];
fixed_width_object![
    /// Parses a double-precision floating point object.
    float64, ObjectFormat::Float64, be_f64, f64
];

/// Returns a parser for the payload length of a variable-length object.
///
/// A length below fifteen is carried in the marker's own value bits and
/// consumes no input. The sentinel value fifteen means the real length
/// follows as a complete integer object of any width.
fn payload_count(
    value_bits: u8,
) -> impl Fn(&[u8]) -> IResult<&[u8], usize> {
    move |input: &[u8]| {
        if value_bits != 0b0000_1111 {
            return Ok((input, value_bits as usize));
        }
        map_res(
            alt((
                map(uint8, u64::from),
                map(uint16, u64::from),
                map(uint32, u64::from),
                map(sint64, |value| value as u64),
            )),
            |value| usize::try_from(value)
        )(input)
    }
}

/// Parses a data object, yielding its payload as a slice of the input.
pub fn data(input: &[u8]) -> IResult<&[u8], &[u8]> {
    let (input, bits) = marker(ObjectFormat::Data)(input)?;
    let (input, length) = payload_count(bits)(input)?;
    take(length)(input)
}

/// Parses an ASCII string object, validating the payload and yielding it as a
/// borrowed slice of the input.
pub fn ascii_string(input: &[u8]) -> IResult<&[u8], &str> {
    let (input, bits) = marker(ObjectFormat::AsciiString)(input)?;
    let (input, length) = payload_count(bits)(input)?;
    map_res(
        take(length),
        |bytes| AsciiStr::from_ascii(bytes).map(AsciiStr::as_str)
    )(input)
}

/// Parses a UTF-16 string object. The payload length counts code units, not
/// bytes, and the result is validated and re-encoded as an owned string.
pub fn utf16_string(input: &[u8]) -> IResult<&[u8], String> {
    let (input, bits) = marker(ObjectFormat::Utf16String)(input)?;
    let (input, count) = payload_count(bits)(input)?;
    map_res(
        many_m_n(count, count, be_u16),
        |units| String::from_utf16(&units)
    )(input)
}

/// Returns a parser for `count` object references of the given width.
fn references(
    count: usize,
    width: usize,
) -> impl Fn(&[u8]) -> IResult<&[u8], Vec<usize>> {
    move |input: &[u8]| {
        many_m_n(count, count, be_usize_n(width))(input)
    }
}

/// Returns a parser for an array object, yielding the references to its
/// elements in order.
pub fn array(
    object_reference_size: usize
) -> impl Fn(&[u8]) -> IResult<&[u8], Vec<usize>> {
    move |input: &[u8]| {
        let (input, bits) = marker(ObjectFormat::Array)(input)?;
        let (input, length) = payload_count(bits)(input)?;
        references(length, object_reference_size)(input)
    }
}

/// Returns a parser for a dictionary object. On the wire all key references
/// precede all value references; the parser pairs them back up, key first.
pub fn dictionary(
    object_reference_size: usize
) -> impl Fn(&[u8]) -> IResult<&[u8], Vec<(usize, usize)>> {
    move |input: &[u8]| {
        let (input, bits) = marker(ObjectFormat::Dictionary)(input)?;
        let (input, count) = payload_count(bits)(input)?;
        let (input, keys) = references(count, object_reference_size)(input)?;
        let (input, values) = references(count, object_reference_size)(input)?;
        Ok((input, keys.into_iter().zip(values).collect()))
    }
}
