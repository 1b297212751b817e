//
// Copyright 2026 cfplist Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

use std::fmt::{self, Display};

use serde::{de, ser};

pub type Result<T> = std::result::Result<T, Error>;

/// Property list conversion, parsing and serialization error.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// Constructed from serialization and deserialization errors.
    Message(String),
    /// A decoded native value has no counterpart in the managed object model.
    UnsupportedType(&'static str),
    /// A dictionary key is not a string and cannot be decoded.
    UnsupportedKeyType,
    /// A required native reference was unexpectedly absent.
    NullReference(&'static str),
    /// The root of a parsed document is not a dictionary.
    NonDictionaryRoot,
    /// The serialization format selector is not one of the supported values.
    InvalidFormatSelector(u32),
    /// The value graph nests deeper than the conversion engine permits.
    NestingTooDeep,
    /// Binary property lists are directed acyclic graphs and objects cannot reference each other.
    CycleDetected,
    /// The input ended before a complete document could be read.
    Eof,
    /// The bplist magic number or version marker could not be read.
    MissingOrInvalidHeader,
    /// The offset table is absent, truncated, or overlaps the trailer.
    MissingOrInvalidOffsetTable,
    /// The trailer could not be read from the end of the input.
    MissingOrInvalidTrailer,
    /// The header names a bplist version this library does not read.
    UnsupportedVersion,
    /// A container references an object identifier with no offset table entry.
    InvalidObjectReference,
    /// An offset table entry points outside the object table.
    InvalidOffsetToObject,
    /// A marker byte matches none of the defined object formats.
    InvalidOrUnsupportedObjectFormat,
    /// The trailer names a root object that does not exist.
    InvalidRootObject,
    /// The input contains a well-formed object of a kind the engine does not model.
    UnsupportedObjectType(&'static str),
    /// An object classified as a boolean failed to parse as one.
    ExpectedBool,
    /// An object classified as an integer failed to parse as one.
    ExpectedInteger,
    /// An object classified as a floating point value failed to parse as one.
    ExpectedReal,
    /// An object classified as data failed to parse as such.
    ExpectedData,
    /// An object classified as an ASCII string failed to parse as one.
    ExpectedAsciiString,
    /// An object classified as a UTF-16 string failed to parse as one.
    ExpectedUtf16String,
    /// An object classified as an array failed to parse as one.
    ExpectedArray,
    /// An object classified as a dictionary failed to parse as one.
    ExpectedDictionary,
    /// The input is not a well-formed PropertyList-1.0 XML document.
    InvalidXml(String),
}

impl ser::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl de::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl Display for Error {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Message(msg) =>
                formatter.write_str(msg),
            Error::UnsupportedType(kind) =>
                write!(formatter, "unsupported native value type: {}", kind),
            Error::UnsupportedKeyType =>
                formatter.write_str("dictionary key is not a string"),
            Error::NullReference(what) =>
                write!(formatter, "required reference is absent: {}", what),
            Error::NonDictionaryRoot =>
                formatter.write_str("property list content is not a dictionary"),
            Error::InvalidFormatSelector(selector) =>
                write!(formatter, "invalid property list format selector: {}", selector),
            Error::NestingTooDeep =>
                formatter.write_str("value graph exceeds the supported nesting depth"),
            Error::CycleDetected =>
                formatter.write_str("cycle detected"),
            Error::Eof =>
                formatter.write_str("unexpected end of input"),
            Error::MissingOrInvalidHeader =>
                formatter.write_str("missing or invalid bplist header"),
            Error::MissingOrInvalidOffsetTable =>
                formatter.write_str("missing or invalid bplist offset table"),
            Error::MissingOrInvalidTrailer =>
                formatter.write_str("missing or invalid bplist trailer"),
            Error::UnsupportedVersion =>
                formatter.write_str("unsupported bplist version"),
            Error::InvalidObjectReference =>
                formatter.write_str("reference to an object not in the offset table"),
            Error::InvalidOffsetToObject =>
                formatter.write_str("offset points outside the object table"),
            Error::InvalidOrUnsupportedObjectFormat =>
                formatter.write_str("marker byte matches no defined object format"),
            Error::InvalidRootObject =>
                formatter.write_str("trailer names a root object that does not exist"),
            Error::UnsupportedObjectType(kind) =>
                write!(formatter, "unsupported property list object type: {}", kind),
            Error::ExpectedBool =>
                formatter.write_str("expected boolean"),
            Error::ExpectedInteger =>
                formatter.write_str("expected integer"),
            Error::ExpectedReal =>
                formatter.write_str("expected floating point value"),
            Error::ExpectedData =>
                formatter.write_str("expected data"),
            Error::ExpectedAsciiString =>
                formatter.write_str("expected ASCII string"),
            Error::ExpectedUtf16String =>
                formatter.write_str("expected UTF-16 string"),
            Error::ExpectedArray =>
                formatter.write_str("expected array of object references"),
            Error::ExpectedDictionary =>
                formatter.write_str("expected dictionary"),
            Error::InvalidXml(msg) =>
                write!(formatter, "invalid property list XML: {}", msg),
        }
    }
}

impl std::error::Error for Error {}
