//
// Copyright 2026 cfplist Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! Property list codecs and format detection.
//!
//! Both wire formats produce and consume the same native value graphs. The
//! format of an input document is detected from its leading bytes: a binary
//! property list always opens with the bplist magic number, and anything
//! else is handed to the XML codec.

pub mod binary;
pub mod xml;

use log::debug;

use crate::engine::Raw;
use crate::engine::handle::ScopedRef;
use crate::error::Result;

/// The wire format of a property list document.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum Format {
    /// PropertyList-1.0 XML.
    Xml,
    /// bplist00 binary.
    Binary,
}

/// Parses a property list document in either wire format, returning an owned
/// reference to the root of the native value graph together with the format
/// the document was detected to be in.
pub fn parse(input: &[u8]) -> Result<(ScopedRef, Format)> {
    if input.starts_with(binary::format::HEADER_MAGIC_NUMBER) {
        let root = binary::reader::parse(input)?;
        debug!("parsed {} byte binary property list", input.len());
        Ok((root, Format::Binary))
    } else {
        let root = xml::reader::parse(input)?;
        debug!("parsed {} byte XML property list", input.len());
        Ok((root, Format::Xml))
    }
}

/// Serializes a native value graph into a complete document in the requested
/// wire format. The reference passed in is borrowed, not consumed.
pub fn serialize(root: Raw, format: Format) -> Result<Vec<u8>> {
    let output = match format {
        Format::Xml => xml::writer::serialize(root)?,
        Format::Binary => binary::writer::serialize(root)?,
    };
    debug!("serialized {} byte {:?} property list", output.len(), format);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use crate::engine::{self, Raw, TypeTag};
    use crate::engine::handle::ScopedRef;
    use crate::error::Error;

    use super::{parse, serialize, Format};

    fn sample_dictionary() -> ScopedRef {
        let dictionary: ScopedRef = ScopedRef::owned(engine::dictionary_create(1));
        let raw = dictionary.get().unwrap();
        let key: ScopedRef = ScopedRef::owned(engine::string_create("k"));
        let value: ScopedRef = ScopedRef::owned(engine::integer_create(7));
        engine::dictionary_set(raw, key.get().unwrap(), value.get().unwrap());
        dictionary
    }

    fn assert_sample(raw: Raw) {
        assert_eq!(engine::type_of(raw), TypeTag::Dictionary);
        assert_eq!(engine::dictionary_len(raw), 1);
        let entry = engine::dictionary_get(raw, "k").unwrap();
        assert_eq!(engine::integer_value(entry), 7);
    }

    #[test]
    fn test_detects_binary_format() {
        let sample = sample_dictionary();
        let bytes = serialize(sample.get().unwrap(), Format::Binary).unwrap();
        let (root, format) = parse(&bytes).unwrap();
        assert_eq!(format, Format::Binary);
        assert_sample(root.get().unwrap());
    }

    #[test]
    fn test_detects_xml_format() {
        let input = b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
            <plist version=\"1.0\"><dict/></plist>";
        let (root, format) = parse(input).unwrap();
        assert_eq!(format, Format::Xml);
        assert_eq!(engine::type_of(root.get().unwrap()), TypeTag::Dictionary);
    }

    #[test]
    fn test_garbage_is_rejected_by_the_xml_codec() {
        assert!(matches!(parse(b"\x00\x01\x02\x03"), Err(Error::InvalidXml(_))));
    }

    #[test]
    fn test_serialized_output_parses_in_both_formats() {
        let sample = sample_dictionary();
        let raw = sample.get().unwrap();
        for &format in &[Format::Xml, Format::Binary] {
            let bytes = serialize(raw, format).unwrap();
            let (back, detected) = parse(&bytes).unwrap();
            assert_eq!(detected, format);
            assert_sample(back.get().unwrap());
        }
    }
}
