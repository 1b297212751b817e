//
// Copyright 2026 cfplist Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! Parsers for the fixed structural segments surrounding the object table:
//! the header, the offset table and the trailer.

use nom::{
    IResult,
    bytes::complete::{take, tag},
    multi::many_m_n,
    number::complete::be_u8,
};

use crate::codec::binary::format::{
    Header,
    OffsetTable,
    Trailer,
    HEADER_MAGIC_NUMBER,
    TRAILER_PREAMBLE_UNUSED_SIZE,
};
use crate::codec::binary::utils::be_usize_n;

/// Parses the header segment, requiring the magic number.
pub fn header(input: &[u8]) -> IResult<&[u8], Header> {
    let (input, _) = tag(HEADER_MAGIC_NUMBER)(input)?;
    let (input, major) = be_u8(input)?;
    let (input, minor) = be_u8(input)?;
    Ok((input, Header { version: (major, minor) }))
}

/// Returns a parser for an offset table of `entries` offsets, each stored at
/// the width the trailer declares.
pub fn offset_table(
    entries: usize,
    entry_size: usize,
) -> impl Fn(&[u8]) -> IResult<&[u8], OffsetTable> {
    move |input: &[u8]| {
        many_m_n(
            entries,
            entries,
            be_usize_n(entry_size)
        )(input)
    }
}

/// Parses the trailer segment.
pub fn trailer(input: &[u8]) -> IResult<&[u8], Trailer> {
    let (input, _) = take(TRAILER_PREAMBLE_UNUSED_SIZE)(input)?;
    let (input, sort_version) = be_u8(input)?;
    let (input, offset_table_entry_size) = be_usize_n(1)(input)?;
    let (input, object_reference_size) = be_usize_n(1)(input)?;
    let (input, number_of_objects) = be_usize_n(8)(input)?;
    let (input, root_object) = be_usize_n(8)(input)?;
    let (input, offset_table_offset) = be_usize_n(8)(input)?;
    Ok((input, Trailer {
        sort_version,
        offset_table_entry_size,
        object_reference_size,
        number_of_objects,
        root_object,
        offset_table_offset,
    }))
}

#[cfg(test)]
mod tests {
    use crate::codec::binary::format::HEADER_VERSION_00;
    use super::{header, offset_table, trailer, Header, Trailer};

    #[test]
    fn test_header_version_00() {
        let (rest, parsed) = header(b"bplist00").unwrap();
        assert!(rest.is_empty());
        assert_eq!(parsed, Header { version: HEADER_VERSION_00 });
    }

    #[test]
    fn test_header_preserves_unknown_versions() {
        let (_, parsed) = header(b"bplist15").unwrap();
        assert_eq!(parsed.version, (0x31, 0x35));
    }

    #[test]
    fn test_header_rejects_wrong_magic() {
        assert!(header(b"xplist00").is_err());
    }

    #[test]
    fn test_offset_table_single_byte_entries() {
        let (rest, parsed) = offset_table(4, 1)(&[0x08, 0x0B, 0x0D, 0x16]).unwrap();
        assert!(rest.is_empty());
        assert_eq!(parsed, vec![8, 11, 13, 22]);
    }

    #[test]
    fn test_offset_table_two_byte_entries() {
        let (rest, parsed) = offset_table(2, 2)(&[0x00, 0x08, 0x01, 0x00]).unwrap();
        assert!(rest.is_empty());
        assert_eq!(parsed, vec![8, 256]);
    }

    #[test]
    fn test_offset_table_rejects_short_input() {
        assert!(offset_table(3, 2)(&[0x00, 0x08, 0x00]).is_err());
    }

    #[test]
    fn test_trailer() {
        let input = &[
            0x00, 0x00, 0x00, 0x00, 0x00, // unused
            0x00,                         // sort version
            0x02,                         // offset entry size
            0x01,                         // reference size
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x20,
        ];
        let (rest, parsed) = trailer(input).unwrap();
        assert!(rest.is_empty());
        assert_eq!(parsed, Trailer {
            sort_version: 0,
            offset_table_entry_size: 2,
            object_reference_size: 1,
            number_of_objects: 3,
            root_object: 1,
            offset_table_offset: 32,
        });
    }
}
