//
// Copyright 2026 cfplist Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # Layout of the bplist00 wire format.
//!
//! A binary property list lays out four segments back to back: an 8-byte
//! header, the object table, the offset table, and a fixed 32-byte trailer.
//! Everything multi-byte is big endian. The reader and the writer share the
//! constants and structures defined here.
//!
//! # References
//!
//! 1. https://opensource.apple.com/source/CF/CF-855.17/CFBinaryPList.c

/// Total size of the header segment in bytes.
pub const HEADER_SIZE: usize = 8;

/// The magic number every binary property list opens with ("bplist").
pub const HEADER_MAGIC_NUMBER: &[u8] = &[0x62, 0x70, 0x6C, 0x69, 0x73, 0x74];

/// The two version bytes this library understands ("00").
pub const HEADER_VERSION_00: (u8, u8) = (0x30, 0x30);

/// The header segment, reduced to the version bytes that follow the magic
/// number.
#[derive(Debug, Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Hash)]
pub struct Header {
    pub version: (u8, u8),
}

/// One entry per object: the byte offset from the start of the document at
/// which the object's marker resides.
pub type OffsetTable = Vec<usize>;

/// Classifies the marker byte that opens every object in the object table.
///
/// The high bits of a marker select the format; the remaining bits, where a
/// format has any, carry a small inline value such as a collection length or
/// the boolean literal itself.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum ObjectFormat {
    /// Boolean literal, value carried in the low bit.
    Boolean,
    /// Padding byte with no value.
    Fill,
    /// Unsigned integer stored in 1 byte.
    UInt8,
    /// Unsigned integer stored in 2 bytes.
    UInt16,
    /// Unsigned integer stored in 4 bytes.
    UInt32,
    /// Signed integer stored in 8 bytes.
    SInt64,
    /// IEEE 754 single-precision value.
    Float32,
    /// IEEE 754 double-precision value.
    Float64,
    /// CFAbsoluteTime stored as a double.
    Date,
    /// Raw bytes with a length.
    Data,
    /// String limited to 7-bit ASCII, one byte per character.
    AsciiString,
    /// String of UTF-16 code units, two bytes each.
    Utf16String,
    /// Keyed-archiver UID.
    Uid,
    /// Ordered list of object references.
    Array,
    /// Paired key and value object references.
    Dictionary,
}

impl ObjectFormat {
    /// The marker bits that select the format; a byte is of this format when
    /// `byte & tag_mask() == tag_bits()`.
    pub fn tag_mask(self) -> u8 {
        use ObjectFormat::*;
        match self {
            Boolean => 0b1111_1110,
            Data | AsciiString | Utf16String | Uid | Array | Dictionary => 0b1111_0000,
            _ => 0b1111_1111,
        }
    }

    /// The marker bits that carry the format's inline value, if any.
    pub fn value_mask(self) -> u8 {
        !self.tag_mask()
    }

    /// The tag bits identifying this format, positioned as they appear in a
    /// marker byte.
    pub fn tag_bits(self) -> u8 {
        use ObjectFormat::*;
        match self {
            Boolean => 0x08,
            Fill => 0x0F,
            UInt8 => 0x10,
            UInt16 => 0x11,
            UInt32 => 0x12,
            SInt64 => 0x13,
            Float32 => 0x22,
            Float64 => 0x23,
            Date => 0x33,
            Data => 0x40,
            AsciiString => 0x50,
            Utf16String => 0x60,
            Uid => 0x80,
            Array => 0xA0,
            Dictionary => 0xD0,
        }
    }
}

/// Total size of the trailer segment in bytes.
pub const TRAILER_SIZE: usize = 32;

/// Unused bytes at the start of the trailer.
pub const TRAILER_PREAMBLE_UNUSED_SIZE: usize = 5;

/// The trailer segment. It carries everything needed to locate and size the
/// variable-width parts of the document, so parsing starts here.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash)]
pub struct Trailer {
    pub sort_version: u8,
    /// Width in bytes of each offset table entry.
    pub offset_table_entry_size: usize,
    /// Width in bytes of each object reference inside a container.
    pub object_reference_size: usize,
    /// Total number of objects in the object table.
    pub number_of_objects: usize,
    /// Identifier of the root object.
    pub root_object: usize,
    /// Byte offset of the start of the offset table.
    pub offset_table_offset: usize,
}

#[cfg(test)]
mod tests {
    use super::ObjectFormat;

    #[test]
    fn test_masks_partition_the_marker_byte() {
        use ObjectFormat::*;
        for &format in &[
            Boolean, Fill, UInt8, UInt16, UInt32, SInt64, Float32, Float64,
            Date, Data, AsciiString, Utf16String, Uid, Array, Dictionary,
        ] {
            assert_eq!(format.tag_mask() | format.value_mask(), 0xFF);
            assert_eq!(format.tag_bits() & format.value_mask(), 0);
        }
    }
}
