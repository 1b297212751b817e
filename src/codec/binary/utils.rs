//
// Copyright 2026 cfplist Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! Variable-width big-endian numbers.
//!
//! Offsets, object references and extended payload counts are all stored in
//! the document at the narrowest width that fits their largest value, so both
//! codec directions deal in numbers of a width only known at runtime.

use nom::{
    IResult,
    combinator::map_res,
    bytes::complete::take,
};

use std::convert::TryFrom;

/// Returns a parser for an unsigned big-endian number occupying exactly
/// `width` bytes, between 1 and 8 inclusive.
pub fn be_u64_n(
    width: usize
) -> impl Fn(&[u8]) -> IResult<&[u8], u64> {
    assert!(width >= 1 && width <= 8, "width must be between 1 and 8 bytes, inclusive");
    move |input: &[u8]| {
        let (input, bytes) = take(width)(input)?;
        let mut padded = [0u8; 8];
        padded[8 - width ..].copy_from_slice(bytes);
        Ok((input, u64::from_be_bytes(padded)))
    }
}

/// Returns a parser like [`be_u64_n`] whose result is checked into a `usize`
/// before being returned, since the parsed value is used for indexing and may
/// exceed the word size on 32-bit platforms.
pub fn be_usize_n(
    width: usize
) -> impl Fn(&[u8]) -> IResult<&[u8], usize> {
    move |input: &[u8]| {
        map_res(
            be_u64_n(width),
            |value| usize::try_from(value)
        )(input)
    }
}

/// Returns the narrowest of the widths the format supports (1, 2, 4 or 8
/// bytes) that can hold the value.
pub fn minimum_width(value: u64) -> usize {
    match value {
        0 ..= 0xFF => 1,
        0x100 ..= 0xFFFF => 2,
        0x1_0000 ..= 0xFFFF_FFFF => 4,
        _ => 8,
    }
}

/// Appends the low-order `width` bytes of the value in big-endian order.
pub fn push_be(buffer: &mut Vec<u8>, value: u64, width: usize) {
    assert!(width >= 1 && width <= 8, "width must be between 1 and 8 bytes, inclusive");
    buffer.extend_from_slice(&value.to_be_bytes()[8 - width ..]);
}

#[cfg(test)]
mod tests {
    use super::{be_u64_n, be_usize_n, minimum_width, push_be};

    #[test]
    fn test_be_u64_n_widths() {
        assert_eq!(be_u64_n(1)(&[0xA5]), Ok((&[][..], 0xA5)));
        assert_eq!(be_u64_n(2)(&[0x01, 0x02, 0x03]), Ok((&[0x03][..], 0x0102)));
        assert_eq!(
            be_u64_n(8)(&[0x80, 0, 0, 0, 0, 0, 0, 0x01]),
            Ok((&[][..], 0x8000_0000_0000_0001)),
        );
    }

    #[test]
    fn test_be_u64_n_requires_enough_input() {
        assert!(be_u64_n(4)(&[0x01, 0x02]).is_err());
    }

    #[test]
    fn test_be_usize_n() {
        assert_eq!(be_usize_n(3)(&[0x00, 0x02, 0x01]), Ok((&[][..], 513)));
    }

    #[test]
    fn test_minimum_width_boundaries() {
        assert_eq!(minimum_width(0), 1);
        assert_eq!(minimum_width(0xFF), 1);
        assert_eq!(minimum_width(0x100), 2);
        assert_eq!(minimum_width(0xFFFF), 2);
        assert_eq!(minimum_width(0x1_0000), 4);
        assert_eq!(minimum_width(0xFFFF_FFFF), 4);
        assert_eq!(minimum_width(0x1_0000_0000), 8);
        assert_eq!(minimum_width(u64::max_value()), 8);
    }

    #[test]
    fn test_push_be_round_trips() {
        for &value in &[0u64, 0xA5, 0x0102, 0xFFFF_FFFF, 0x8000_0000_0000_0001] {
            let width = minimum_width(value);
            let mut buffer = Vec::new();
            push_be(&mut buffer, value, width);
            assert_eq!(buffer.len(), width);
            assert_eq!(be_u64_n(width)(&buffer), Ok((&buffer[width ..], value)));
        }
    }
}
