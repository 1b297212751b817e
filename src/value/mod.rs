//
// Copyright 2026 cfplist Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # The managed property list object model.
//!
//! A [`Value`] is the caller-side mirror of a native property list value
//! graph. It covers the kinds the document bridge converts in both
//! directions:
//!
//! 1. Boolean.
//! 2. Integers, up to 64 bits long.
//! 3. Real, double-precision.
//! 4. String.
//! 5. Array.
//! 6. Dictionary, keyed by strings.
//!
//! Dictionaries are backed by a `BTreeMap`, so a decoded value graph has a
//! deterministic, lexicographic key order regardless of the order in which
//! entries were stored natively or encountered during parsing.

use std::collections::BTreeMap;

mod de;
mod ser;

/// Represents any value the document bridge can encode or decode.
///
/// Unlike normal `f64` values, `Real` values have a defined order,
/// implementing `Ord`, `Eq` and `Hash` in addition to `PartialOrd` and
/// `PartialEq`. This allows whole value graphs to be compared and used as
/// map keys.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Value {
    /// A boolean, like `NSNumber`.
    Boolean(bool),

    /// An integral value of up to 64 bits, like `NSNumber`.
    Integer(i64),

    /// A double-precision floating point value, like `NSNumber`.
    Real(ordered_float::OrderedFloat<f64>),

    /// A string, like `NSString`.
    String(String),

    /// An ordered array of values, like `NSArray<id>`.
    Array(Vec<Value>),

    /// A string-keyed dictionary, like `NSDictionary<NSString*,id>`.
    Dictionary(BTreeMap<String, Value>),
}

impl From<bool> for Value {
    fn from(value: bool) -> Value {
        Value::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Value {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Value {
        Value::Real(ordered_float::OrderedFloat(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Value {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Value {
        Value::String(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Value {
        Value::Array(value)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(value: BTreeMap<String, Value>) -> Value {
        Value::Dictionary(value)
    }
}
