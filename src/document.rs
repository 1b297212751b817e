//
// Copyright 2026 cfplist Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

use std::collections::BTreeMap;

use log::debug;

use crate::codec::{self, Format};
use crate::convert::{decode_value, encode_array, encode_dictionary, encode_value, EncodeContext};
use crate::engine::{self, TypeTag};
use crate::engine::handle::{DictionaryValue, ScopedRef};
use crate::error::{Error, Result};
use crate::value::Value;

/// The output format of a serialized document.
///
/// `SameAsInput` resolves to the format the document was parsed from, or to
/// XML for a document that was never parsed.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum OutputFormat {
    SameAsInput,
    Xml,
    Binary,
}

impl OutputFormat {
    /// Maps an integer format selector onto an output format. The accepted
    /// selectors are 0 (same as input), 1 (XML) and 2 (binary).
    pub fn from_selector(selector: u32) -> Result<OutputFormat> {
        match selector {
            0 => Ok(OutputFormat::SameAsInput),
            1 => Ok(OutputFormat::Xml),
            2 => Ok(OutputFormat::Binary),
            other => Err(Error::InvalidFormatSelector(other)),
        }
    }
}

/// An owning handle on a property list document.
///
/// A document is a native dictionary at the root plus the wire format it was
/// read from. All accessors operate on the root dictionary; values cross the
/// boundary as managed [`Value`]s in both directions. Dropping the document
/// releases the root and, transitively, every native value it retains.
pub struct Document {
    root: ScopedRef<DictionaryValue>,
    format: Format,
}

impl Document {

    /// Creates a document with an empty root dictionary.
    pub fn new() -> Self {
        Document {
            root: ScopedRef::owned(engine::dictionary_create(0)),
            format: Format::Xml,
        }
    }

    /// Parses a document from its serialized form in either wire format.
    ///
    /// The root of a property list handled by this library must be a
    /// dictionary; a well-formed document with any other root is rejected
    /// and the parsed graph is released.
    pub fn from_bytes(input: &[u8]) -> Result<Self> {
        let (parsed, format) = codec::parse(input)?;
        let raw = parsed.get().ok_or(Error::NullReference("document root"))?;
        if engine::type_of(raw) != TypeTag::Dictionary {
            return Err(Error::NonDictionaryRoot);
        }
        let raw = parsed.disown().ok_or(Error::NullReference("document root"))?;
        debug!("opened {:?} document from {} bytes", format, input.len());
        Ok(Document {
            root: ScopedRef::owned(raw),
            format,
        })
    }

    /// Builds a document from an ordered map of managed values.
    pub fn from_dictionary(entries: &BTreeMap<String, Value>) -> Result<Self> {
        Ok(Document {
            root: encode_dictionary(entries)?,
            format: Format::Xml,
        })
    }

    /// The wire format this document was parsed from.
    pub fn format(&self) -> Format {
        self.format
    }

    fn root_raw(&self) -> Result<engine::Raw> {
        self.root.get().ok_or(Error::NullReference("document root"))
    }

    /// Looks up a root entry and decodes it into a managed value. An absent
    /// key is not a fault.
    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        match engine::dictionary_get(self.root_raw()?, key) {
            Some(value) => decode_value(value).map(Some),
            None => Ok(None),
        }
    }

    /// Sets a root entry to a string value.
    pub fn set_string(&mut self, key: &str, value: &str) -> Result<()> {
        let native: ScopedRef = ScopedRef::owned(engine::string_create(value));
        self.set_native(key, native)
    }

    /// Sets a root entry to a boolean value. The entry references one of the
    /// two shared singletons.
    pub fn set_boolean(&mut self, key: &str, value: bool) -> Result<()> {
        self.set_native(key, ScopedRef::shared(engine::boolean(value)))
    }

    /// Sets a root entry to an integer value.
    pub fn set_integer(&mut self, key: &str, value: i64) -> Result<()> {
        let native: ScopedRef = ScopedRef::owned(engine::integer_create(value));
        self.set_native(key, native)
    }

    /// Sets a root entry to a floating point value.
    pub fn set_real(&mut self, key: &str, value: f64) -> Result<()> {
        let native: ScopedRef = ScopedRef::owned(engine::real_create(value));
        self.set_native(key, native)
    }

    /// Sets a root entry to an array of managed values.
    pub fn set_array(&mut self, key: &str, items: &[Value]) -> Result<()> {
        let mut context = EncodeContext::new();
        let native = encode_array(&mut context, items)?;
        self.set_native(key, native.upcast())
    }

    /// Sets a root entry to any managed value through the encode engine.
    /// If encoding fails the document is unchanged.
    pub fn set_value(&mut self, key: &str, value: &Value) -> Result<()> {
        let mut context = EncodeContext::new();
        let native = encode_value(&mut context, value)?;
        self.set_native(key, native)
    }

    fn set_native(&mut self, key: &str, value: ScopedRef) -> Result<()> {
        let root = self.root_raw()?;
        let native_key: ScopedRef = ScopedRef::owned(engine::string_create(key));
        let key_raw = native_key.get().ok_or(Error::NullReference("entry key"))?;
        let value_raw = value.get().ok_or(Error::NullReference("entry value"))?;
        // The dictionary retains both; the scoped handles release their own
        // references on return.
        engine::dictionary_set(root, key_raw, value_raw);
        Ok(())
    }

    /// Serializes the document in the requested output format.
    pub fn to_bytes(&self, output_format: OutputFormat) -> Result<Vec<u8>> {
        let format = match output_format {
            OutputFormat::SameAsInput => self.format,
            OutputFormat::Xml => Format::Xml,
            OutputFormat::Binary => Format::Binary,
        };
        codec::serialize(self.root_raw()?, format)
    }

}

impl Default for Document {
    fn default() -> Self {
        Document::new()
    }
}
