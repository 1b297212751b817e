//
// Copyright 2026 cfplist Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! Parsing of a PropertyList-1.0 XML document into a native value graph.
//!
//! The reader runs a single event loop over the document and maintains an
//! explicit stack of the containers under construction. As with the binary
//! reader, any failure unwinds the loop and the scoped handles on the stack
//! release every native value allocated so far.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use quick_xml::Reader;
use quick_xml::events::Event;

use crate::convert::MAX_DEPTH;
use crate::engine;
use crate::engine::handle::{ArrayValue, DictionaryValue, ScopedRef};
use crate::error::{Error, Result};

/// A scalar element whose character content is being accumulated.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Scalar {
    Key,
    String,
    Integer,
    Real,
    Data,
    True,
    False,
}

impl Scalar {
    fn for_element(name: &[u8]) -> Option<Scalar> {
        match name {
            b"key" => Some(Scalar::Key),
            b"string" => Some(Scalar::String),
            b"integer" => Some(Scalar::Integer),
            b"real" => Some(Scalar::Real),
            b"data" => Some(Scalar::Data),
            b"true" => Some(Scalar::True),
            b"false" => Some(Scalar::False),
            _ => None,
        }
    }
}

/// A container element whose children are still being parsed.
enum Container {
    Dictionary {
        handle: ScopedRef<DictionaryValue>,
        pending_key: Option<String>,
    },
    Array {
        handle: ScopedRef<ArrayValue>,
    },
}

struct Builder {
    stack: Vec<Container>,
    root: Option<ScopedRef>,
    in_plist: bool,
}

impl Builder {

    /// Opens a new container element.
    fn open_container(&mut self, container: Container) -> Result<()> {
        if !self.in_plist {
            return Err(Error::InvalidXml(String::from("element outside <plist>")));
        }
        if self.stack.len() == MAX_DEPTH {
            return Err(Error::NestingTooDeep);
        }
        self.stack.push(container);
        Ok(())
    }

    /// Closes the innermost container element and attaches it to its parent.
    fn close_container(&mut self) -> Result<()> {
        let value = match self.stack.pop() {
            Some(Container::Dictionary { pending_key: Some(_), .. }) =>
                return Err(Error::InvalidXml(String::from("<key> without a value"))),
            Some(Container::Dictionary { handle, .. }) => handle.upcast(),
            Some(Container::Array { handle }) => handle.upcast(),
            None =>
                return Err(Error::InvalidXml(String::from("unbalanced container element"))),
        };
        self.attach(value)
    }

    /// Records the dictionary key for the next attached value.
    fn set_key(&mut self, key: String) -> Result<()> {
        match self.stack.last_mut() {
            Some(Container::Dictionary { pending_key: pending_key @ None, .. }) => {
                *pending_key = Some(key);
                Ok(())
            }
            Some(Container::Dictionary { .. }) =>
                Err(Error::InvalidXml(String::from("consecutive <key> elements"))),
            _ =>
                Err(Error::InvalidXml(String::from("<key> outside <dict>"))),
        }
    }

    /// Attaches a finished value to the innermost container, or records it as
    /// the root of the document.
    fn attach(&mut self, value: ScopedRef) -> Result<()> {
        let value_raw = value
            .get()
            .ok_or(Error::NullReference("parsed element"))?;
        match self.stack.last_mut() {
            Some(Container::Dictionary { handle, pending_key }) => {
                let key = pending_key
                    .take()
                    .ok_or_else(|| Error::InvalidXml(String::from("value without a preceding <key>")))?;
                let native_key: ScopedRef = ScopedRef::owned(engine::string_create(&key));
                let key_raw = native_key
                    .get()
                    .ok_or(Error::NullReference("parsed dictionary key"))?;
                let dictionary_raw = handle
                    .get()
                    .ok_or(Error::NullReference("open dictionary"))?;
                engine::dictionary_set(dictionary_raw, key_raw, value_raw);
                Ok(())
            }
            Some(Container::Array { handle }) => {
                let array_raw = handle
                    .get()
                    .ok_or(Error::NullReference("open array"))?;
                engine::array_push(array_raw, value_raw);
                Ok(())
            }
            None => {
                if !self.in_plist {
                    return Err(Error::InvalidXml(String::from("element outside <plist>")));
                }
                if self.root.is_some() {
                    return Err(Error::InvalidXml(String::from("multiple root elements")));
                }
                self.root = Some(value);
                Ok(())
            }
        }
    }

    /// Converts a finished scalar element with the given character content
    /// into a native value and attaches it.
    fn finish_scalar(&mut self, scalar: Scalar, text: String) -> Result<()> {
        match scalar {
            Scalar::Key => self.set_key(text),
            Scalar::String => {
                self.attach(ScopedRef::owned(engine::string_create(&text)))
            }
            Scalar::Integer => {
                let value = text.trim().parse::<i64>().map_err(|_| {
                    Error::InvalidXml(format!("invalid <integer> content: {:?}", text))
                })?;
                self.attach(ScopedRef::owned(engine::integer_create(value)))
            }
            Scalar::Real => {
                let value = text.trim().parse::<f64>().map_err(|_| {
                    Error::InvalidXml(format!("invalid <real> content: {:?}", text))
                })?;
                self.attach(ScopedRef::owned(engine::real_create(value)))
            }
            Scalar::Data => {
                let compact = text
                    .chars()
                    .filter(|c| !c.is_ascii_whitespace())
                    .collect::<String>();
                let bytes = BASE64.decode(compact.as_bytes()).map_err(|_| {
                    Error::InvalidXml(String::from("invalid base64 in <data>"))
                })?;
                self.attach(ScopedRef::owned(engine::data_create(bytes)))
            }
            Scalar::True | Scalar::False => {
                if !text.trim().is_empty() {
                    return Err(Error::InvalidXml(String::from("boolean element with content")));
                }
                self.attach(ScopedRef::shared(engine::boolean(scalar == Scalar::True)))
            }
        }
    }

}

/// Resolves a predefined entity or character reference to the character it
/// names.
fn resolve_reference(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            if let Some(digits) = name.strip_prefix("#x") {
                u32::from_str_radix(digits, 16).ok().and_then(std::char::from_u32)
            } else if let Some(digits) = name.strip_prefix('#') {
                digits.parse::<u32>().ok().and_then(std::char::from_u32)
            } else {
                None
            }
        }
    }
}

/// Parses a complete PropertyList-1.0 XML document and returns an owned
/// reference to the root of the reconstructed native value graph.
pub fn parse(input: &[u8]) -> Result<ScopedRef> {
    let text = std::str::from_utf8(input)
        .map_err(|_| Error::InvalidXml(String::from("input is not valid UTF-8")))?;
    let mut reader = Reader::from_str(text);

    let mut builder = Builder {
        stack: Vec::new(),
        root: None,
        in_plist: false,
    };

    // The scalar element currently open, if any, with its accumulated
    // character content.
    let mut capture: Option<(Scalar, String)> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|cause| Error::InvalidXml(cause.to_string()))?;
        match event {

            Event::Start(ref element) => {
                if capture.is_some() {
                    return Err(Error::InvalidXml(String::from(
                        "unexpected element inside scalar content",
                    )));
                }
                match element.name().as_ref() {
                    b"plist" => {
                        if builder.in_plist {
                            return Err(Error::InvalidXml(String::from("nested <plist>")));
                        }
                        builder.in_plist = true;
                    }
                    b"dict" => builder.open_container(Container::Dictionary {
                        handle: ScopedRef::owned(engine::dictionary_create(0)),
                        pending_key: None,
                    })?,
                    b"array" => builder.open_container(Container::Array {
                        handle: ScopedRef::owned(engine::array_create(0)),
                    })?,
                    b"date" =>
                        return Err(Error::UnsupportedObjectType("date")),
                    name => {
                        if !builder.in_plist {
                            return Err(Error::InvalidXml(String::from("element outside <plist>")));
                        }
                        match Scalar::for_element(name) {
                            Some(scalar) => capture = Some((scalar, String::new())),
                            None => return Err(Error::InvalidXml(format!(
                                "unexpected element <{}>",
                                String::from_utf8_lossy(name)
                            ))),
                        }
                    }
                }
            }

            Event::Empty(ref element) => {
                match element.name().as_ref() {
                    b"dict" => {
                        builder.open_container(Container::Dictionary {
                            handle: ScopedRef::owned(engine::dictionary_create(0)),
                            pending_key: None,
                        })?;
                        builder.close_container()?;
                    }
                    b"array" => {
                        builder.open_container(Container::Array {
                            handle: ScopedRef::owned(engine::array_create(0)),
                        })?;
                        builder.close_container()?;
                    }
                    b"date" =>
                        return Err(Error::UnsupportedObjectType("date")),
                    b"plist" =>
                        return Err(Error::InvalidXml(String::from("empty plist"))),
                    name => {
                        if !builder.in_plist {
                            return Err(Error::InvalidXml(String::from("element outside <plist>")));
                        }
                        match Scalar::for_element(name) {
                            Some(scalar) => builder.finish_scalar(scalar, String::new())?,
                            None => return Err(Error::InvalidXml(format!(
                                "unexpected element <{}>",
                                String::from_utf8_lossy(name)
                            ))),
                        }
                    }
                }
            }

            Event::End(ref element) => {
                match element.name().as_ref() {
                    b"plist" => {
                        builder.in_plist = false;
                    }
                    b"dict" | b"array" => builder.close_container()?,
                    _ => {
                        let (scalar, text) = capture.take().ok_or_else(|| {
                            Error::InvalidXml(String::from("unbalanced end tag"))
                        })?;
                        builder.finish_scalar(scalar, text)?;
                    }
                }
            }

            Event::Text(ref contents) => {
                let unescaped = contents
                    .decode()
                    .map_err(|cause| Error::InvalidXml(cause.to_string()))?;
                match capture {
                    Some((_, ref mut text)) => text.push_str(&unescaped),
                    None => {
                        if !unescaped.trim().is_empty() {
                            return Err(Error::InvalidXml(String::from("unexpected character content")));
                        }
                    }
                }
            }

            Event::CData(ref contents) => {
                match capture {
                    Some((_, ref mut text)) => {
                        text.push_str(&String::from_utf8_lossy(contents.as_ref()))
                    }
                    None =>
                        return Err(Error::InvalidXml(String::from("unexpected character content"))),
                }
            }

            // Prolog and miscellaneous markup carry no content.
            Event::Decl(_) | Event::DocType(_) | Event::PI(_) | Event::Comment(_) => {}

            Event::Eof => break,

            Event::GeneralRef(ref reference) => {
                let name = String::from_utf8_lossy(reference.as_ref()).into_owned();
                let resolved = resolve_reference(&name).ok_or_else(|| {
                    Error::InvalidXml(format!("unresolved entity reference &{};", name))
                })?;
                match capture {
                    Some((_, ref mut text)) => text.push(resolved),
                    None =>
                        return Err(Error::InvalidXml(String::from("unexpected character content"))),
                }
            }
        }
    }

    builder
        .root
        .ok_or_else(|| Error::InvalidXml(String::from("missing plist content")))
}
