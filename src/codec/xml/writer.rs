//
// Copyright 2026 cfplist Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! Serialization of a native value graph into a PropertyList-1.0 XML
//! document.
//!
//! Output matches the layout convention of the reference documents: a fixed
//! prolog, the root element at column zero, and one tab of indentation per
//! nesting level below it.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::engine::{self, Raw, TypeTag};
use crate::error::{Error, Result};

const PROLOG: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
    <!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" \
    \"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n\
    <plist version=\"1.0\">\n";

/// Serializes the native value graph rooted at the argument into a complete
/// PropertyList-1.0 XML document.
pub fn serialize(root: Raw) -> Result<Vec<u8>> {
    let mut output = String::from(PROLOG);
    write_value(&mut output, root, 0)?;
    output.push_str("</plist>\n");
    Ok(output.into_bytes())
}

fn indent(output: &mut String, level: usize) {
    for _ in 0 .. level {
        output.push('\t');
    }
}

/// Appends the string with the markup-significant characters escaped.
fn escape_into(output: &mut String, contents: &str) {
    for c in contents.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            _ => output.push(c),
        }
    }
}

fn write_value(output: &mut String, value: Raw, level: usize) -> Result<()> {
    match engine::type_of(value) {
        TypeTag::Boolean => {
            indent(output, level);
            if engine::boolean_value(value) {
                output.push_str("<true/>\n");
            } else {
                output.push_str("<false/>\n");
            }
        }
        TypeTag::Integer => {
            indent(output, level);
            output.push_str(&format!("<integer>{}</integer>\n", engine::integer_value(value)));
        }
        TypeTag::Real => {
            indent(output, level);
            output.push_str(&format!("<real>{}</real>\n", engine::real_value(value)));
        }
        TypeTag::String => {
            indent(output, level);
            output.push_str("<string>");
            escape_into(output, &engine::string_value(value));
            output.push_str("</string>\n");
        }
        TypeTag::Data => {
            indent(output, level);
            output.push_str("<data>");
            output.push_str(&BASE64.encode(engine::data_value(value)));
            output.push_str("</data>\n");
        }
        TypeTag::Array => {
            let length = engine::array_len(value);
            if length == 0 {
                indent(output, level);
                output.push_str("<array/>\n");
                return Ok(());
            }
            indent(output, level);
            output.push_str("<array>\n");
            for index in 0 .. length {
                let element = engine::array_get(value, index)
                    .ok_or(Error::NullReference("array element"))?;
                write_value(output, element, level + 1)?;
            }
            indent(output, level);
            output.push_str("</array>\n");
        }
        TypeTag::Dictionary => {
            let pairs = engine::dictionary_pairs(value);
            if pairs.is_empty() {
                indent(output, level);
                output.push_str("<dict/>\n");
                return Ok(());
            }
            indent(output, level);
            output.push_str("<dict>\n");
            for (key, entry_value) in pairs {
                if engine::type_of(key) != TypeTag::String {
                    return Err(Error::UnsupportedKeyType);
                }
                indent(output, level + 1);
                output.push_str("<key>");
                escape_into(output, &engine::string_value(key));
                output.push_str("</key>\n");
                write_value(output, entry_value, level + 1)?;
            }
            indent(output, level);
            output.push_str("</dict>\n");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::codec::xml::reader;
    use crate::convert::{decode_value, encode_value, EncodeContext};
    use crate::value::Value;

    use super::serialize;

    fn to_string(value: &Value) -> String {
        let mut context = EncodeContext::new();
        let native = encode_value(&mut context, value).unwrap();
        String::from_utf8(serialize(native.get().unwrap()).unwrap()).unwrap()
    }

    fn round_trip(value: &Value) -> Value {
        let mut context = EncodeContext::new();
        let native = encode_value(&mut context, value).unwrap();
        let bytes = serialize(native.get().unwrap()).unwrap();
        let back = reader::parse(&bytes).unwrap();
        decode_value(back.get().unwrap()).unwrap()
    }

    #[test]
    fn test_layout_of_simple_dictionary() {
        let mut entries = BTreeMap::new();
        entries.insert(String::from("name"), Value::from("a < b"));
        entries.insert(String::from("on"), Value::Boolean(true));
        let output = to_string(&Value::Dictionary(entries));

        assert_eq!(
            output,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" \
             \"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n\
             <plist version=\"1.0\">\n\
             <dict>\n\
             \t<key>name</key>\n\
             \t<string>a &lt; b</string>\n\
             \t<key>on</key>\n\
             \t<true/>\n\
             </dict>\n\
             </plist>\n",
        );
    }

    #[test]
    fn test_empty_containers_use_self_closing_elements() {
        let output = to_string(&Value::Array(vec![
            Value::Array(vec![]),
            Value::Dictionary(BTreeMap::new()),
        ]));
        assert!(output.contains("\t<array/>\n"));
        assert!(output.contains("\t<dict/>\n"));
    }

    #[test]
    fn test_values_survive_the_round_trip() {
        let mut entries = BTreeMap::new();
        entries.insert(String::from("count"), Value::Integer(-12));
        entries.insert(String::from("scale"), Value::from(0.5));
        entries.insert(String::from("title"), Value::from("caffè & <tags>"));
        entries.insert(
            String::from("flags"),
            Value::Array(vec![Value::Boolean(true), Value::Boolean(false)]),
        );
        let value = Value::Dictionary(entries);
        assert_eq!(round_trip(&value), value);
    }

    #[test]
    fn test_whole_reals_survive_the_round_trip() {
        // A fractionless real must come back as a real, not an integer.
        assert_eq!(round_trip(&Value::from(3.0)), Value::from(3.0));
    }
}
