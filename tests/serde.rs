
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use cfplist::{Document, OutputFormat, Value};

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Preferences {
    name: String,
    volume: i64,
    ratio: f64,
    enabled: bool,
    tags: Vec<String>,
}

fn preferences() -> Preferences {
    Preferences {
        name: String::from("workspace"),
        volume: 11,
        ratio: 0.5,
        enabled: true,
        tags: vec![String::from("alpha"), String::from("beta")],
    }
}

/// A typed structure can cross into the managed object model through any
/// serde format and come out of a property list document unchanged.
#[test]
fn test_struct_to_document_and_back() {
    let json = serde_json::to_string(&preferences()).unwrap();
    let value: Value = serde_json::from_str(&json).unwrap();

    let entries = match value {
        Value::Dictionary(entries) => entries,
        other => panic!("expected a dictionary, got {:?}", other),
    };
    let document = Document::from_dictionary(&entries).unwrap();
    let bytes = document.to_bytes(OutputFormat::Binary).unwrap();
    let reparsed = Document::from_bytes(&bytes).unwrap();

    let mut decoded = BTreeMap::new();
    for key in ["name", "volume", "ratio", "enabled", "tags"].iter() {
        decoded.insert(String::from(*key), reparsed.get(key).unwrap().unwrap());
    }
    let back: Preferences =
        serde_json::from_str(&serde_json::to_string(&Value::Dictionary(decoded)).unwrap()).unwrap();
    assert_eq!(back, preferences());
}

/// Integers and reals keep their kind across the serde boundary.
#[test]
fn test_numeric_kinds_cross_serde_boundary() {
    let value: Value = serde_json::from_str(r#"{"int":3,"real":3.0}"#).unwrap();
    if let Value::Dictionary(entries) = &value {
        assert_eq!(entries.get("int"), Some(&Value::Integer(3)));
        assert_eq!(entries.get("real"), Some(&Value::from(3.0)));
    } else {
        panic!("expected a dictionary");
    }

    let json = serde_json::to_string(&value).unwrap();
    assert_eq!(json, r#"{"int":3,"real":3.0}"#);
}
