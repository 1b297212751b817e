
use cfplist::{Document, OutputFormat, Value};

/// Builds a configuration-style document from scratch, serializes it as XML
/// and reads the entries back out of the reparsed document.
#[test]
fn test_build_serialize_and_reparse() {
    pretty_env_logger::init();

    let mut document = Document::new();
    document.set_string("application", "editor").unwrap();
    document.set_integer("launch-count", 42).unwrap();

    let bytes = document
        .to_bytes(OutputFormat::from_selector(1).unwrap())
        .unwrap();
    assert!(bytes.starts_with(b"<?xml"));

    let reparsed = Document::from_bytes(&bytes).unwrap();
    assert_eq!(
        reparsed.get("application"),
        Ok(Some(Value::from("editor")))
    );
    assert_eq!(
        reparsed.get("launch-count"),
        Ok(Some(Value::Integer(42)))
    );
    assert_eq!(reparsed.get("never-set"), Ok(None));
}
