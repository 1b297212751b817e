
use cfplist::{Document, Error, Format, OutputFormat};

#[test]
fn test_selector_mapping_covers_the_three_formats() {
    assert_eq!(OutputFormat::from_selector(0), Ok(OutputFormat::SameAsInput));
    assert_eq!(OutputFormat::from_selector(1), Ok(OutputFormat::Xml));
    assert_eq!(OutputFormat::from_selector(2), Ok(OutputFormat::Binary));
    assert_eq!(
        OutputFormat::from_selector(17),
        Err(Error::InvalidFormatSelector(17))
    );
}

#[test]
fn test_fresh_document_reports_xml() {
    let document = Document::new();
    assert_eq!(document.format(), Format::Xml);
}

#[test]
fn test_same_as_input_follows_the_parsed_format() {
    let mut document = Document::new();
    document.set_string("k", "v").unwrap();

    // Parse the binary rendition; SameAsInput must produce binary again.
    let binary = document.to_bytes(OutputFormat::Binary).unwrap();
    let from_binary = Document::from_bytes(&binary).unwrap();
    assert_eq!(from_binary.format(), Format::Binary);
    let bytes = from_binary.to_bytes(OutputFormat::SameAsInput).unwrap();
    assert!(bytes.starts_with(b"bplist00"));

    // Parse the XML rendition; SameAsInput must produce XML again.
    let xml = document.to_bytes(OutputFormat::Xml).unwrap();
    let from_xml = Document::from_bytes(&xml).unwrap();
    assert_eq!(from_xml.format(), Format::Xml);
    let bytes = from_xml.to_bytes(OutputFormat::SameAsInput).unwrap();
    assert!(bytes.starts_with(b"<?xml"));
}

#[test]
fn test_explicit_format_overrides_the_input_format() {
    let mut document = Document::new();
    document.set_integer("n", 1).unwrap();

    let binary = document.to_bytes(OutputFormat::Binary).unwrap();
    let reparsed = Document::from_bytes(&binary).unwrap();

    // A document parsed from binary can still be rewritten as XML.
    let xml = reparsed.to_bytes(OutputFormat::Xml).unwrap();
    assert!(xml.starts_with(b"<?xml"));
    assert_eq!(Document::from_bytes(&xml).unwrap().format(), Format::Xml);
}
