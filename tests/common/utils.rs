use std::path::PathBuf;

use field_detection::config::DetectorConfig;
use field_detection::detector::context::FormContext;
use field_detection::detector::detector::FieldDetector;
use field_detection::dom::document::Document;
use field_detection::dom::dom_model::{Dom, NodeId};
use field_detection::field::field_model::FieldCandidate;

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name)).unwrap()
}

pub fn fixture_document(name: &str) -> Document {
    let content = fixture(name);
    if name.ends_with(".json") {
        Document::from_snapshot_json(&content).unwrap()
    } else {
        Document::parse_html(&content)
    }
}

pub fn detect_fixture(name: &str) -> FormContext {
    let document = fixture_document(name);
    FieldDetector::new(DetectorConfig::default()).detect(&document)
}

pub fn detect(html: &str) -> FormContext {
    let document = Document::parse_html(html);
    FieldDetector::new(DetectorConfig::default()).detect(&document)
}

/// Field by its `name` attribute; panics with the available names.
pub fn field<'a>(context: &'a FormContext, name: &str) -> &'a FieldCandidate {
    context
        .fields
        .iter()
        .find(|f| f.identity.name == name)
        .unwrap_or_else(|| {
            let names: Vec<_> = context.fields.iter().map(|f| f.key()).collect();
            panic!("no field named '{}' in {:?}", name, names)
        })
}

pub fn has_field(context: &FormContext, name: &str) -> bool {
    context.fields.iter().any(|f| f.identity.name == name)
}

/// First element in the light DOM with `name="..."`.
pub fn by_name(document: &Document, name: &str) -> NodeId {
    document
        .descendants(document.document_root())
        .into_iter()
        .find(|n| document.attribute(*n, "name") == Some(name))
        .unwrap_or_else(|| panic!("no element named '{}'", name))
}

pub fn first_tag(document: &Document, tag: &str) -> NodeId {
    document
        .query_all(document.document_root(), tag)
        .unwrap()
        .into_iter()
        .next()
        .unwrap_or_else(|| panic!("no <{}> element", tag))
}

pub fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-4,
        "expected {:.4}, got {:.4}",
        expected,
        actual
    );
}
