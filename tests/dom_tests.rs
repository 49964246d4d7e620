mod common;

use common::utils::{by_name, first_tag, fixture_document};
use field_detection::dom::document::Document;
use field_detection::dom::dom_model::{Dom, Rect};
use field_detection::dom::selector::SelectorList;
use field_detection::dom::snapshot::{DomSnapshot, SnapshotNode};
use field_detection::error::DetectionError;

// ============================================================================
// HTML parsing
// ============================================================================

#[test]
fn parse_html_keeps_title_and_drops_scripts() {
    let doc = fixture_document("login.html");
    assert_eq!(doc.title(), "Sign in");
    assert!(doc.query_all(doc.document_root(), "script").unwrap().is_empty());
    assert!(doc.query_all(doc.document_root(), "style").unwrap().is_empty());
}

#[test]
fn parse_html_lowercases_tags_and_keeps_attributes() {
    let doc = Document::parse_html(r#"<FORM ID="f"><INPUT Type="EMAIL" name="mail"></FORM>"#);
    let input = by_name(&doc, "mail");
    assert_eq!(doc.tag_name(input), Some("input"));
    assert_eq!(doc.attribute(input, "type"), Some("EMAIL"));
    assert_eq!(doc.closest(input, "form"), doc.by_id("f"));
}

#[test]
fn text_content_joins_descendant_text() {
    let doc = Document::parse_html("<p id='p'>Hello <b>world</b></p>");
    let p = doc.by_id("p").unwrap();
    let text = doc.text_content(p);
    assert!(text.contains("Hello"));
    assert!(text.contains("world"));
}

#[test]
fn previous_element_sibling_skips_text() {
    let doc = Document::parse_html("<div><span id='a'>A</span> text <input id='b'></div>");
    let b = doc.by_id("b").unwrap();
    assert_eq!(doc.previous_element_sibling(b), doc.by_id("a"));
}

// ============================================================================
// Selector subset
// ============================================================================

#[test]
fn selector_matches_tag_id_class_and_attributes() {
    let doc = Document::parse_html(
        r#"<div>
            <input id="a" class="form-control big" type="email" name="user_email">
            <input id="b" type="text" data-field>
            <select id="c"></select>
        </div>"#,
    );
    let root = doc.document_root();
    let ids = |selector: &str| -> Vec<String> {
        doc.query_all(root, selector)
            .unwrap()
            .into_iter()
            .filter_map(|n| doc.attribute(n, "id").map(str::to_string))
            .collect()
    };

    assert_eq!(ids("input"), vec!["a", "b"]);
    assert_eq!(ids("#c"), vec!["c"]);
    assert_eq!(ids(".form-control.big"), vec!["a"]);
    assert_eq!(ids("[data-field]"), vec!["b"]);
    assert_eq!(ids("input[type=email]"), vec!["a"]);
    assert_eq!(ids("[name*=mail]"), vec!["a"]);
    assert_eq!(ids("[name^=user]"), vec!["a"]);
    assert_eq!(ids("[name$=\"email\"]"), vec!["a"]);
    assert_eq!(ids("[class~=big]"), vec!["a"]);
    assert_eq!(ids("select, #b"), vec!["b", "c"]);
}

#[test]
fn selector_rejects_combinators() {
    assert!(matches!(
        SelectorList::parse("form input"),
        Err(DetectionError::UnsupportedSelector(_))
    ));
    assert!(matches!(
        SelectorList::parse("div > span"),
        Err(DetectionError::UnsupportedSelector(_))
    ));
    assert!(SelectorList::parse("").is_err());
    assert!(SelectorList::parse("input,").is_err());
}

#[test]
fn query_all_reports_unsupported_selector() {
    let doc = Document::parse_html("<input>");
    let err = doc.query_all(doc.document_root(), "a:hover").unwrap_err();
    assert!(matches!(err, DetectionError::UnsupportedSelector(_)));
    assert!(err.to_string().contains("a:hover"));
}

// ============================================================================
// Visibility and geometry
// ============================================================================

#[test]
fn display_none_is_inherited() {
    let doc = Document::parse_html(
        r#"<div style="display:none"><p><input name="inner"></p></div><input name="outer">"#,
    );
    assert!(!doc.computed_visibility(by_name(&doc, "inner")).is_visible());
    assert!(doc.computed_visibility(by_name(&doc, "outer")).is_visible());
}

#[test]
fn visibility_can_be_overridden_by_descendant() {
    let doc = Document::parse_html(
        r#"<div style="visibility: hidden"><input name="a"><input name="b" style="visibility: visible"></div>"#,
    );
    assert!(!doc.computed_visibility(by_name(&doc, "a")).is_visible());
    assert!(doc.computed_visibility(by_name(&doc, "b")).is_visible());
}

#[test]
fn opacity_multiplies_down_the_tree() {
    let doc = Document::parse_html(
        r#"<div style="opacity: 0.5"><input name="half"></div><div style="opacity:0"><input name="gone"></div>"#,
    );
    let half = doc.computed_visibility(by_name(&doc, "half"));
    assert!((half.opacity - 0.5).abs() < 1e-6);
    assert!(!doc.computed_visibility(by_name(&doc, "gone")).is_visible());
}

#[test]
fn hidden_attribute_counts_as_display_none() {
    let doc = Document::parse_html(r#"<input name="h" hidden>"#);
    assert!(!doc.computed_visibility(by_name(&doc, "h")).is_visible());
}

#[test]
fn geometry_from_data_rect_and_inline_style() {
    let doc = Document::parse_html(
        r#"<input name="a" data-rect="10, 20, 300, 40">
           <input name="b" style="left: 5px; top: 6px; width: 100px; height: 24px">
           <input name="c" style="width: 100px">"#,
    );
    assert_eq!(
        doc.bounding_box(by_name(&doc, "a")),
        Some(Rect::new(10.0, 20.0, 300.0, 40.0))
    );
    assert_eq!(
        doc.bounding_box(by_name(&doc, "b")),
        Some(Rect::new(5.0, 6.0, 100.0, 24.0))
    );
    assert_eq!(doc.bounding_box(by_name(&doc, "c")), None);
}

#[test]
fn text_nodes_inherit_parent_box() {
    let doc = fixture_document("proximity.html");
    let span = first_tag(&doc, "span");
    let text = doc
        .children(span)
        .iter()
        .copied()
        .find(|n| doc.text(*n).is_some())
        .unwrap();
    assert_eq!(doc.bounding_box(text), Some(Rect::new(10.0, 10.0, 80.0, 20.0)));
}

#[test]
fn rect_center_distance() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    let b = Rect::new(30.0, 40.0, 10.0, 10.0);
    assert!((a.center_distance(&b) - 50.0).abs() < 1e-4);
    assert!(Rect::new(0.0, 0.0, 0.0, 20.0).is_empty());
    assert_eq!(Rect::new(0.0, 0.0, 4.0, 5.0).area(), 20.0);
}

// ============================================================================
// Shadow roots
// ============================================================================

#[test]
fn declarative_shadow_roots_attach_to_host() {
    let doc = fixture_document("shadow.html");
    let hosts = doc.shadow_hosts();
    assert_eq!(hosts.len(), 2, "outer and nested host");

    let outer = hosts
        .iter()
        .copied()
        .find(|h| doc.has_tag(*h, "promo-field"))
        .unwrap();
    let root = doc.shadow_root(outer).unwrap();
    assert_eq!(doc.shadow_host(root), Some(outer));
    assert_eq!(doc.parent(root), None);

    // Light DOM queries do not see into the shadow tree
    let light_inputs = doc.query_all(doc.document_root(), "input").unwrap();
    assert_eq!(light_inputs.len(), 1);

    let shadow_inputs = doc.query_all(root, "input").unwrap();
    assert_eq!(shadow_inputs.len(), 1);
    assert!(doc.is_in_shadow_tree(shadow_inputs[0]));
    assert!(!doc.is_in_shadow_tree(light_inputs[0]));
}

#[test]
fn dom_path_crosses_shadow_boundary() {
    let doc = fixture_document("shadow.html");
    let host = doc
        .shadow_hosts()
        .into_iter()
        .find(|h| doc.has_tag(*h, "promo-field"))
        .unwrap();
    let root = doc.shadow_root(host).unwrap();
    let promo = doc.query_all(root, "#promo").unwrap()[0];

    let path = doc.dom_path(promo);
    assert!(path.contains("promo-field"));
    assert!(path.contains("#shadow"));
    let index = doc.children(root).iter().position(|c| *c == promo).unwrap();
    assert!(path.ends_with(&format!("#shadow/input[{}]", index)));
    assert_eq!(path, doc.dom_path(promo), "path is stable");
}

#[test]
fn plain_templates_are_dropped() {
    let doc = Document::parse_html("<div><template><input name='t'></template></div>");
    assert!(doc.shadow_hosts().is_empty());
    assert!(doc.query_all(doc.document_root(), "input").unwrap().is_empty());
}

// ============================================================================
// Snapshots
// ============================================================================

#[test]
fn snapshot_carries_page_info_geometry_and_style() {
    let doc = fixture_document("snapshot_login.json");
    assert_eq!(doc.title(), "Sign in");
    assert_eq!(doc.url(), Some("https://example.com/login"));

    let email = doc.by_id("email").unwrap();
    assert_eq!(doc.bounding_box(email), Some(Rect::new(110.0, 135.0, 300.0, 32.0)));
    assert_eq!(doc.attribute(email, "required"), Some(""));

    assert!(!doc.computed_visibility(by_name(&doc, "honeypot")).is_visible());
    assert!(!doc.computed_visibility(by_name(&doc, "faded")).is_visible());
    assert!(doc.computed_visibility(by_name(&doc, "trap")).is_visible());
}

#[test]
fn snapshot_shadow_roots_are_imported() {
    let json = r#"{
        "root": [{
            "tag": "my-widget",
            "shadowRoot": [
                { "tag": "input", "attrs": { "name": "inside" } }
            ]
        }]
    }"#;
    let doc = Document::from_snapshot_json(json).unwrap();
    let hosts = doc.shadow_hosts();
    assert_eq!(hosts.len(), 1);
    let root = doc.shadow_root(hosts[0]).unwrap();
    assert_eq!(doc.query_all(root, "input").unwrap().len(), 1);
}

#[test]
fn malformed_snapshot_is_an_error() {
    let err = Document::from_snapshot_json("{ not json").unwrap_err();
    assert!(matches!(err, DetectionError::Snapshot(_)));
}

#[test]
fn deeply_nested_snapshot_imports_every_level() {
    const DEPTH: usize = 2_000;

    let mut node = SnapshotNode {
        tag: Some("input".to_string()),
        attrs: [("name".to_string(), "deep".to_string())].into_iter().collect(),
        ..Default::default()
    };
    for _ in 0..DEPTH {
        node = SnapshotNode {
            tag: Some("div".to_string()),
            children: vec![node],
            ..Default::default()
        };
    }
    let snapshot = DomSnapshot {
        root: vec![node],
        ..Default::default()
    };

    let doc = Document::from_snapshot(&snapshot);
    assert_eq!(doc.len(), DEPTH + 2, "root, divs and the input");

    let input = by_name(&doc, "deep");
    assert_eq!(doc.ancestors(input).len(), DEPTH);
}

#[test]
fn snapshot_host_keeps_light_children_apart_from_shadow_tree() {
    let json = r#"{
        "root": [{
            "tag": "fancy-input",
            "children": [ { "tag": "span", "text": null, "children": [ { "text": "Light" } ] } ],
            "shadowRoot": [
                { "tag": "label", "attrs": { "for": "s" }, "children": [ { "text": "Inside" } ] },
                { "tag": "input", "attrs": { "id": "s", "name": "inside" } }
            ]
        }]
    }"#;
    let doc = Document::from_snapshot_json(json).unwrap();
    let host = doc.shadow_hosts()[0];

    let light: Vec<Option<&str>> = doc.children(host).iter().map(|c| doc.tag_name(*c)).collect();
    assert_eq!(light, vec![Some("span")]);

    let root = doc.shadow_root(host).unwrap();
    let shadow: Vec<Option<&str>> = doc.children(root).iter().map(|c| doc.tag_name(*c)).collect();
    assert_eq!(shadow, vec![Some("label"), Some("input")]);
    assert!(doc.dom_path(doc.children(root)[1]).ends_with("#shadow/input[1]"));
}

#[test]
fn overly_nested_snapshot_json_is_rejected() {
    let json = format!(
        r#"{{"root": [{}{{"tag": "input"}}{}]}}"#,
        r#"{"tag": "div", "children": ["#.repeat(1_000),
        "]}".repeat(1_000)
    );
    let err = Document::from_snapshot_json(&json).unwrap_err();
    assert!(matches!(err, DetectionError::Snapshot(_)));
}
