use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dom::document::{Document, StyleFlags};
use crate::dom::dom_model::{NodeId, Rect};
use crate::error::DetectionError;

// ============================================================================
// Browser DOM snapshot (JSON)
// ============================================================================

/// Serialized page captured by a browser-side walker: tags, attributes,
/// real layout boxes and computed visibility, with open shadow roots inlined.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DomSnapshot {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub root: Vec<SnapshotNode>,
}

/// One node. Elements carry `tag`; text nodes carry only `text` (and
/// optionally their own `rect`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotNode {
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub rect: Option<Rect>,
    #[serde(default)]
    pub style: Option<SnapshotStyle>,
    #[serde(default)]
    pub children: Vec<SnapshotNode>,
    #[serde(default, rename = "shadowRoot")]
    pub shadow_root: Option<Vec<SnapshotNode>>,
}

/// Computed style values as reported by `getComputedStyle`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotStyle {
    pub display: Option<String>,
    pub visibility: Option<String>,
    pub opacity: Option<f32>,
}

impl From<&SnapshotStyle> for StyleFlags {
    fn from(style: &SnapshotStyle) -> Self {
        StyleFlags {
            display_none: style.display.as_deref() == Some("none"),
            visibility_hidden: match style.visibility.as_deref() {
                Some("hidden") | Some("collapse") => Some(true),
                Some(_) => Some(false),
                None => None,
            },
            opacity: style.opacity,
        }
    }
}

impl Document {
    pub fn from_snapshot(snapshot: &DomSnapshot) -> Self {
        let mut doc = Document::new();
        import_nodes(&mut doc, &snapshot.root, NodeId(0));
        doc.set_page_info(snapshot.url.clone(), snapshot.title.clone());
        doc
    }

    pub fn from_snapshot_json(json: &str) -> Result<Self, DetectionError> {
        let snapshot: DomSnapshot = serde_json::from_str(json)?;
        Ok(Self::from_snapshot(&snapshot))
    }
}

/// Work item of the import walk. A host's shadow children are imported
/// after its light children, matching document order.
enum Pending<'a> {
    Node(&'a SnapshotNode, NodeId),
    ShadowRoot(&'a [SnapshotNode], NodeId),
}

fn import_nodes(doc: &mut Document, roots: &[SnapshotNode], parent: NodeId) {
    let mut stack: Vec<Pending<'_>> = roots.iter().rev().map(|n| Pending::Node(n, parent)).collect();

    while let Some(item) = stack.pop() {
        let (node, parent) = match item {
            Pending::Node(node, parent) => (node, parent),
            Pending::ShadowRoot(children, host) => {
                let shadow = doc.attach_shadow_root(host);
                stack.extend(children.iter().rev().map(|c| Pending::Node(c, shadow)));
                continue;
            }
        };

        let Some(tag) = node.tag.as_deref() else {
            if let Some(text) = &node.text {
                let id = doc.push_text(parent, text);
                if let Some(rect) = node.rect {
                    doc.set_rect(id, rect);
                }
            }
            continue;
        };

        let attrs = node
            .attrs
            .iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v.clone()))
            .collect();
        let id = doc.push_element(parent, &tag.to_ascii_lowercase(), attrs);

        if let Some(rect) = node.rect {
            doc.set_rect(id, rect);
        }
        if let Some(style) = &node.style {
            doc.set_style(id, style.into());
        }

        if let Some(shadow_children) = &node.shadow_root {
            stack.push(Pending::ShadowRoot(shadow_children.as_slice(), id));
        }
        stack.extend(node.children.iter().rev().map(|c| Pending::Node(c, id)));
    }
}
