use scraper::Html;

use crate::dom::dom_model::{ComputedVisibility, Dom, NodeId, Rect};
use crate::dom::selector::SelectorList;
use crate::error::DetectionError;

/// Tags whose content never renders and never labels anything.
const SKIPPED_TAGS: [&str; 4] = ["script", "style", "noscript", "title"];

// ============================================================================
// Arena document
// ============================================================================

#[derive(Debug, Clone)]
enum NodeKind {
    Document,
    ShadowRoot { host: NodeId },
    Element { tag: String, attrs: Vec<(String, String)> },
    Text(String),
}

/// Style facts that affect rendering, as declared on one node.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct StyleFlags {
    pub display_none: bool,
    /// `Some(true)` hidden, `Some(false)` explicitly visible, `None` inherit
    pub visibility_hidden: Option<bool>,
    pub opacity: Option<f32>,
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    shadow_root: Option<NodeId>,
    kind: NodeKind,
    rect: Option<Rect>,
    style: StyleFlags,
}

/// In-memory document implementing `Dom`.
///
/// Built from raw HTML (geometry from `data-rect` or inline px styles) or
/// from a browser snapshot carrying real boxes and computed styles.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    title: String,
    url: Option<String>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                shadow_root: None,
                kind: NodeKind::Document,
                rect: None,
                style: StyleFlags::default(),
            }],
            root: NodeId(0),
            title: String::new(),
            url: None,
        }
    }

    /// Parse an HTML string. Declarative shadow roots
    /// (`<template shadowrootmode>`) are attached to their parent element;
    /// other templates, scripts and styles are dropped.
    pub fn parse_html(html: &str) -> Self {
        let parsed = Html::parse_document(html);
        let mut doc = Document::new();

        let mut title = String::new();
        let mut stack = vec![(parsed.tree.root(), doc.root)];

        while let Some((node, parent)) = stack.pop() {
            let mut next_parent = parent;

            match node.value() {
                scraper::Node::Document | scraper::Node::Fragment => {}
                scraper::Node::Element(element) => {
                    let tag = element.name().to_ascii_lowercase();

                    if tag == "title" && title.is_empty() {
                        title = node
                            .children()
                            .filter_map(|c| c.value().as_text().map(|t| String::from(&**t)))
                            .collect::<String>()
                            .trim()
                            .to_string();
                    }

                    if SKIPPED_TAGS.contains(&tag.as_str()) {
                        continue;
                    }

                    if tag == "template" {
                        let declares_shadow = element.attr("shadowrootmode").is_some()
                            || element.attr("shadowroot").is_some();
                        if !declares_shadow
                            || !doc.is_element(parent)
                            || doc.shadow_root(parent).is_some()
                        {
                            continue;
                        }
                        next_parent = doc.attach_shadow_root(parent);
                    } else {
                        let attrs = element
                            .attrs()
                            .map(|(k, v)| (k.to_ascii_lowercase(), v.to_string()))
                            .collect();
                        next_parent = doc.push_element(parent, &tag, attrs);
                    }
                }
                scraper::Node::Text(text) => {
                    let content: &str = text;
                    doc.push_text(parent, content);
                    continue;
                }
                _ => continue,
            }

            let children: Vec<_> = node.children().collect();
            for child in children.into_iter().rev() {
                stack.push((child, next_parent));
            }
        }

        doc.title = title;
        doc
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub(crate) fn set_page_info(&mut self, url: Option<String>, title: String) {
        self.url = url;
        self.title = title;
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// First element in the document tree with the given `id`.
    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|n| self.attribute(*n, "id") == Some(id))
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn alloc(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            shadow_root: None,
            kind,
            rect: None,
            style: StyleFlags::default(),
        });
        if let Some(p) = parent {
            self.nodes[p.0].children.push(id);
        }
        id
    }

    pub(crate) fn push_element(
        &mut self,
        parent: NodeId,
        tag: &str,
        attrs: Vec<(String, String)>,
    ) -> NodeId {
        let (style, geometry) = attrs
            .iter()
            .find(|(k, _)| k == "style")
            .map(|(_, v)| parse_inline_style(v))
            .unwrap_or_default();
        let hidden_attr = attrs.iter().any(|(k, _)| k == "hidden");
        let rect = attrs
            .iter()
            .find(|(k, _)| k == "data-rect")
            .and_then(|(_, v)| parse_rect_attr(v))
            .or_else(|| geometry.into_rect());

        let id = self.alloc(
            Some(parent),
            NodeKind::Element {
                tag: tag.to_string(),
                attrs,
            },
        );
        let node = &mut self.nodes[id.0];
        node.rect = rect;
        node.style = StyleFlags {
            display_none: style.display_none || hidden_attr,
            ..style
        };
        id
    }

    pub(crate) fn push_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.alloc(Some(parent), NodeKind::Text(text.to_string()))
    }

    pub(crate) fn attach_shadow_root(&mut self, host: NodeId) -> NodeId {
        let root = self.alloc(None, NodeKind::ShadowRoot { host });
        self.nodes[host.0].shadow_root = Some(root);
        root
    }

    pub(crate) fn set_rect(&mut self, node: NodeId, rect: Rect) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.rect = Some(rect);
        }
    }

    pub(crate) fn set_style(&mut self, node: NodeId, style: StyleFlags) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.style = style;
        }
    }

    /// Parent in the composed tree: shadow roots continue at their host.
    fn composed_parent(&self, node: NodeId) -> Option<NodeId> {
        let n = self.node(node)?;
        match (&n.kind, n.parent) {
            (NodeKind::ShadowRoot { host }, _) => Some(*host),
            (_, parent) => parent,
        }
    }
}

// ============================================================================
// Dom implementation
// ============================================================================

impl Dom for Document {
    fn document_root(&self) -> NodeId {
        self.root
    }

    fn query_all(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>, DetectionError> {
        if self.node(scope).is_none() {
            return Err(DetectionError::NodeNotFound(scope));
        }
        let selector = SelectorList::parse(selector)?;
        Ok(self
            .descendants(scope)
            .into_iter()
            .filter(|n| selector.matches(self, *n))
            .collect())
    }

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        match &self.node(node)?.kind {
            NodeKind::Element { tag, .. } => Some(tag.as_str()),
            _ => None,
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.node(node)?.kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)?.parent
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        self.node(node).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        match &self.node(node)?.kind {
            NodeKind::Text(t) => Some(t.as_str()),
            _ => None,
        }
    }

    fn shadow_root(&self, host: NodeId) -> Option<NodeId> {
        self.node(host)?.shadow_root
    }

    fn shadow_host(&self, root: NodeId) -> Option<NodeId> {
        match self.node(root)?.kind {
            NodeKind::ShadowRoot { host } => Some(host),
            _ => None,
        }
    }

    fn bounding_box(&self, node: NodeId) -> Option<Rect> {
        let n = self.node(node)?;
        match (&n.kind, n.rect) {
            (_, Some(rect)) => Some(rect),
            (NodeKind::Text(_), None) => n.parent.and_then(|p| self.node(p)?.rect),
            _ => None,
        }
    }

    fn computed_visibility(&self, node: NodeId) -> ComputedVisibility {
        let mut out = ComputedVisibility::default();
        let mut visibility_resolved = false;
        let mut current = Some(node);

        while let Some(id) = current {
            let Some(n) = self.node(id) else { break };
            let style = n.style;

            out.display_none |= style.display_none;
            if !visibility_resolved {
                if let Some(hidden) = style.visibility_hidden {
                    out.visibility_hidden = hidden;
                    visibility_resolved = true;
                }
            }
            if let Some(opacity) = style.opacity {
                out.opacity *= opacity.clamp(0.0, 1.0);
            }

            current = self.composed_parent(id);
        }

        out
    }
}

// ============================================================================
// Inline style / geometry parsing
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
struct DeclaredGeometry {
    left: Option<f32>,
    top: Option<f32>,
    width: Option<f32>,
    height: Option<f32>,
}

impl DeclaredGeometry {
    fn into_rect(self) -> Option<Rect> {
        Some(Rect::new(
            self.left.unwrap_or(0.0),
            self.top.unwrap_or(0.0),
            self.width?,
            self.height?,
        ))
    }
}

fn parse_px(value: &str) -> Option<f32> {
    value.trim().trim_end_matches("px").trim().parse::<f32>().ok()
}

fn parse_inline_style(style: &str) -> (StyleFlags, DeclaredGeometry) {
    let mut flags = StyleFlags::default();
    let mut geometry = DeclaredGeometry::default();

    for declaration in style.split(';') {
        let Some((property, value)) = declaration.split_once(':') else {
            continue;
        };
        let property = property.trim().to_ascii_lowercase();
        let value = value
            .trim()
            .trim_end_matches("!important")
            .trim()
            .to_ascii_lowercase();

        match property.as_str() {
            "display" => flags.display_none = value == "none",
            "visibility" => {
                flags.visibility_hidden = match value.as_str() {
                    "hidden" | "collapse" => Some(true),
                    "visible" => Some(false),
                    _ => None,
                }
            }
            "opacity" => flags.opacity = value.parse::<f32>().ok(),
            "left" => geometry.left = parse_px(&value),
            "top" => geometry.top = parse_px(&value),
            "width" => geometry.width = parse_px(&value),
            "height" => geometry.height = parse_px(&value),
            _ => {}
        }
    }

    (flags, geometry)
}

/// `data-rect="x,y,width,height"`
fn parse_rect_attr(value: &str) -> Option<Rect> {
    let parts: Vec<f32> = value
        .split(',')
        .map(|p| p.trim().parse::<f32>())
        .collect::<Result<_, _>>()
        .ok()?;
    match parts.as_slice() {
        [x, y, w, h] => Some(Rect::new(*x, *y, *w, *h)),
        _ => None,
    }
}
