use serde::{Deserialize, Serialize};

use crate::error::DetectionError;

// ============================================================================
// Core DOM types
// ============================================================================

/// Handle to a node inside a `Dom` implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// Rendered bounding box in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Euclidean distance between the two box centers.
    pub fn center_distance(&self, other: &Rect) -> f32 {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();
        ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
    }
}

/// The subset of computed style that decides whether a node is rendered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComputedVisibility {
    pub display_none: bool,
    pub visibility_hidden: bool,
    pub opacity: f32,
}

impl Default for ComputedVisibility {
    fn default() -> Self {
        Self {
            display_none: false,
            visibility_hidden: false,
            opacity: 1.0,
        }
    }
}

impl ComputedVisibility {
    pub fn is_visible(&self) -> bool {
        !self.display_none && !self.visibility_hidden && self.opacity > 0.0
    }
}

// ============================================================================
// Dom trait: the capability interface the detection engine is written against
// ============================================================================

/// Read-only view of a document.
///
/// Implementors supply the primitive accessors; tree walks used by the label
/// resolver and the phases are provided on top of them. Shadow roots are not
/// children of their host: `parent()` of a shadow root is `None` and
/// `shadow_host()` links back to the host, so every walk stays inside one tree
/// unless it crosses the boundary explicitly.
pub trait Dom {
    fn document_root(&self) -> NodeId;

    /// Elements under `scope` (exclusive) matching `selector`, in document order.
    fn query_all(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>, DetectionError>;

    /// Lower-cased tag name; `None` for text, document and shadow-root nodes.
    fn tag_name(&self, node: NodeId) -> Option<&str>;

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str>;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    fn children(&self, node: NodeId) -> &[NodeId];

    /// Character data of a text node.
    fn text(&self, node: NodeId) -> Option<&str>;

    fn shadow_root(&self, host: NodeId) -> Option<NodeId>;

    fn shadow_host(&self, root: NodeId) -> Option<NodeId>;

    fn bounding_box(&self, node: NodeId) -> Option<Rect>;

    fn computed_visibility(&self, node: NodeId) -> ComputedVisibility;

    // ------------------------------------------------------------------------
    // Provided helpers
    // ------------------------------------------------------------------------

    fn is_element(&self, node: NodeId) -> bool {
        self.tag_name(node).is_some()
    }

    fn has_tag(&self, node: NodeId, tag: &str) -> bool {
        self.tag_name(node).is_some_and(|t| t == tag)
    }

    /// Non-empty attribute value, trimmed.
    fn non_empty_attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.attribute(node, name)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    fn has_class(&self, node: NodeId, class_name: &str) -> bool {
        self.attribute(node, "class")
            .is_some_and(|c| c.split_whitespace().any(|token| token == class_name))
    }

    fn classes(&self, node: NodeId) -> Vec<String> {
        self.attribute(node, "class")
            .map(|c| c.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Element ancestors within the node's own tree, innermost first.
    fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parent(node);
        while let Some(p) = current {
            if self.is_element(p) {
                out.push(p);
            }
            current = self.parent(p);
        }
        out
    }

    fn closest(&self, node: NodeId, tag: &str) -> Option<NodeId> {
        self.ancestors(node).into_iter().find(|a| self.has_tag(*a, tag))
    }

    fn is_descendant_of(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.parent(node);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.parent(p);
        }
        false
    }

    fn element_children(&self, node: NodeId) -> Vec<NodeId> {
        self.children(node)
            .iter()
            .copied()
            .filter(|c| self.is_element(*c))
            .collect()
    }

    fn previous_element_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|s| *s == node)?;
        siblings[..pos]
            .iter()
            .rev()
            .copied()
            .find(|s| self.is_element(*s))
    }

    /// All nodes below `scope` in pre-order (document order), own tree only.
    fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(scope).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    fn text_nodes(&self, scope: NodeId) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|n| self.text(*n).is_some())
            .collect()
    }

    /// Concatenated character data of every text node below `node`.
    fn text_content(&self, node: NodeId) -> String {
        if let Some(t) = self.text(node) {
            return t.to_string();
        }
        self.descendants(node)
            .into_iter()
            .filter_map(|n| self.text(n))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Root of the tree `node` lives in (document root or a shadow root).
    fn tree_root(&self, node: NodeId) -> NodeId {
        let mut current = node;
        while let Some(p) = self.parent(current) {
            current = p;
        }
        current
    }

    fn is_in_shadow_tree(&self, node: NodeId) -> bool {
        self.shadow_host(self.tree_root(node)).is_some()
    }

    /// Every element hosting a shadow root, including hosts nested inside
    /// other shadow trees.
    fn shadow_hosts(&self) -> Vec<NodeId> {
        let mut hosts = Vec::new();
        let mut pending = vec![self.document_root()];
        while let Some(tree) = pending.pop() {
            for node in self.descendants(tree) {
                if let Some(root) = self.shadow_root(node) {
                    hosts.push(node);
                    pending.push(root);
                }
            }
        }
        hosts
    }

    /// Stable positional path, crossing shadow boundaries (`#shadow`).
    fn dom_path(&self, node: NodeId) -> String {
        let mut segments = Vec::new();
        let mut current = node;
        loop {
            match self.parent(current) {
                Some(parent) => {
                    let index = self
                        .children(parent)
                        .iter()
                        .position(|c| *c == current)
                        .unwrap_or(0);
                    let tag = self.tag_name(current).unwrap_or("#text");
                    segments.push(format!("{}[{}]", tag, index));
                    current = parent;
                }
                None => match self.shadow_host(current) {
                    Some(host) => {
                        segments.push("#shadow".to_string());
                        current = host;
                    }
                    None => break,
                },
            }
        }
        segments.reverse();
        segments.join("/")
    }
}
