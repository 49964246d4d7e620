use std::sync::LazyLock;

use regex::Regex;

use crate::config::LabelConfig;
use crate::dom::dom_model::{Dom, NodeId};
use crate::field::classifier::control_kind;
use crate::field::field_model::{DEFAULT_LABEL_CHAIN, LabelStrategy};
use crate::field::normalize::{humanize_identifier, normalize_label};

/// Elements whose text belongs to a control, not to a label.
const CONTROL_TEXT_TAGS: [&str; 5] = ["select", "textarea", "option", "datalist", "button"];

/// Classes framework form kits put on label elements.
const FRAMEWORK_LABEL_SELECTOR: &str = ".form-label, .control-label, .field-label";

static COLON_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(user\s*name|username|login|password|pass|e-?mail)\s*:$")
        .expect("Invalid colon label pattern")
});

/// Outcome of running a strategy chain. `source` is `None` when every
/// strategy missed and `text` is empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedLabel {
    pub text: String,
    pub source: Option<LabelStrategy>,
    pub evidence: Vec<String>,
}

pub struct LabelResolver<'a> {
    dom: &'a dyn Dom,
    config: &'a LabelConfig,
}

impl<'a> LabelResolver<'a> {
    pub fn new(dom: &'a dyn Dom, config: &'a LabelConfig) -> Self {
        Self { dom, config }
    }

    pub fn resolve(&self, node: NodeId) -> ResolvedLabel {
        self.resolve_with(node, &DEFAULT_LABEL_CHAIN)
    }

    /// Try each strategy in turn; the first non-empty normalized label wins.
    pub fn resolve_with(&self, node: NodeId, chain: &[LabelStrategy]) -> ResolvedLabel {
        let mut evidence = Vec::new();

        for strategy in chain {
            let found = self
                .attempt(*strategy, node)
                .map(|raw| normalize_label(&raw, self.config.max_length))
                .filter(|text| !text.is_empty());

            match found {
                Some(text) => {
                    evidence.push(format!("label via {}: \"{}\"", strategy, text));
                    return ResolvedLabel {
                        text,
                        source: Some(*strategy),
                        evidence,
                    };
                }
                None => evidence.push(format!("label via {}: miss", strategy)),
            }
        }

        ResolvedLabel {
            text: String::new(),
            source: None,
            evidence,
        }
    }

    fn attempt(&self, strategy: LabelStrategy, node: NodeId) -> Option<String> {
        match strategy {
            LabelStrategy::Explicit => self.explicit_label(node),
            LabelStrategy::Ancestor => self.ancestor_label(node),
            LabelStrategy::Table => self.table_label(node),
            LabelStrategy::Aria => self.aria_label(node),
            LabelStrategy::Framework => self.framework_label(node),
            LabelStrategy::Proximity => self.proximity_label(node),
            LabelStrategy::Attribute => self.attribute_label(node),
        }
    }

    // ------------------------------------------------------------------------
    // Strategies
    // ------------------------------------------------------------------------

    /// `<label for=id>` in the control's own tree.
    pub fn explicit_label(&self, node: NodeId) -> Option<String> {
        let id = self.dom.non_empty_attribute(node, "id")?;
        let root = self.dom.tree_root(node);

        self.dom
            .query_all(root, "label[for]")
            .ok()?
            .into_iter()
            .filter(|label| self.dom.attribute(*label, "for").map(str::trim) == Some(id))
            .map(|label| self.label_text(label))
            .find(|text| !text.trim().is_empty())
    }

    /// Wrapping `<label>`, minus the text of controls nested inside it.
    pub fn ancestor_label(&self, node: NodeId) -> Option<String> {
        let label = self.dom.closest(node, "label")?;
        Some(self.label_text(label)).filter(|t| !t.trim().is_empty())
    }

    /// Row-wise then column-wise lookup for controls laid out in a table.
    pub fn table_label(&self, node: NodeId) -> Option<String> {
        let cell = self
            .dom
            .ancestors(node)
            .into_iter()
            .find(|a| self.is_cell(*a))?;
        let row = self.dom.parent(cell).filter(|p| self.dom.has_tag(*p, "tr"))?;
        let cells = self.row_cells(row);
        let position = cells.iter().position(|c| *c == cell)?;

        let row_label = cells[..position]
            .iter()
            .rev()
            .map(|c| self.label_text(*c))
            .find(|t| !t.trim().is_empty());
        if row_label.is_some() {
            return row_label;
        }

        let column = self.column_offset(&cells[..position]);
        let table = self.dom.closest(row, "table")?;
        let header = self.header_row(table).filter(|h| *h != row)?;

        let mut offset = 0;
        for header_cell in self.row_cells(header) {
            offset += self.colspan(header_cell);
            if offset > column {
                return Some(self.label_text(header_cell)).filter(|t| !t.trim().is_empty());
            }
        }
        None
    }

    /// `aria-label`, else the joined text of `aria-labelledby` targets.
    pub fn aria_label(&self, node: NodeId) -> Option<String> {
        if let Some(label) = self.dom.non_empty_attribute(node, "aria-label") {
            return Some(label.to_string());
        }

        let ids = self.dom.non_empty_attribute(node, "aria-labelledby")?;
        let root = self.dom.tree_root(node);
        let scope = self.dom.descendants(root);

        let parts: Vec<String> = ids
            .split_whitespace()
            .filter_map(|id| {
                scope
                    .iter()
                    .copied()
                    .find(|n| self.dom.attribute(*n, "id") == Some(id))
            })
            .map(|target| self.dom.text_content(target).trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        (!parts.is_empty()).then(|| parts.join(" "))
    }

    /// Label-like siblings and framework label classes in the nearest
    /// few ancestor containers.
    pub fn framework_label(&self, node: NodeId) -> Option<String> {
        let mut current = node;

        for _ in 0..self.config.framework_depth {
            if let Some(sibling) = self.dom.previous_element_sibling(current) {
                if self.is_label_like(sibling, node) {
                    let text = self.label_text(sibling);
                    if !text.trim().is_empty() {
                        return Some(text);
                    }
                }
            }

            let parent = self.dom.parent(current).filter(|p| self.dom.is_element(*p))?;
            if let Some(text) = self.framework_class_label(parent, node) {
                return Some(text);
            }
            current = parent;
        }

        None
    }

    /// Nearest text by box-center distance. Needs geometry on both sides.
    pub fn proximity_label(&self, node: NodeId) -> Option<String> {
        let target = self.dom.bounding_box(node)?;
        let root = self.dom.tree_root(node);
        let mut best: Option<(f32, String)> = None;

        for text_node in self.dom.text_nodes(root) {
            let Some(raw) = self.dom.text(text_node).map(str::trim) else {
                continue;
            };
            if raw.is_empty() || self.dom.is_descendant_of(text_node, node) {
                continue;
            }
            if self.inside_control(text_node) {
                continue;
            }
            if !self.dom.computed_visibility(text_node).is_visible() {
                continue;
            }
            let Some(rect) = self.dom.bounding_box(text_node) else {
                continue;
            };

            let distance = rect.center_distance(&target);
            let cutoff = if COLON_LABEL.is_match(raw) {
                self.config.colon_label_distance
            } else {
                self.config.proximity_distance
            };
            if distance > cutoff {
                continue;
            }

            if best.as_ref().is_none_or(|(d, _)| distance < *d) {
                best = Some((distance, raw.to_string()));
            }
        }

        best.map(|(_, text)| text)
    }

    /// `placeholder`, `title`, `name`, `id`, humanized.
    pub fn attribute_label(&self, node: NodeId) -> Option<String> {
        ["placeholder", "title", "name", "id"]
            .iter()
            .find_map(|attr| self.dom.non_empty_attribute(node, attr))
            .map(humanize_identifier)
            .filter(|t| !t.is_empty())
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    /// Text under `node`, skipping nested controls and their options.
    pub fn label_text(&self, node: NodeId) -> String {
        let mut parts = Vec::new();
        let mut stack: Vec<NodeId> = self.dom.children(node).iter().rev().copied().collect();

        while let Some(current) = stack.pop() {
            if let Some(text) = self.dom.text(current) {
                let text = text.trim();
                if !text.is_empty() {
                    parts.push(text);
                }
                continue;
            }
            let is_control_text = self
                .dom
                .tag_name(current)
                .is_some_and(|t| CONTROL_TEXT_TAGS.contains(&t));
            if is_control_text || control_kind(self.dom, current).is_some() {
                continue;
            }
            stack.extend(self.dom.children(current).iter().rev().copied());
        }

        parts.join(" ")
    }

    fn inside_control(&self, text_node: NodeId) -> bool {
        self.dom.ancestors(text_node).into_iter().any(|a| {
            self.dom
                .tag_name(a)
                .is_some_and(|t| CONTROL_TEXT_TAGS.contains(&t))
        })
    }

    fn is_cell(&self, node: NodeId) -> bool {
        self.dom.has_tag(node, "td") || self.dom.has_tag(node, "th")
    }

    fn row_cells(&self, row: NodeId) -> Vec<NodeId> {
        self.dom
            .element_children(row)
            .into_iter()
            .filter(|c| self.is_cell(*c))
            .collect()
    }

    fn colspan(&self, cell: NodeId) -> usize {
        self.dom
            .attribute(cell, "colspan")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(1)
    }

    fn column_offset(&self, preceding: &[NodeId]) -> usize {
        preceding.iter().map(|c| self.colspan(*c)).sum()
    }

    /// `thead` row, else the first row made only of `th` cells.
    fn header_row(&self, table: NodeId) -> Option<NodeId> {
        let rows = self.dom.query_all(table, "tr").ok()?;

        if let Some(row) = rows
            .iter()
            .copied()
            .find(|r| self.dom.closest(*r, "thead").is_some())
        {
            return Some(row);
        }

        rows.into_iter().find(|r| {
            let cells = self.row_cells(*r);
            !cells.is_empty() && cells.iter().all(|c| self.dom.has_tag(*c, "th"))
        })
    }

    /// A `label` (not pointing at or wrapping some other control) or an
    /// element whose class mentions "label".
    fn is_label_like(&self, candidate: NodeId, control: NodeId) -> bool {
        if control_kind(self.dom, candidate).is_some() {
            return false;
        }

        let wraps_control = self
            .dom
            .descendants(candidate)
            .into_iter()
            .any(|n| control_kind(self.dom, n).is_some());
        if wraps_control {
            return false;
        }

        if self.dom.has_tag(candidate, "label") {
            return match self.dom.non_empty_attribute(candidate, "for") {
                Some(target) => self.dom.attribute(control, "id").map(str::trim) == Some(target),
                None => true,
            };
        }

        self.dom
            .classes(candidate)
            .iter()
            .any(|c| c.to_ascii_lowercase().contains("label"))
    }

    /// Framework label class under `container`, preferring the closest one
    /// before the control in document order.
    fn framework_class_label(&self, container: NodeId, control: NodeId) -> Option<String> {
        let labels = self.dom.query_all(container, FRAMEWORK_LABEL_SELECTOR).ok()?;
        if labels.is_empty() {
            return None;
        }

        let order = self.dom.descendants(container);
        let position = |n: NodeId| order.iter().position(|o| *o == n).unwrap_or(usize::MAX);
        let control_pos = position(control);

        let (before, after): (Vec<NodeId>, Vec<NodeId>) = labels
            .into_iter()
            .filter(|l| !self.dom.is_descendant_of(control, *l))
            .partition(|l| position(*l) < control_pos);

        before
            .into_iter()
            .rev()
            .chain(after)
            .map(|l| self.label_text(l))
            .find(|t| !t.trim().is_empty())
    }
}
