use crate::dom::dom_model::{Dom, NodeId};
use crate::error::DetectionError;
use crate::field::field_model::ControlKind;

/// ARIA roles that make an arbitrary element an input.
pub const ARIA_INPUT_ROLES: [&str; 8] = [
    "textbox",
    "combobox",
    "listbox",
    "checkbox",
    "radio",
    "spinbutton",
    "slider",
    "searchbox",
];

/// `<input>` types that never carry user data.
pub const EXCLUDED_INPUT_TYPES: [&str; 5] = ["hidden", "submit", "button", "reset", "image"];

/// Native controls plus editable regions. ARIA widgets are found separately.
pub const CONTROL_SELECTOR: &str = "input, select, textarea, [contenteditable]";

/// What kind of control `node` is, if any.
pub fn control_kind(dom: &dyn Dom, node: NodeId) -> Option<ControlKind> {
    match dom.tag_name(node)? {
        "input" => {
            let ty = dom
                .attribute(node, "type")
                .map(|t| t.trim().to_ascii_lowercase())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "text".to_string());
            Some(ControlKind::Input(ty))
        }
        "textarea" => Some(ControlKind::TextArea),
        "select" => Some(ControlKind::Select),
        _ if is_content_editable(dom, node) => Some(ControlKind::ContentEditable),
        _ => aria_role(dom, node).map(ControlKind::Aria),
    }
}

pub fn is_native_control(dom: &dyn Dom, node: NodeId) -> bool {
    matches!(dom.tag_name(node), Some("input" | "select" | "textarea"))
}

/// Recognized input role, lower-cased.
pub fn aria_role(dom: &dyn Dom, node: NodeId) -> Option<String> {
    let role = dom.attribute(node, "role")?.split_whitespace().next()?;
    let role = role.to_ascii_lowercase();
    ARIA_INPUT_ROLES.contains(&role.as_str()).then_some(role)
}

fn is_content_editable(dom: &dyn Dom, node: NodeId) -> bool {
    dom.attribute(node, "contenteditable")
        .map(|v| v.trim().to_ascii_lowercase())
        .is_some_and(|v| matches!(v.as_str(), "" | "true" | "plaintext-only"))
}

pub fn is_aria_hidden(dom: &dyn Dom, node: NodeId) -> bool {
    dom.attribute(node, "aria-hidden")
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

/// Explicit markup only: `required` or `aria-required="true"`.
pub fn is_required(dom: &dyn Dom, node: NodeId) -> bool {
    dom.attribute(node, "required").is_some()
        || dom
            .attribute(node, "aria-required")
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

/// Rendered and occupying space. Tiny or zero-size file inputs pass: they
/// are usually hidden behind a styled button.
pub fn is_visible(dom: &dyn Dom, node: NodeId, kind: &ControlKind) -> bool {
    if !dom.computed_visibility(node).is_visible() {
        return false;
    }

    match dom.bounding_box(node) {
        Some(rect) if rect.is_empty() => kind.is_file(),
        _ => true,
    }
}

/// Whether `node` is a user-meaningful input right now.
pub fn is_eligible(dom: &dyn Dom, node: NodeId) -> bool {
    let Some(kind) = control_kind(dom, node) else {
        return false;
    };

    if let Some(ty) = kind.input_type() {
        if EXCLUDED_INPUT_TYPES.contains(&ty) {
            return false;
        }
    }

    if !is_visible(dom, node, &kind) {
        return false;
    }

    !is_aria_hidden(dom, node)
}

/// Eligible native/editable controls under `scope`, in document order.
pub fn eligible_controls(dom: &dyn Dom, scope: NodeId) -> Result<Vec<NodeId>, DetectionError> {
    Ok(dom
        .query_all(scope, CONTROL_SELECTOR)?
        .into_iter()
        .filter(|n| is_eligible(dom, *n))
        .collect())
}
