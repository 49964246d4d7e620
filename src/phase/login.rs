use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::dom::dom_model::{Dom, NodeId};
use crate::error::DetectionError;
use crate::field::classifier::{control_kind, eligible_controls};
use crate::field::field_model::{
    DEFAULT_LABEL_CHAIN, DetectionMethod, FieldCandidate, SemanticType,
};
use crate::phase::phase_model::{DetectionPhase, PhaseContext};

/// Tags that commonly wrap a sign-in widget.
const CONTAINER_TAGS: [&str; 4] = ["form", "div", "fieldset", "section"];

/// Input types a username can be typed into.
const TEXT_LIKE_TYPES: [&str; 3] = ["text", "email", "tel"];

/// Attributes inspected for username hints.
const USERNAME_HINT_ATTRS: [&str; 5] = ["name", "id", "placeholder", "autocomplete", "aria-label"];

static USERNAME_HINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)user|login|e-?mail|account|signin|\buid\b").expect("Invalid username hint pattern")
});

static LOGIN_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)log-?in|sign-?in").expect("Invalid login class pattern"));

/// Pairs every password input with the username field sharing its
/// smallest enclosing container.
pub struct LoginPairPhase;

impl DetectionPhase for LoginPairPhase {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::LoginPattern
    }

    fn primary_capable(&self) -> bool {
        true
    }

    fn detect(&self, ctx: &PhaseContext<'_>) -> Result<Vec<FieldCandidate>, DetectionError> {
        let dom = ctx.dom;
        let weights = &ctx.config.weights;
        let builder = ctx.builder();
        let mut out = Vec::new();

        let passwords: Vec<NodeId> = eligible_controls(dom, dom.document_root())?
            .into_iter()
            .filter(|n| is_input_of(dom, *n, &["password"]))
            .collect();

        for password in passwords {
            let Some(mut password_field) =
                builder.build(password, self.method(), &DEFAULT_LABEL_CHAIN)
            else {
                continue;
            };
            if password_field.semantic_type == SemanticType::ConfirmPassword {
                continue;
            }

            let Some(container) = login_container(dom, password)? else {
                debug!(password = %password_field.key(), "No login container");
                continue;
            };
            let Some(username) = username_in(dom, container, password)? else {
                continue;
            };
            let Some(mut username_field) =
                builder.build(username, self.method(), &DEFAULT_LABEL_CHAIN)
            else {
                continue;
            };

            if !is_input_of(dom, username, &["email"]) {
                username_field.semantic_type = SemanticType::Username;
            }
            username_field.type_locked = true;
            username_field.confidence = username_field.confidence.max(weights.login_username);
            username_field.required = true;
            username_field
                .evidence
                .push(format!("login pair: username for {}", password_field.key()));

            password_field.confidence = password_field.confidence.max(weights.login_password);
            password_field.required = true;
            password_field.type_locked = true;
            password_field
                .evidence
                .push(format!("login pair: password for {}", username_field.key()));

            out.push(username_field);
            out.push(password_field);
        }

        Ok(out)
    }
}

fn is_input_of(dom: &dyn Dom, node: NodeId, types: &[&str]) -> bool {
    control_kind(dom, node)
        .and_then(|k| k.input_type().map(|t| types.contains(&t)))
        .unwrap_or(false)
}

fn text_like_inputs(dom: &dyn Dom, container: NodeId) -> Result<Vec<NodeId>, DetectionError> {
    Ok(eligible_controls(dom, container)?
        .into_iter()
        .filter(|n| is_input_of(dom, *n, &TEXT_LIKE_TYPES))
        .collect())
}

fn is_candidate_container(dom: &dyn Dom, node: NodeId) -> bool {
    dom.tag_name(node)
        .is_some_and(|t| CONTAINER_TAGS.contains(&t))
        || dom.classes(node).iter().any(|c| LOGIN_CLASS.is_match(c))
}

/// Smallest qualifying ancestor by rendered area. Unknown geometry counts
/// as infinitely large; ties keep the innermost.
fn login_container(dom: &dyn Dom, password: NodeId) -> Result<Option<NodeId>, DetectionError> {
    let mut best: Option<(f32, NodeId)> = None;

    for ancestor in dom.ancestors(password) {
        if !is_candidate_container(dom, ancestor) {
            continue;
        }
        if text_like_inputs(dom, ancestor)?.is_empty() {
            continue;
        }
        let area = dom
            .bounding_box(ancestor)
            .map(|r| r.area())
            .unwrap_or(f32::INFINITY);
        if best.is_none_or(|(a, _)| area < a) {
            best = Some((area, ancestor));
        }
    }

    Ok(best.map(|(_, node)| node))
}

/// A hinted text-like input, else the last text-like input before the
/// password.
fn username_in(
    dom: &dyn Dom,
    container: NodeId,
    password: NodeId,
) -> Result<Option<NodeId>, DetectionError> {
    let inputs = text_like_inputs(dom, container)?;

    let hinted = inputs.iter().copied().find(|n| {
        USERNAME_HINT_ATTRS
            .iter()
            .filter_map(|attr| dom.attribute(*n, attr))
            .any(|v| USERNAME_HINT.is_match(v))
    });
    if hinted.is_some() {
        return Ok(hinted);
    }

    let order = dom.descendants(container);
    let position = |n: NodeId| order.iter().position(|o| *o == n);
    let Some(password_pos) = position(password) else {
        return Ok(None);
    };

    Ok(inputs
        .into_iter()
        .filter(|n| position(*n).is_some_and(|p| p < password_pos))
        .last())
}
