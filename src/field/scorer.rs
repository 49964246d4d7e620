use crate::config::{ConfidenceBoost, ScoringWeights};
use crate::dom::dom_model::{Dom, NodeId};
use crate::field::classifier::{is_aria_hidden, is_required};
use crate::field::field_model::{ControlKind, LabelStrategy, SemanticType};
use crate::field::label::ResolvedLabel;
use crate::field::normalize::humanize_identifier;
use crate::field::type_deriver::pattern_score;

/// Input types that say more than "some text goes here".
const SPECIFIC_INPUT_TYPES: [&str; 8] = [
    "email", "password", "tel", "date", "number", "file", "checkbox", "radio",
];

/// Utility classes that hide an element or mark it as screen-reader-only.
const HIDDEN_CLASSES: [&str; 5] = [
    "hidden",
    "invisible",
    "display-none",
    "sr-only",
    "visually-hidden",
];

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBreakdown {
    pub confidence: f32,
    /// Signed adjustments in the order they were applied
    pub adjustments: Vec<String>,
}

impl ScoreBreakdown {
    pub fn summary(&self) -> String {
        format!(
            "confidence {:.2}: {}",
            self.confidence,
            self.adjustments.join(", ")
        )
    }
}

/// Additive heuristic confidence model.
pub struct ConfidenceScorer<'a> {
    dom: &'a dyn Dom,
    weights: &'a ScoringWeights,
    boosts: &'a [ConfidenceBoost],
}

impl<'a> ConfidenceScorer<'a> {
    pub fn new(dom: &'a dyn Dom, weights: &'a ScoringWeights, boosts: &'a [ConfidenceBoost]) -> Self {
        Self { dom, weights, boosts }
    }

    pub fn score(
        &self,
        node: NodeId,
        kind: &ControlKind,
        semantic_type: SemanticType,
        label: &ResolvedLabel,
    ) -> ScoreBreakdown {
        let w = self.weights;
        let dom = self.dom;
        let mut t = Tally {
            score: w.base,
            adjustments: vec![format!("base {:.2}", w.base)],
        };

        let required = is_required(dom, node);

        // Markup signals
        if dom.non_empty_attribute(node, "name").is_some() {
            t.add(w.name, "name");
        }
        if dom.non_empty_attribute(node, "id").is_some() {
            t.add(w.id, "id");
        }
        if dom.non_empty_attribute(node, "placeholder").is_some() {
            t.add(w.placeholder, "placeholder");
        }
        if required {
            t.add(w.required, "required");
        }
        if let Some(bonus) = self.label_bonus(node, label) {
            t.add(bonus, "label");
        }
        if is_specific_kind(kind) {
            t.add(w.specific_type, "specific type");
        }

        // Prior for the inferred type
        if let Some(prior) = pattern_score(semantic_type) {
            t.score = (t.score + prior) / 2.0;
            t.adjustments.push(format!("blend with {} prior {:.2}", semantic_type, prior));
        }

        // Context
        if dom.closest(node, "form").is_some() {
            t.add(w.in_form, "inside form");
        }
        if kind.is_file() {
            t.add(w.file_input, "file input");
        }
        if is_choice(kind) {
            t.add(w.choice_input, "checkbox/radio");
        }
        if *kind == ControlKind::TextArea {
            t.add(w.textarea, "textarea");
        }

        // Penalties
        if !kind.is_file() {
            if let Some(rect) = dom.bounding_box(node) {
                if rect.width < w.tiny_box_px || rect.height < w.tiny_box_px {
                    t.add(-w.tiny_box_penalty, "tiny box");
                }
            }
        }
        let locked = dom.attribute(node, "readonly").is_some()
            || dom.attribute(node, "disabled").is_some();
        if locked && !required {
            t.add(-w.decorative_penalty, "readonly/disabled");
        }
        if dom.has_class(node, "disabled") {
            t.add(-w.decorative_penalty, "disabled class");
        }
        if dom.attribute(node, "tabindex").map(str::trim) == Some("-1") {
            t.add(-w.decorative_penalty, "tabindex -1");
        }
        if is_aria_hidden(dom, node) {
            t.add(-w.decorative_penalty, "aria-hidden");
        }
        for class in HIDDEN_CLASSES {
            if dom.has_class(node, class) {
                t.add(-w.hidden_class_penalty, &format!("class {}", class));
            }
        }

        // Learned boosts
        let label_lower = label.text.to_lowercase();
        for boost in self.boosts {
            let pattern = boost.pattern.trim().to_lowercase();
            if !pattern.is_empty() && label_lower.contains(&pattern) {
                t.add(boost.boost, &format!("learned \"{}\"", boost.pattern));
            }
        }

        ScoreBreakdown {
            confidence: t.score.clamp(0.0, 1.0),
            adjustments: t.adjustments,
        }
    }

    /// Bonus for a label that came from real markup and says more than the
    /// element's own name/id.
    fn label_bonus(&self, node: NodeId, label: &ResolvedLabel) -> Option<f32> {
        let bonus = match label.source? {
            LabelStrategy::Explicit
            | LabelStrategy::Ancestor
            | LabelStrategy::Table
            | LabelStrategy::Aria => self.weights.explicit_label,
            LabelStrategy::Framework => self.weights.framework_label,
            LabelStrategy::Proximity => self.weights.proximity_label,
            LabelStrategy::Attribute => return None,
        };

        let text = label.text.trim().to_lowercase();
        let repeats_identifier = ["name", "id"].iter().any(|attr| {
            self.dom.non_empty_attribute(node, attr).is_some_and(|value| {
                text == value.to_lowercase() || text == humanize_identifier(value).to_lowercase()
            })
        });

        (!repeats_identifier).then_some(bonus)
    }
}

struct Tally {
    score: f32,
    adjustments: Vec<String>,
}

impl Tally {
    fn add(&mut self, delta: f32, reason: &str) {
        self.score += delta;
        self.adjustments.push(format!("{:+.2} {}", delta, reason));
    }
}

fn is_specific_kind(kind: &ControlKind) -> bool {
    match kind {
        ControlKind::Input(ty) => SPECIFIC_INPUT_TYPES.contains(&ty.as_str()),
        ControlKind::TextArea | ControlKind::Select => true,
        _ => false,
    }
}

fn is_choice(kind: &ControlKind) -> bool {
    match kind {
        ControlKind::Input(ty) => ty == "checkbox" || ty == "radio",
        ControlKind::Aria(role) => role == "checkbox" || role == "radio",
        _ => false,
    }
}
