use crate::config::DetectorConfig;
use crate::dom::dom_model::{Dom, NodeId};
use crate::field::classifier::{control_kind, is_required};
use crate::field::field_model::{DetectionMethod, FieldCandidate, LabelStrategy};
use crate::field::identity::field_identity;
use crate::field::label::LabelResolver;
use crate::field::normalize::humanize_identifier;
use crate::field::scorer::ConfidenceScorer;
use crate::field::type_deriver::derive_type;

/// Label used when no strategy and no identifier produced anything.
pub const DEFAULT_LABEL: &str = "Field";

/// Runs label → type → score for one control and assembles the candidate.
pub struct CandidateBuilder<'a> {
    dom: &'a dyn Dom,
    config: &'a DetectorConfig,
}

impl<'a> CandidateBuilder<'a> {
    pub fn new(dom: &'a dyn Dom, config: &'a DetectorConfig) -> Self {
        Self { dom, config }
    }

    pub fn labels(&self) -> LabelResolver<'a> {
        LabelResolver::new(self.dom, &self.config.label)
    }

    /// `None` when `node` is not a control at all.
    pub fn build(
        &self,
        node: NodeId,
        method: DetectionMethod,
        chain: &[LabelStrategy],
    ) -> Option<FieldCandidate> {
        let dom = self.dom;
        let kind = control_kind(dom, node)?;

        let resolved = self.labels().resolve_with(node, chain);
        let type_match = derive_type(dom, node, &kind, &resolved.text);
        let score = ConfidenceScorer::new(dom, &self.config.weights, &self.config.boosts).score(
            node,
            &kind,
            type_match.semantic_type,
            &resolved,
        );

        let label = if resolved.text.is_empty() {
            self.fallback_label(node)
        } else {
            resolved.text.clone()
        };

        let mut evidence = vec![format!("detected by {} at {}", method, dom.dom_path(node))];
        evidence.extend(resolved.evidence);
        evidence.push(type_match.evidence);
        evidence.push(score.summary());

        Some(FieldCandidate {
            identity: field_identity(dom, node),
            html_kind: kind.to_string(),
            label,
            label_source: resolved.source,
            semantic_type: type_match.semantic_type,
            required: is_required(dom, node),
            confidence: score.confidence,
            detection_method: method,
            in_shadow_dom: dom.is_in_shadow_tree(node),
            placeholder: dom.non_empty_attribute(node, "placeholder").map(str::to_string),
            evidence,
            type_locked: false,
        })
    }

    fn fallback_label(&self, node: NodeId) -> String {
        ["name", "id"]
            .iter()
            .find_map(|attr| self.dom.non_empty_attribute(node, attr))
            .map(humanize_identifier)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_LABEL.to_string())
    }
}
