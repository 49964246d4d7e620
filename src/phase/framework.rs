use std::collections::HashSet;

use crate::error::DetectionError;
use crate::field::classifier::{control_kind, eligible_controls, is_eligible};
use crate::field::field_model::{DEFAULT_LABEL_CHAIN, DetectionMethod, FieldCandidate};
use crate::phase::phase_model::{DetectionPhase, PhaseContext};

/// Markers SPA frameworks and UI kits leave on fields or their wrappers.
pub const FRAMEWORK_SELECTOR: &str =
    "[data-input], [data-field], .form-control, [ng-model], [v-model], [formcontrolname]";

pub struct FrameworkPhase;

impl DetectionPhase for FrameworkPhase {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::Framework
    }

    fn detect(&self, ctx: &PhaseContext<'_>) -> Result<Vec<FieldCandidate>, DetectionError> {
        let dom = ctx.dom;
        let builder = ctx.builder();
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        for marked in dom.query_all(dom.document_root(), FRAMEWORK_SELECTOR)? {
            // Wrappers resolve to the first control inside them
            let target = if control_kind(dom, marked).is_some() {
                Some(marked)
            } else {
                eligible_controls(dom, marked)?.into_iter().next()
            };

            let Some(target) = target.filter(|t| is_eligible(dom, *t)) else {
                continue;
            };
            if !seen.insert(target) {
                continue;
            }
            if let Some(candidate) = builder.build(target, self.method(), &DEFAULT_LABEL_CHAIN) {
                out.push(candidate);
            }
        }

        Ok(out)
    }
}
