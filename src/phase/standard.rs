use tracing::debug;

use crate::error::DetectionError;
use crate::field::classifier::eligible_controls;
use crate::field::field_model::{DEFAULT_LABEL_CHAIN, DetectionMethod, FieldCandidate};
use crate::phase::phase_model::{DetectionPhase, PhaseContext};

/// The `<form>` holding the most eligible controls, taken whole.
pub struct StandardFormPhase;

impl DetectionPhase for StandardFormPhase {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::Standard
    }

    fn primary_capable(&self) -> bool {
        true
    }

    fn detect(&self, ctx: &PhaseContext<'_>) -> Result<Vec<FieldCandidate>, DetectionError> {
        let dom = ctx.dom;
        let forms = dom.query_all(dom.document_root(), "form")?;

        let mut best: Option<Vec<_>> = None;
        for form in forms {
            let controls = eligible_controls(dom, form)?;
            if best.as_ref().is_none_or(|b| controls.len() > b.len()) {
                best = Some(controls);
            }
        }

        let Some(controls) = best.filter(|c| !c.is_empty()) else {
            debug!("No form with eligible controls");
            return Ok(Vec::new());
        };

        let builder = ctx.builder();
        Ok(controls
            .into_iter()
            .filter_map(|n| builder.build(n, self.method(), &DEFAULT_LABEL_CHAIN))
            .collect())
    }
}
