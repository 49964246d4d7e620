use crate::error::DetectionError;
use crate::field::classifier::eligible_controls;
use crate::field::field_model::{DetectionMethod, FieldCandidate, PROXIMITY_LABEL_CHAIN};
use crate::phase::phase_model::{DetectionPhase, PhaseContext};

/// Labels by layout alone, for pages without labelling markup.
pub struct ProximityPhase;

impl DetectionPhase for ProximityPhase {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::Proximity
    }

    fn detect(&self, ctx: &PhaseContext<'_>) -> Result<Vec<FieldCandidate>, DetectionError> {
        let dom = ctx.dom;
        let builder = ctx.builder();
        let labels = builder.labels();

        Ok(eligible_controls(dom, dom.document_root())?
            .into_iter()
            .filter(|n| labels.proximity_label(*n).is_some())
            .filter_map(|n| builder.build(n, self.method(), &PROXIMITY_LABEL_CHAIN))
            .collect())
    }
}
