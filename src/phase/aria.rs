use crate::error::DetectionError;
use crate::field::field_model::{DEFAULT_LABEL_CHAIN, DetectionMethod, FieldCandidate};
use crate::phase::phase_model::{DetectionPhase, PhaseContext};

/// Custom widgets declared through ARIA roles.
pub struct AriaRolePhase;

impl DetectionPhase for AriaRolePhase {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::Aria
    }

    fn detect(&self, ctx: &PhaseContext<'_>) -> Result<Vec<FieldCandidate>, DetectionError> {
        let builder = ctx.builder();
        Ok(ctx
            .aria_widgets(ctx.dom.document_root())?
            .into_iter()
            .filter_map(|n| builder.build(n, self.method(), &DEFAULT_LABEL_CHAIN))
            .collect())
    }
}
