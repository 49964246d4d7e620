use tracing::debug;

use crate::error::DetectionError;
use crate::field::classifier::eligible_controls;
use crate::field::field_model::{DEFAULT_LABEL_CHAIN, DetectionMethod, FieldCandidate};
use crate::phase::phase_model::{DetectionPhase, PhaseContext};

/// Last resort: every eligible control on the page, only when the earlier
/// phases came up nearly empty.
pub struct FallbackAllPhase;

impl DetectionPhase for FallbackAllPhase {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::FallbackAll
    }

    fn primary_capable(&self) -> bool {
        true
    }

    fn detect(&self, ctx: &PhaseContext<'_>) -> Result<Vec<FieldCandidate>, DetectionError> {
        if ctx.found_so_far.len() >= ctx.config.fallback_below {
            debug!(found = ctx.found_so_far.len(), "Skipping fallback");
            return Ok(Vec::new());
        }

        let dom = ctx.dom;
        let root = dom.document_root();
        let mut nodes = eligible_controls(dom, root)?;
        nodes.extend(ctx.aria_widgets(root)?);

        let builder = ctx.builder();
        Ok(nodes
            .into_iter()
            .filter_map(|n| builder.build(n, self.method(), &DEFAULT_LABEL_CHAIN))
            .collect())
    }
}
