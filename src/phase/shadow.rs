use crate::error::DetectionError;
use crate::field::classifier::eligible_controls;
use crate::field::field_model::{DEFAULT_LABEL_CHAIN, DetectionMethod, FieldCandidate};
use crate::phase::phase_model::{DetectionPhase, PhaseContext};

/// Controls inside open shadow roots, nested hosts included.
pub struct ShadowDomPhase;

impl DetectionPhase for ShadowDomPhase {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::ShadowDom
    }

    fn detect(&self, ctx: &PhaseContext<'_>) -> Result<Vec<FieldCandidate>, DetectionError> {
        let dom = ctx.dom;
        let builder = ctx.builder();
        let mut out = Vec::new();

        for host in dom.shadow_hosts() {
            let Some(root) = dom.shadow_root(host) else {
                continue;
            };

            let mut nodes = eligible_controls(dom, root)?;
            nodes.extend(ctx.aria_widgets(root)?);

            for node in nodes {
                if let Some(mut candidate) = builder.build(node, self.method(), &DEFAULT_LABEL_CHAIN) {
                    candidate.in_shadow_dom = true;
                    out.push(candidate);
                }
            }
        }

        Ok(out)
    }
}
