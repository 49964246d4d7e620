use crate::error::DetectionError;
use crate::field::classifier::eligible_controls;
use crate::field::field_model::{DetectionMethod, FieldCandidate, TABLE_LABEL_CHAIN};
use crate::phase::phase_model::{DetectionPhase, PhaseContext};

/// Tables used as form layout need at least this many controls.
const MIN_TABLE_CONTROLS: usize = 2;

pub struct TableLayoutPhase;

impl DetectionPhase for TableLayoutPhase {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::Table
    }

    fn primary_capable(&self) -> bool {
        true
    }

    fn detect(&self, ctx: &PhaseContext<'_>) -> Result<Vec<FieldCandidate>, DetectionError> {
        let dom = ctx.dom;
        let builder = ctx.builder();
        let mut out = Vec::new();

        for table in dom.query_all(dom.document_root(), "table")? {
            let controls = eligible_controls(dom, table)?;
            if controls.len() < MIN_TABLE_CONTROLS {
                continue;
            }
            out.extend(
                controls
                    .into_iter()
                    .filter_map(|n| builder.build(n, self.method(), &TABLE_LABEL_CHAIN)),
            );
        }

        Ok(out)
    }
}
