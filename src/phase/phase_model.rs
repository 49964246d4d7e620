use crate::config::DetectorConfig;
use crate::dom::dom_model::{Dom, NodeId};
use crate::error::DetectionError;
use crate::field::builder::CandidateBuilder;
use crate::field::classifier::{aria_role, is_eligible, is_native_control};
use crate::field::field_model::{DetectionMethod, FieldCandidate};

// ============================================================================
// Phase contract
// ============================================================================

/// Read-only input of one phase.
pub struct PhaseContext<'a> {
    pub dom: &'a dyn Dom,
    pub config: &'a DetectorConfig,
    /// Candidates merged by earlier phases, in discovery order
    pub found_so_far: &'a [FieldCandidate],
}

impl<'a> PhaseContext<'a> {
    pub fn builder(&self) -> CandidateBuilder<'a> {
        CandidateBuilder::new(self.dom, self.config)
    }

    /// Eligible elements carrying an input role that are not native controls.
    pub fn aria_widgets(&self, scope: NodeId) -> Result<Vec<NodeId>, DetectionError> {
        Ok(self
            .dom
            .query_all(scope, "[role]")?
            .into_iter()
            .filter(|n| aria_role(self.dom, *n).is_some())
            .filter(|n| !is_native_control(self.dom, *n))
            .filter(|n| is_eligible(self.dom, *n))
            .collect())
    }
}

/// One detection strategy. Phases never see each other's output except
/// through `found_so_far`, and never mutate shared state.
pub trait DetectionPhase {
    fn method(&self) -> DetectionMethod;

    /// Whether a non-empty result can make this the run's primary method.
    fn primary_capable(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        self.method().as_str()
    }

    fn detect(&self, ctx: &PhaseContext<'_>) -> Result<Vec<FieldCandidate>, DetectionError>;
}
