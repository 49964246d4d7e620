pub mod aria;
pub mod fallback;
pub mod framework;
pub mod login;
pub mod phase_model;
pub mod proximity;
pub mod shadow;
pub mod standard;
pub mod table;

use crate::phase::phase_model::DetectionPhase;

/// The eight phases in run order.
pub fn default_phases() -> Vec<Box<dyn DetectionPhase>> {
    vec![
        Box::new(standard::StandardFormPhase),
        Box::new(table::TableLayoutPhase),
        Box::new(aria::AriaRolePhase),
        Box::new(framework::FrameworkPhase),
        Box::new(proximity::ProximityPhase),
        Box::new(login::LoginPairPhase),
        Box::new(shadow::ShadowDomPhase),
        Box::new(fallback::FallbackAllPhase),
    ]
}
