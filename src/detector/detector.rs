use std::collections::HashMap;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::config::DetectorConfig;
use crate::detector::context::FormContext;
use crate::detector::form_type::{classify_form_type, page_keywords};
use crate::detector::insights::analyze;
use crate::detector::merge::{CandidateSet, filter_by_threshold, rank};
use crate::dom::dom_model::Dom;
use crate::error::DetectionError;
use crate::phase::default_phases;
use crate::phase::phase_model::{DetectionPhase, PhaseContext};
use crate::trace::logger::TraceLogger;
use crate::trace::trace::TraceEvent;

// ============================================================================
// Orchestrator
// ============================================================================

/// Runs the phases over a document and reduces their output to a ranked,
/// thresholded `FormContext`.
///
/// A detector is an explicit value: no global state, nothing cached between
/// runs. The evidence map is rebuilt on every `detect` call.
pub struct FieldDetector {
    config: DetectorConfig,
    phases: Vec<Box<dyn DetectionPhase>>,
    evidence: HashMap<String, Vec<String>>,
    tracer: Option<TraceLogger>,
    runs: u64,
}

impl FieldDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self::with_phases(config, default_phases())
    }

    /// Custom phase list, run in the given order.
    pub fn with_phases(config: DetectorConfig, phases: Vec<Box<dyn DetectionPhase>>) -> Self {
        Self {
            config,
            phases,
            evidence: HashMap::new(),
            tracer: None,
            runs: 0,
        }
    }

    pub fn with_tracer(mut self, tracer: TraceLogger) -> Self {
        self.tracer = Some(tracer);
        self
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Never fails: detection-wide errors come back in `FormContext::error`.
    pub fn detect(&mut self, dom: &dyn Dom) -> FormContext {
        let started = Instant::now();
        self.evidence.clear();
        self.runs += 1;

        match self.run(dom, started) {
            Ok(context) => context,
            Err(e) => {
                error!("Detection failed: {}", e);
                FormContext::failed(
                    e,
                    self.config.active_threshold(),
                    started.elapsed().as_millis() as u64,
                )
            }
        }
    }

    /// Diagnostic trail of the last run for a candidate key (`name#id`),
    /// including candidates that were filtered out.
    pub fn evidence_for(&self, key: &str) -> Option<&[String]> {
        self.evidence.get(key).map(Vec::as_slice)
    }

    fn run(&mut self, dom: &dyn Dom, started: Instant) -> Result<FormContext, DetectionError> {
        let mut set = CandidateSet::new();
        let mut primary = None;
        let mut methods = Vec::new();
        let mut events = Vec::with_capacity(self.phases.len());

        for phase in &self.phases {
            let phase_started = Instant::now();
            let method = phase.method();
            let ctx = PhaseContext {
                dom,
                config: &self.config,
                found_so_far: set.as_slice(),
            };

            let mut event = TraceEvent::now(self.runs, method);
            match phase.detect(&ctx) {
                Ok(candidates) => {
                    let produced = candidates.len();
                    let outcome = set.merge(candidates);
                    debug!(
                        phase = phase.name(),
                        produced,
                        added = outcome.added,
                        replaced = outcome.replaced,
                        "Phase complete"
                    );

                    if produced > 0 {
                        if !methods.contains(&method) {
                            methods.push(method);
                        }
                        if primary.is_none() && phase.primary_capable() {
                            primary = Some(method);
                        }
                    }
                    event = event.with_counts(produced, outcome.added, outcome.replaced);
                }
                Err(e) => {
                    warn!(phase = phase.name(), "Phase failed, continuing: {}", e);
                    event = event.with_error(&e);
                }
            }

            events.push(event.with_elapsed(phase_started.elapsed().as_millis()));
        }

        if let Some(tracer) = &self.tracer {
            tracer.log_run(&events);
        }

        let raw = set.into_vec();
        for candidate in &raw {
            self.evidence
                .insert(candidate.key(), candidate.evidence.clone());
        }

        let mut threshold = self.config.active_threshold();
        let mut fields = filter_by_threshold(&raw, threshold);
        let mut lenient_fallback = false;

        if fields.len() < self.config.min_fields
            && raw.len() >= self.config.min_fields
            && self.config.lenient_threshold < threshold
        {
            info!(
                kept = fields.len(),
                raw = raw.len(),
                "Too few fields above {:.2}, retrying at {:.2}",
                threshold,
                self.config.lenient_threshold
            );
            threshold = self.config.lenient_threshold;
            fields = filter_by_threshold(&raw, threshold);
            lenient_fallback = true;
        }

        rank(&mut fields);

        let keywords = page_keywords(dom)?;
        let form_type = classify_form_type(&fields, &keywords);
        let insights = analyze(&fields, form_type);

        info!(
            fields = fields.len(),
            raw = raw.len(),
            form_type = %form_type,
            "Detection complete"
        );

        Ok(FormContext {
            filtered_field_count: fields.len(),
            raw_field_count: raw.len(),
            fields,
            form_type,
            form_purpose: form_type.purpose().to_string(),
            detection_method: primary,
            detection_methods: methods,
            timing_ms: started.elapsed().as_millis() as u64,
            threshold_used: threshold,
            lenient_fallback,
            insights,
            error: None,
        })
    }
}
