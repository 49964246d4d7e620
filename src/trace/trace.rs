use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::field::field_model::DetectionMethod;

/// One JSONL line per phase execution.
#[derive(Debug, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: u128,
    /// Run counter of the detector that emitted the event
    pub run: u64,

    pub phase: String,

    pub produced: usize,
    pub added: usize,
    pub replaced: usize,

    pub elapsed_ms: u128,
    pub error: Option<String>,
}

impl TraceEvent {
    pub fn now(run: u64, method: DetectionMethod) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            run,
            phase: method.to_string(),
            produced: 0,
            added: 0,
            replaced: 0,
            elapsed_ms: 0,
            error: None,
        }
    }

    pub fn with_counts(mut self, produced: usize, added: usize, replaced: usize) -> Self {
        self.produced = produced;
        self.added = added;
        self.replaced = replaced;
        self
    }

    pub fn with_elapsed(mut self, elapsed_ms: u128) -> Self {
        self.elapsed_ms = elapsed_ms;
        self
    }

    pub fn with_error(mut self, error: impl ToString) -> Self {
        self.error = Some(error.to_string());
        self
    }
}
