use serde::{Deserialize, Serialize};

use crate::detector::context::{FormContext, FormType};

// ============================================================================
// Batch report: aggregates detection results over a page corpus
// ============================================================================

/// Detection result for one page of a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult {
    /// Path or URL the page was loaded from
    pub page: String,

    pub context: FormContext,
}

impl PageResult {
    pub fn new(page: &str, context: FormContext) -> Self {
        Self {
            page: page.to_string(),
            context,
        }
    }

    /// A page that could not be loaded at all.
    pub fn load_failed(page: &str, error: impl ToString, threshold: f32) -> Self {
        Self::new(page, FormContext::failed(error, threshold, 0))
    }
}

/// Aggregated report for a batch of pages.
///
/// Built via `from_results()`; consumed by the console reporter and
/// serialized as-is for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub suite_name: String,

    pub total: usize,

    /// Pages where at least one field was detected
    pub with_fields: usize,

    /// Pages that came back with no fields and no error
    pub empty: usize,

    /// Pages that failed to load or reported a detection error
    pub failed: usize,

    pub field_count: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u128>,

    pub pages: Vec<PageResult>,
}

impl BatchReport {
    pub fn from_results(suite_name: &str, pages: Vec<PageResult>) -> Self {
        let total = pages.len();
        let failed = pages.iter().filter(|p| p.context.error.is_some()).count();
        let with_fields = pages.iter().filter(|p| !p.context.is_empty()).count();
        let field_count = pages.iter().map(|p| p.context.fields.len()).sum();

        Self {
            suite_name: suite_name.to_string(),
            total,
            with_fields,
            empty: total - with_fields - failed,
            failed,
            field_count,
            duration_ms: None,
            pages,
        }
    }

    pub fn with_duration(mut self, duration_ms: u128) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    /// Page count per detected form type, in first-seen order.
    pub fn form_type_counts(&self) -> Vec<(FormType, usize)> {
        let mut counts: Vec<(FormType, usize)> = Vec::new();
        for page in &self.pages {
            let ty = page.context.form_type;
            match counts.iter_mut().find(|(t, _)| *t == ty) {
                Some((_, n)) => *n += 1,
                None => counts.push((ty, 1)),
            }
        }
        counts
    }
}
