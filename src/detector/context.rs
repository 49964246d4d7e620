use std::fmt;

use serde::{Deserialize, Serialize};

use crate::detector::insights::FormInsights;
use crate::field::field_model::{DetectionMethod, FieldCandidate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormType {
    Login,
    Registration,
    Contact,
    Checkout,
    Address,
    Search,
    #[default]
    Unknown,
}

impl FormType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormType::Login => "login",
            FormType::Registration => "registration",
            FormType::Contact => "contact",
            FormType::Checkout => "checkout",
            FormType::Address => "address",
            FormType::Search => "search",
            FormType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one detection run. Always produced, even on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormContext {
    pub fields: Vec<FieldCandidate>,
    pub form_type: FormType,
    pub form_purpose: String,
    /// First primary-capable phase that produced anything
    pub detection_method: Option<DetectionMethod>,
    /// Every phase that produced at least one candidate, in run order
    pub detection_methods: Vec<DetectionMethod>,
    pub timing_ms: u64,
    pub raw_field_count: usize,
    pub filtered_field_count: usize,
    pub threshold_used: f32,
    pub lenient_fallback: bool,
    #[serde(default)]
    pub insights: FormInsights,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FormContext {
    pub fn empty(threshold: f32) -> Self {
        Self {
            fields: Vec::new(),
            form_type: FormType::Unknown,
            form_purpose: FormType::Unknown.purpose().to_string(),
            detection_method: None,
            detection_methods: Vec::new(),
            timing_ms: 0,
            raw_field_count: 0,
            filtered_field_count: 0,
            threshold_used: threshold,
            lenient_fallback: false,
            insights: FormInsights::default(),
            error: None,
        }
    }

    /// Empty result carrying a detection-wide failure.
    pub fn failed(error: impl ToString, threshold: f32, timing_ms: u64) -> Self {
        Self {
            timing_ms,
            error: Some(error.to_string()),
            ..Self::empty(threshold)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, key: &str) -> Option<&FieldCandidate> {
        self.fields.iter().find(|f| f.key() == key)
    }
}
