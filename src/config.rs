use serde::{Deserialize, Serialize};

// ============================================================================
// Detector configuration
// ============================================================================

/// Everything the engine can be tuned with. Deserializes from the
/// `detection` section of `field-detection.yaml`; every key is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Minimum confidence kept in normal runs
    #[serde(default = "default_threshold")]
    pub threshold: f32,

    /// Minimum confidence kept in diagnostic runs
    #[serde(default = "default_diagnostic_threshold")]
    pub diagnostic_threshold: f32,

    /// Threshold of the single retry when filtering kept too little
    #[serde(default = "default_lenient_threshold")]
    pub lenient_threshold: f32,

    /// Retry leniently when fewer than this many fields survive filtering
    #[serde(default = "default_min_fields")]
    pub min_fields: usize,

    /// Fallback-all runs only when fewer candidates than this were found
    #[serde(default = "default_fallback_below")]
    pub fallback_below: usize,

    #[serde(default)]
    pub diagnostic: bool,

    #[serde(default)]
    pub label: LabelConfig,

    #[serde(default)]
    pub weights: ScoringWeights,

    /// Learned label boosts supplied by an outside collaborator
    #[serde(default)]
    pub boosts: Vec<ConfidenceBoost>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            diagnostic_threshold: default_diagnostic_threshold(),
            lenient_threshold: default_lenient_threshold(),
            min_fields: default_min_fields(),
            fallback_below: default_fallback_below(),
            diagnostic: false,
            label: LabelConfig::default(),
            weights: ScoringWeights::default(),
            boosts: Vec::new(),
        }
    }
}

impl DetectorConfig {
    pub fn diagnostic() -> Self {
        Self {
            diagnostic: true,
            ..Self::default()
        }
    }

    /// Threshold for the first filtering pass.
    pub fn active_threshold(&self) -> f32 {
        if self.diagnostic {
            self.diagnostic_threshold
        } else {
            self.threshold
        }
    }
}

/// Limits used by the label resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelConfig {
    #[serde(default = "default_max_label_length")]
    pub max_length: usize,

    /// Ancestor levels searched for framework-style labels
    #[serde(default = "default_framework_depth")]
    pub framework_depth: usize,

    /// Proximity cutoff in CSS px
    #[serde(default = "default_proximity_distance")]
    pub proximity_distance: f32,

    /// Cutoff for "Username:"-style colon labels
    #[serde(default = "default_colon_label_distance")]
    pub colon_label_distance: f32,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            max_length: default_max_label_length(),
            framework_depth: default_framework_depth(),
            proximity_distance: default_proximity_distance(),
            colon_label_distance: default_colon_label_distance(),
        }
    }
}

/// Additive confidence model. Positive values are bonuses, `*_penalty`
/// values are subtracted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub base: f32,
    pub name: f32,
    pub id: f32,
    pub placeholder: f32,
    pub required: f32,
    pub explicit_label: f32,
    pub framework_label: f32,
    pub proximity_label: f32,
    pub specific_type: f32,
    pub in_form: f32,
    pub file_input: f32,
    pub choice_input: f32,
    pub textarea: f32,
    pub tiny_box_penalty: f32,
    pub tiny_box_px: f32,
    pub decorative_penalty: f32,
    pub hidden_class_penalty: f32,
    pub login_username: f32,
    pub login_password: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            base: 0.5,
            name: 0.1,
            id: 0.1,
            placeholder: 0.05,
            required: 0.1,
            explicit_label: 0.15,
            framework_label: 0.12,
            proximity_label: 0.10,
            specific_type: 0.15,
            in_form: 0.05,
            file_input: 0.1,
            choice_input: 0.05,
            textarea: 0.15,
            tiny_box_penalty: 0.1,
            tiny_box_px: 10.0,
            decorative_penalty: 0.2,
            hidden_class_penalty: 0.1,
            login_username: 0.9,
            login_password: 0.95,
        }
    }
}

/// Boost applied when a field's label contains `pattern` (case-insensitive).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBoost {
    pub pattern: String,
    pub boost: f32,
}

// Serde default helpers
fn default_threshold() -> f32 { 0.4 }
fn default_diagnostic_threshold() -> f32 { 0.3 }
fn default_lenient_threshold() -> f32 { 0.2 }
fn default_min_fields() -> usize { 3 }
fn default_fallback_below() -> usize { 2 }
fn default_max_label_length() -> usize { 50 }
fn default_framework_depth() -> usize { 3 }
fn default_proximity_distance() -> f32 { 150.0 }
fn default_colon_label_distance() -> f32 { 200.0 }
