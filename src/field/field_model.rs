use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Semantic vocabulary
// ============================================================================

/// Inferred meaning of a field, independent of its native control kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SemanticType {
    Username,
    Email,
    Password,
    ConfirmPassword,
    FirstName,
    LastName,
    Name,
    Phone,
    Address,
    City,
    State,
    Zip,
    Country,
    CreditCard,
    Expiry,
    Cvv,
    Search,
    Comment,
    Message,
    Subject,
    Checkbox,
    Radio,
    Dropdown,
    Date,
    Time,
    File,
    Text,
}

impl SemanticType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SemanticType::Username => "username",
            SemanticType::Email => "email",
            SemanticType::Password => "password",
            SemanticType::ConfirmPassword => "confirmPassword",
            SemanticType::FirstName => "firstName",
            SemanticType::LastName => "lastName",
            SemanticType::Name => "name",
            SemanticType::Phone => "phone",
            SemanticType::Address => "address",
            SemanticType::City => "city",
            SemanticType::State => "state",
            SemanticType::Zip => "zip",
            SemanticType::Country => "country",
            SemanticType::CreditCard => "creditCard",
            SemanticType::Expiry => "expiry",
            SemanticType::Cvv => "cvv",
            SemanticType::Search => "search",
            SemanticType::Comment => "comment",
            SemanticType::Message => "message",
            SemanticType::Subject => "subject",
            SemanticType::Checkbox => "checkbox",
            SemanticType::Radio => "radio",
            SemanticType::Dropdown => "dropdown",
            SemanticType::Date => "date",
            SemanticType::Time => "time",
            SemanticType::File => "file",
            SemanticType::Text => "text",
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which phase first produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DetectionMethod {
    Standard,
    Table,
    Aria,
    Framework,
    Proximity,
    LoginPattern,
    ShadowDom,
    FallbackAll,
}

impl DetectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionMethod::Standard => "standard",
            DetectionMethod::Table => "table",
            DetectionMethod::Aria => "aria",
            DetectionMethod::Framework => "framework",
            DetectionMethod::Proximity => "proximity",
            DetectionMethod::LoginPattern => "loginPattern",
            DetectionMethod::ShadowDom => "shadowDom",
            DetectionMethod::FallbackAll => "fallbackAll",
        }
    }
}

impl fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label resolution strategies, in default priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LabelStrategy {
    Explicit,
    Ancestor,
    Table,
    Aria,
    Framework,
    Proximity,
    Attribute,
}

pub const DEFAULT_LABEL_CHAIN: [LabelStrategy; 7] = [
    LabelStrategy::Explicit,
    LabelStrategy::Ancestor,
    LabelStrategy::Table,
    LabelStrategy::Aria,
    LabelStrategy::Framework,
    LabelStrategy::Proximity,
    LabelStrategy::Attribute,
];

pub const TABLE_LABEL_CHAIN: [LabelStrategy; 7] = [
    LabelStrategy::Table,
    LabelStrategy::Explicit,
    LabelStrategy::Ancestor,
    LabelStrategy::Aria,
    LabelStrategy::Framework,
    LabelStrategy::Proximity,
    LabelStrategy::Attribute,
];

pub const PROXIMITY_LABEL_CHAIN: [LabelStrategy; 1] = [LabelStrategy::Proximity];

impl fmt::Display for LabelStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LabelStrategy::Explicit => "explicit label",
            LabelStrategy::Ancestor => "ancestor label",
            LabelStrategy::Table => "table layout",
            LabelStrategy::Aria => "aria",
            LabelStrategy::Framework => "framework container",
            LabelStrategy::Proximity => "proximity",
            LabelStrategy::Attribute => "attribute",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Control kinds
// ============================================================================

/// Raw control kind as observed on the element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlKind {
    /// `<input>` with its lower-cased `type` (missing/unknown → "text")
    Input(String),
    TextArea,
    Select,
    ContentEditable,
    Aria(String),
}

impl ControlKind {
    pub fn input_type(&self) -> Option<&str> {
        match self {
            ControlKind::Input(t) => Some(t.as_str()),
            _ => None,
        }
    }

    pub fn is_input_type(&self, ty: &str) -> bool {
        self.input_type() == Some(ty)
    }

    pub fn is_file(&self) -> bool {
        self.is_input_type("file")
    }
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlKind::Input(t) => f.write_str(t),
            ControlKind::TextArea => f.write_str("textarea"),
            ControlKind::Select => f.write_str("select"),
            ControlKind::ContentEditable => f.write_str("contenteditable"),
            ControlKind::Aria(role) => write!(f, "role:{}", role),
        }
    }
}

// ============================================================================
// Field candidate
// ============================================================================

/// Dedup key of a candidate: the (name, id) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldIdentity {
    pub name: String,
    pub id: String,
}

impl FieldIdentity {
    pub fn key(&self) -> String {
        format!("{}#{}", self.name, self.id)
    }
}

/// One detected, classified and scored input element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldCandidate {
    pub identity: FieldIdentity,
    pub html_kind: String,
    pub label: String,
    pub label_source: Option<LabelStrategy>,
    pub semantic_type: SemanticType,
    pub required: bool,
    pub confidence: f32,
    pub detection_method: DetectionMethod,
    #[serde(default)]
    pub in_shadow_dom: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub evidence: Vec<String>,
    /// Set when a structural pattern fixed the semantic type; merging keeps it
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub type_locked: bool,
}

impl FieldCandidate {
    pub fn key(&self) -> String {
        self.identity.key()
    }
}
