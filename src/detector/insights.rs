use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::detector::context::FormType;
use crate::field::field_model::{FieldCandidate, SemanticType};

// ============================================================================
// Insight model
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrivacyLevel {
    #[default]
    Low,
    Standard,
    High,
    VeryHigh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Complexity {
    #[default]
    Simple,
    Medium,
    Complex,
    VeryComplex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldCategory {
    PersonalInformation,
    ContactInformation,
    AccountCredentials,
    AddressInformation,
    PaymentInformation,
    Preferences,
    Other,
}

/// Two fields that are filled in together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRelationship {
    pub field: String,
    pub related: String,
    pub relationship: String,
}

/// Derived facts about the detected form as a whole.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormInsights {
    pub required_field_count: usize,
    /// Labels of the fields that matter most for this form type, then any
    /// remaining required ones
    pub key_fields: Vec<String>,
    pub privacy_level: PrivacyLevel,
    pub complexity: Complexity,
    pub complexity_score: f32,
    pub estimated_completion: String,
    /// Field labels grouped by category; empty categories are omitted
    pub categories: BTreeMap<FieldCategory, Vec<String>>,
    #[serde(default)]
    pub field_relationships: Vec<FieldRelationship>,
    /// How strongly the fields support the chosen form type, 0.0 for unknown
    #[serde(default)]
    pub form_type_confidence: f32,
}

// ============================================================================
// Analysis
// ============================================================================

static VERY_SENSITIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)ssn|social security|passport|\btax\b").expect("Invalid sensitivity pattern")
});

static SENSITIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bdob\b|birth|driver|licen[cs]e|income").expect("Invalid sensitivity pattern")
});

/// Kinds that take noticeably longer to fill.
const COMPLEX_KINDS: [&str; 4] = ["file", "date", "select", "textarea"];
const SLOW_KINDS: [&str; 3] = ["file", "date", "textarea"];

pub fn analyze(fields: &[FieldCandidate], form_type: FormType) -> FormInsights {
    let required = fields.iter().filter(|f| f.required).count();
    let complex = fields
        .iter()
        .filter(|f| COMPLEX_KINDS.contains(&f.html_kind.as_str()))
        .count();
    let slow = fields
        .iter()
        .filter(|f| SLOW_KINDS.contains(&f.html_kind.as_str()))
        .count();

    let complexity_score = fields.len() as f32 * 0.5 + complex as f32 * 1.5 + required as f32 * 0.8;

    FormInsights {
        required_field_count: required,
        key_fields: key_fields(fields, form_type),
        privacy_level: fields.iter().map(privacy_of).max().unwrap_or_default(),
        complexity: complexity_level(complexity_score),
        complexity_score,
        estimated_completion: estimate_completion(fields.len() as f32 * 0.3 + slow as f32),
        categories: categorize(fields),
        field_relationships: relationships(fields),
        form_type_confidence: form_type_confidence(fields, form_type),
    }
}

fn privacy_of(field: &FieldCandidate) -> PrivacyLevel {
    use SemanticType::*;

    let text = format!("{} {}", field.identity.name, field.label);
    match field.semantic_type {
        CreditCard | Cvv => PrivacyLevel::VeryHigh,
        _ if VERY_SENSITIVE.is_match(&text) => PrivacyLevel::VeryHigh,
        Password | ConfirmPassword => PrivacyLevel::High,
        _ if SENSITIVE.is_match(&text) => PrivacyLevel::High,
        Name | FirstName | LastName | Email | Phone | Username | Address | City | State | Zip
        | Country => PrivacyLevel::Standard,
        _ => PrivacyLevel::Low,
    }
}

fn complexity_level(score: f32) -> Complexity {
    if score < 5.0 {
        Complexity::Simple
    } else if score < 15.0 {
        Complexity::Medium
    } else if score < 30.0 {
        Complexity::Complex
    } else {
        Complexity::VeryComplex
    }
}

fn estimate_completion(minutes: f32) -> String {
    let bucket = if minutes < 2.0 {
        "1-2 minutes"
    } else if minutes < 5.0 {
        "2-5 minutes"
    } else if minutes < 10.0 {
        "5-10 minutes"
    } else if minutes < 20.0 {
        "10-20 minutes"
    } else {
        "20+ minutes"
    };
    bucket.to_string()
}

pub fn category_of(field: &FieldCandidate) -> FieldCategory {
    use SemanticType::*;

    match field.semantic_type {
        FirstName | LastName | Name => FieldCategory::PersonalInformation,
        Date if SENSITIVE.is_match(&field.label) => FieldCategory::PersonalInformation,
        Email | Phone => FieldCategory::ContactInformation,
        Username | Password | ConfirmPassword => FieldCategory::AccountCredentials,
        Address | City | State | Zip | Country => FieldCategory::AddressInformation,
        CreditCard | Expiry | Cvv => FieldCategory::PaymentInformation,
        Checkbox | Radio | Dropdown => FieldCategory::Preferences,
        _ => FieldCategory::Other,
    }
}

fn categorize(fields: &[FieldCandidate]) -> BTreeMap<FieldCategory, Vec<String>> {
    let mut categories: BTreeMap<FieldCategory, Vec<String>> = BTreeMap::new();
    for field in fields {
        categories
            .entry(category_of(field))
            .or_default()
            .push(field.label.clone());
    }
    categories
}

fn key_types(form_type: FormType) -> &'static [SemanticType] {
    use SemanticType::*;

    match form_type {
        FormType::Login => &[Username, Email, Password],
        FormType::Registration => &[Email, Username, Password, Name, FirstName, LastName],
        FormType::Contact => &[Email, Name, Message, Subject],
        FormType::Checkout => &[CreditCard, Cvv, Expiry, Name],
        FormType::Address => &[Name, Address, City, State, Zip, Country],
        FormType::Search => &[Search],
        FormType::Unknown => &[],
    }
}

fn key_fields(fields: &[FieldCandidate], form_type: FormType) -> Vec<String> {
    let wanted = key_types(form_type);
    let mut keys: Vec<String> = Vec::new();

    let by_type = fields.iter().filter(|f| wanted.contains(&f.semantic_type));
    let by_required = fields.iter().filter(|f| f.required);

    for field in by_type.chain(by_required) {
        if !keys.contains(&field.label) {
            keys.push(field.label.clone());
        }
    }
    keys
}

// ============================================================================
// Relationships
// ============================================================================

const RELATED_TYPES: [(SemanticType, SemanticType, &str); 8] = [
    (SemanticType::FirstName, SemanticType::LastName, "Personal name components"),
    (SemanticType::Password, SemanticType::ConfirmPassword, "Password verification pair"),
    (SemanticType::Address, SemanticType::City, "Address components"),
    (SemanticType::City, SemanticType::State, "Geographic location components"),
    (SemanticType::State, SemanticType::Zip, "Geographic location components"),
    (SemanticType::Country, SemanticType::Zip, "Geographic location components"),
    (SemanticType::CreditCard, SemanticType::Cvv, "Payment security components"),
    (SemanticType::CreditCard, SemanticType::Expiry, "Payment components"),
];

/// Prefix pairs whose remainders name the same piece of information.
const COMPLEMENTS: [(&str, &str); 2] = [("billing_", "shipping_"), ("current_", "new_")];

fn field_name(field: &FieldCandidate) -> &str {
    if field.identity.name.is_empty() {
        &field.identity.id
    } else {
        &field.identity.name
    }
}

pub fn relationships(fields: &[FieldCandidate]) -> Vec<FieldRelationship> {
    let mut found = Vec::new();
    let mut relate = |a: &FieldCandidate, b: &FieldCandidate, relationship: &str| {
        found.push(FieldRelationship {
            field: field_name(a).to_string(),
            related: field_name(b).to_string(),
            relationship: relationship.to_string(),
        });
    };

    for first in fields {
        for second in fields {
            if first.key() == second.key() {
                continue;
            }

            for (a, b, relationship) in RELATED_TYPES {
                if first.semantic_type == a && second.semantic_type == b {
                    relate(first, second, relationship);
                }
            }

            let (name1, name2) = (field_name(first).to_lowercase(), field_name(second).to_lowercase());
            if first.semantic_type == SemanticType::Email
                && second.semantic_type == SemanticType::Email
                && !name1.contains("confirm")
                && name2.contains("confirm")
            {
                relate(first, second, "Email verification pair");
            }

            for (prefix, complement) in COMPLEMENTS {
                let matched = name1
                    .strip_prefix(prefix)
                    .zip(name2.strip_prefix(complement))
                    .is_some_and(|(rest1, rest2)| !rest1.is_empty() && rest1 == rest2);
                if matched {
                    relate(first, second, "Complementary information");
                }
            }
        }
    }
    found
}

// ============================================================================
// Form type confidence
// ============================================================================

/// Evidence score for an already chosen form type, capped at 1.0. A type
/// chosen on weaker signals (page keywords, a lone field) scores 0.5.
pub fn form_type_confidence(fields: &[FieldCandidate], form_type: FormType) -> f32 {
    use SemanticType::*;

    let has = |t: SemanticType| fields.iter().any(|f| f.semantic_type == t);
    let count = fields.len();
    let named = has(Name) || has(FirstName) || has(LastName);

    let score: f32 = match form_type {
        FormType::Unknown => return 0.0,
        FormType::Login => {
            if (has(Username) || has(Email)) && has(Password) && count <= 3 {
                0.8
            } else {
                0.0
            }
        }
        FormType::Registration => {
            let mut score = 0.0;
            if has(Email) && has(Password) && (has(ConfirmPassword) || named) && count >= 3 {
                score += 0.7;
            }
            if has(Username) && has(Password) && count >= 3 {
                score += 0.6;
            }
            score
        }
        FormType::Contact => {
            if named && has(Email) && (has(Message) || has(Comment) || has(Subject)) {
                0.8
            } else {
                0.0
            }
        }
        FormType::Checkout => {
            let mut score = 0.0;
            if has(CreditCard) || has(Cvv) {
                score += 0.7;
            }
            if has(Expiry) {
                score += 0.2;
            }
            score
        }
        FormType::Address => {
            let parts = [Address, City, State, Zip, Country]
                .iter()
                .filter(|t| has(**t))
                .count();
            if parts >= 3 { 0.7 } else { 0.0 }
        }
        FormType::Search => 0.6,
    };

    if score > 0.0 { score.min(1.0) } else { 0.5 }
}
