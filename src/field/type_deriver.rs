use std::sync::LazyLock;

use regex::Regex;

use crate::dom::dom_model::{Dom, NodeId};
use crate::field::field_model::{ControlKind, SemanticType};

// ============================================================================
// Pattern table
// ============================================================================

/// One row of the ordered pattern table. The first row whose patterns match
/// the haystack decides the type.
pub struct TypePattern {
    pub semantic_type: SemanticType,
    /// Prior confidence for fields of this type, blended in by the scorer
    pub base_score: f32,
    patterns: Vec<Regex>,
}

/// Word-ish boundary that treats `_` and digits as separators too, so
/// `billing_state` matches `state` while `statement` does not.
fn word(term: &str) -> String {
    format!("(^|[^a-z]){}([^a-z]|$)", term)
}

fn entry(semantic_type: SemanticType, base_score: f32, patterns: &[String]) -> TypePattern {
    TypePattern {
        semantic_type,
        base_score,
        patterns: patterns
            .iter()
            .map(|p| Regex::new(p).expect("Invalid field type pattern"))
            .collect(),
    }
}

fn lit(patterns: &[&str]) -> Vec<String> {
    patterns.iter().map(|p| p.to_string()).collect()
}

static PATTERN_TABLE: LazyLock<Vec<TypePattern>> = LazyLock::new(|| {
    use SemanticType::*;

    vec![
        entry(ConfirmPassword, 0.9, &lit(&[
            r"confirm.{0,12}pass",
            r"pass\w{0,8}[_\s-]?(confirm|again|repeat|verify|check)",
            r"re[_\s-]?(enter|type)[_\s-]?pass",
            r"(verify|repeat|retype).{0,12}pass",
            r"password[_\s-]?2",
        ])),
        entry(Password, 0.95, &[
            "password".into(),
            r"pass[_\s-]?word".into(),
            "passwd".into(),
            word("pwd"),
            word("pass"),
        ]),
        entry(Email, 0.95, &[r"e[_\s-]?mail".into(), word("mail")]),
        entry(Username, 0.85, &[
            r"user[_\s-]?name".into(),
            r"user[_\s-]?id".into(),
            word("user"),
            "login".into(),
            word("uid"),
            r"account[_\s-]?(name|id)".into(),
            "nickname".into(),
        ]),
        entry(FirstName, 0.9, &lit(&[
            r"first[_\s-]?name",
            r"given[_\s-]?name",
            "fname",
            "forename",
        ])),
        entry(LastName, 0.9, &lit(&[
            r"last[_\s-]?name",
            r"family[_\s-]?name",
            "lname",
            "surname",
        ])),
        entry(Name, 0.8, &[
            r"full[_\s-]?name".into(),
            r"your[_\s-]?name".into(),
            word("name"),
        ]),
        entry(Phone, 0.9, &[
            "phone".into(),
            "telephone".into(),
            "mobile".into(),
            word("tel"),
            word("cell"),
        ]),
        entry(CreditCard, 0.95, &[
            r"card[_\s-]?(number|num|no)".into(),
            r"credit[_\s-]?card".into(),
            r"cc[_\s-]?(num|number)".into(),
            word("pan"),
        ]),
        entry(Expiry, 0.9, &[
            "expir".into(),
            r"exp[_\s-]?(date|month|year|mm|yy)".into(),
            r"mm\s*/\s*yy".into(),
            word("exp"),
        ]),
        entry(Cvv, 0.95, &[
            "cvv".into(),
            "cvc".into(),
            word("csc"),
            r"security[_\s-]?code".into(),
            r"card[_\s-]?code".into(),
        ]),
        entry(Zip, 0.9, &[
            word("zip"),
            "zipcode".into(),
            "postal".into(),
            r"post[_\s-]?code".into(),
        ]),
        entry(City, 0.85, &["city".into(), word("town"), "locality".into()]),
        entry(State, 0.8, &[word("state"), "province".into(), word("region")]),
        entry(Country, 0.85, &lit(&["country", "nation"])),
        entry(Address, 0.85, &[
            "address".into(),
            "street".into(),
            word("addr"),
            r"line[_\s-]?1".into(),
        ]),
        entry(Search, 0.8, &["search".into(), "query".into(), "keyword".into(), word("q")]),
        entry(Subject, 0.8, &lit(&["subject", "topic"])),
        entry(Comment, 0.8, &[
            "comment".into(),
            "feedback".into(),
            word("remarks?"),
            word("notes?"),
        ]),
        entry(Message, 0.8, &[
            "message".into(),
            word("msg"),
            "inquiry".into(),
            "enquiry".into(),
            r"your[_\s-]?question".into(),
        ]),
        entry(Checkbox, 0.7, &lit(&[
            "agree",
            "terms",
            "consent",
            "subscribe",
            "newsletter",
            "remember",
            "checkbox",
        ])),
        entry(Radio, 0.7, &["gender".into(), word("radio")]),
        entry(Dropdown, 0.7, &[word("select"), "choose".into(), "dropdown".into()]),
        entry(Date, 0.85, &[word("date"), "birth".into(), word("dob"), "birthday".into()]),
        entry(Time, 0.8, &[word("time")]),
        entry(File, 0.85, &[
            "upload".into(),
            "attach".into(),
            word("file"),
            "resume".into(),
            word("cv"),
        ]),
    ]
});

// ============================================================================
// Derivation
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct TypeMatch {
    pub semantic_type: SemanticType,
    /// Decided by the control's own kind rather than by naming
    pub native: bool,
    pub evidence: String,
}

/// Infer the semantic type: native kind first, then the pattern table over
/// `name id label placeholder`.
pub fn derive_type(dom: &dyn Dom, node: NodeId, kind: &ControlKind, label: &str) -> TypeMatch {
    let haystack = build_haystack(dom, node, label);

    if let Some(ty) = native_type(kind, &haystack) {
        return TypeMatch {
            semantic_type: ty,
            native: true,
            evidence: format!("type: native {} -> {}", kind, ty),
        };
    }

    match match_patterns(&haystack) {
        Some((ty, pattern)) => TypeMatch {
            semantic_type: ty,
            native: false,
            evidence: format!("type: /{}/ matched -> {}", pattern, ty),
        },
        None => TypeMatch {
            semantic_type: SemanticType::Text,
            native: false,
            evidence: "type: no pattern matched -> text".to_string(),
        },
    }
}

fn build_haystack(dom: &dyn Dom, node: NodeId, label: &str) -> String {
    [
        dom.attribute(node, "name").unwrap_or_default(),
        dom.attribute(node, "id").unwrap_or_default(),
        label,
        dom.attribute(node, "placeholder").unwrap_or_default(),
    ]
    .iter()
    .map(|s| s.trim())
    .filter(|s| !s.is_empty())
    .collect::<Vec<_>>()
    .join(" ")
    .to_lowercase()
}

/// Type implied by the control kind alone. A few kinds are narrowed within
/// their own family by naming: password inputs may be confirmations,
/// textareas may be comments or addresses, selects may be country/state.
pub fn native_type(kind: &ControlKind, haystack: &str) -> Option<SemanticType> {
    use SemanticType::*;

    let narrowed = |family: &[SemanticType], default: SemanticType| {
        match_patterns_within(haystack, family).unwrap_or(default)
    };

    match kind {
        ControlKind::Input(ty) => match ty.as_str() {
            "email" => Some(Email),
            "password" => Some(narrowed(&[ConfirmPassword], Password)),
            "tel" => Some(Phone),
            "checkbox" => Some(Checkbox),
            "radio" => Some(Radio),
            "file" => Some(File),
            "date" | "datetime-local" | "month" | "week" => Some(Date),
            "time" => Some(Time),
            "search" => Some(Search),
            "number" | "range" | "url" | "color" => Some(Text),
            _ => None,
        },
        ControlKind::TextArea => Some(narrowed(&[Comment, Address], Message)),
        ControlKind::Select => Some(narrowed(&[Country, State], Dropdown)),
        ControlKind::ContentEditable => None,
        ControlKind::Aria(role) => match role.as_str() {
            "checkbox" => Some(Checkbox),
            "radio" => Some(Radio),
            "searchbox" => Some(Search),
            "combobox" | "listbox" => Some(Dropdown),
            "spinbutton" | "slider" => Some(Text),
            _ => None,
        },
    }
}

/// First matching table row, with the pattern that fired.
pub fn match_patterns(haystack: &str) -> Option<(SemanticType, &'static str)> {
    PATTERN_TABLE.iter().find_map(|row| {
        row.patterns
            .iter()
            .find(|p| p.is_match(haystack))
            .map(|p| (row.semantic_type, p.as_str()))
    })
}

fn match_patterns_within(haystack: &str, family: &[SemanticType]) -> Option<SemanticType> {
    PATTERN_TABLE
        .iter()
        .filter(|row| family.contains(&row.semantic_type))
        .find(|row| row.patterns.iter().any(|p| p.is_match(haystack)))
        .map(|row| row.semantic_type)
}

/// Base score of a type's table row; `None` for `text`.
pub fn pattern_score(semantic_type: SemanticType) -> Option<f32> {
    PATTERN_TABLE
        .iter()
        .find(|row| row.semantic_type == semantic_type)
        .map(|row| row.base_score)
}
