use std::collections::HashSet;

use crate::detector::context::FormType;
use crate::dom::dom_model::Dom;
use crate::error::DetectionError;
use crate::field::field_model::{FieldCandidate, SemanticType};

/// Page text that hints at sign-up rather than sign-in.
const REGISTER_KEYWORDS: [&str; 6] = [
    "register",
    "sign up",
    "signup",
    "create account",
    "create an account",
    "join",
];

const CHECKOUT_KEYWORDS: [&str; 5] = ["checkout", "payment", "billing", "place order", "pay now"];

/// Elements whose text names what a form is for.
const KEYWORD_SOURCES: &str = "h1, h2, h3, legend, button, input[type=submit], input[type=button]";

const ADDRESS_TYPES: [SemanticType; 5] = [
    SemanticType::Address,
    SemanticType::City,
    SemanticType::State,
    SemanticType::Zip,
    SemanticType::Country,
];

impl FormType {
    pub fn purpose(&self) -> &'static str {
        match self {
            FormType::Login => "Sign in to an existing account",
            FormType::Registration => "Create a new account",
            FormType::Contact => "Send a message or inquiry",
            FormType::Checkout => "Complete a purchase with payment details",
            FormType::Address => "Provide a postal or shipping address",
            FormType::Search => "Search the site",
            FormType::Unknown => "General data entry",
        }
    }
}

/// Lower-cased headings, button captions and form attributes of the page.
pub fn page_keywords(dom: &dyn Dom) -> Result<String, DetectionError> {
    let root = dom.document_root();
    let mut text = String::new();

    for node in dom.query_all(root, KEYWORD_SOURCES)? {
        let caption = match dom.attribute(node, "value") {
            Some(value) if dom.has_tag(node, "input") => value.to_string(),
            _ => dom.text_content(node),
        };
        text.push_str(caption.trim());
        text.push(' ');
    }

    for form in dom.query_all(root, "form")? {
        for attr in ["action", "id", "class", "name"] {
            if let Some(value) = dom.attribute(form, attr) {
                text.push_str(value);
                text.push(' ');
            }
        }
    }

    Ok(text.to_lowercase())
}

/// Classify from the final field list; `keywords` only disambiguates.
pub fn classify_form_type(fields: &[FieldCandidate], keywords: &str) -> FormType {
    if fields.is_empty() {
        return FormType::Unknown;
    }

    let types: HashSet<SemanticType> = fields.iter().map(|f| f.semantic_type).collect();
    let has = |t: SemanticType| types.contains(&t);
    let mentions = |words: &[&str]| words.iter().any(|w| keywords.contains(w));

    if has(SemanticType::Password) || has(SemanticType::ConfirmPassword) {
        let personal = [
            SemanticType::FirstName,
            SemanticType::LastName,
            SemanticType::Name,
            SemanticType::Phone,
        ]
        .iter()
        .any(|t| has(*t));

        let registration = has(SemanticType::ConfirmPassword)
            || (personal && fields.len() >= 3)
            || mentions(&REGISTER_KEYWORDS);

        return if registration {
            FormType::Registration
        } else {
            FormType::Login
        };
    }

    if has(SemanticType::CreditCard) || has(SemanticType::Cvv) || has(SemanticType::Expiry) {
        return FormType::Checkout;
    }

    if ADDRESS_TYPES.iter().filter(|t| has(**t)).count() >= 2 {
        return if mentions(&CHECKOUT_KEYWORDS) {
            FormType::Checkout
        } else {
            FormType::Address
        };
    }

    if has(SemanticType::Message) || has(SemanticType::Comment) || has(SemanticType::Subject) {
        return FormType::Contact;
    }

    if has(SemanticType::Search) {
        return FormType::Search;
    }

    FormType::Unknown
}
