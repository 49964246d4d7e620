use crate::dom::dom_model::{Dom, NodeId};
use crate::error::DetectionError;

// ============================================================================
// Selector subset
// ============================================================================
//
// Comma-separated compound selectors only: `tag`, `*`, `#id`, `.class`,
// `[attr]`, `[attr=v]`, `[attr*=v]`, `[attr~=v]`, `[attr^=v]`, `[attr$=v]`.
// Combinators are rejected; callers narrow by passing a scope node instead.

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrCondition {
    Exists { key: String },
    Eq { key: String, value: String },
    Contains { key: String, value: String },
    Includes { key: String, value: String },
    StartsWith { key: String, value: String },
    EndsWith { key: String, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct CompoundSelector {
    tag: Option<String>,
    universal: bool,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrCondition>,
}

/// A parsed selector group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    groups: Vec<CompoundSelector>,
}

impl SelectorList {
    pub fn parse(selector: &str) -> Result<Self, DetectionError> {
        let groups = split_groups(selector)
            .into_iter()
            .map(parse_compound)
            .collect::<Result<Vec<_>, _>>()?;

        if groups.is_empty() {
            return Err(DetectionError::UnsupportedSelector(selector.to_string()));
        }

        Ok(Self { groups })
    }

    pub fn matches(&self, dom: &dyn Dom, node: NodeId) -> bool {
        dom.is_element(node) && self.groups.iter().any(|g| matches_compound(dom, node, g))
    }
}

fn matches_compound(dom: &dyn Dom, node: NodeId, step: &CompoundSelector) -> bool {
    if let Some(tag) = &step.tag {
        if !dom.tag_name(node).is_some_and(|t| t.eq_ignore_ascii_case(tag)) {
            return false;
        }
    }

    if let Some(id) = &step.id {
        if dom.attribute(node, "id") != Some(id.as_str()) {
            return false;
        }
    }

    if step.classes.iter().any(|c| !dom.has_class(node, c)) {
        return false;
    }

    step.attrs.iter().all(|cond| match cond {
        AttrCondition::Exists { key } => dom.attribute(node, key).is_some(),
        AttrCondition::Eq { key, value } => dom.attribute(node, key) == Some(value.as_str()),
        AttrCondition::Contains { key, value } => dom
            .attribute(node, key)
            .is_some_and(|attr| attr.contains(value.as_str())),
        AttrCondition::Includes { key, value } => dom
            .attribute(node, key)
            .is_some_and(|attr| attr.split_whitespace().any(|token| token == value)),
        AttrCondition::StartsWith { key, value } => dom
            .attribute(node, key)
            .is_some_and(|attr| attr.starts_with(value.as_str())),
        AttrCondition::EndsWith { key, value } => dom
            .attribute(node, key)
            .is_some_and(|attr| attr.ends_with(value.as_str())),
    })
}

// ============================================================================
// Parsing
// ============================================================================

/// Split on top-level commas, ignoring commas inside `[...]` or quotes.
fn split_groups(selector: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0usize;

    for (i, c) in selector.char_indices() {
        match (quote, c) {
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(&selector[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&selector[start..]);
    parts
}

fn parse_compound(part: &str) -> Result<CompoundSelector, DetectionError> {
    let part = part.trim();
    let unsupported = || DetectionError::UnsupportedSelector(part.to_string());
    if part.is_empty() {
        return Err(unsupported());
    }

    let bytes = part.as_bytes();
    let mut i = 0usize;
    let mut step = CompoundSelector::default();

    while i < bytes.len() {
        match bytes[i] {
            b'*' => {
                if step.universal || step.tag.is_some() {
                    return Err(unsupported());
                }
                step.universal = true;
                i += 1;
            }
            b'#' => {
                let (id, next) = parse_ident(part, i + 1).ok_or_else(unsupported)?;
                if step.id.replace(id).is_some() {
                    return Err(unsupported());
                }
                i = next;
            }
            b'.' => {
                let (class_name, next) = parse_ident(part, i + 1).ok_or_else(unsupported)?;
                step.classes.push(class_name);
                i = next;
            }
            b'[' => {
                let (cond, next) = parse_attr_condition(part, i).ok_or_else(unsupported)?;
                step.attrs.push(cond);
                i = next;
            }
            _ => {
                if step.tag.is_some()
                    || step.universal
                    || step.id.is_some()
                    || !step.classes.is_empty()
                    || !step.attrs.is_empty()
                {
                    return Err(unsupported());
                }
                let (tag, next) = parse_ident(part, i).ok_or_else(unsupported)?;
                step.tag = Some(tag.to_ascii_lowercase());
                i = next;
            }
        }
    }

    Ok(step)
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b >= 0x80
}

fn parse_ident(src: &str, start: usize) -> Option<(String, usize)> {
    let bytes = src.as_bytes();
    let mut end = start;
    while end < bytes.len() && is_ident_byte(bytes[end]) {
        end += 1;
    }
    if end == start {
        return None;
    }
    Some((src[start..end].to_string(), end))
}

fn skip_spaces(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

/// Parse `[key op value]` starting at the opening bracket; returns the index
/// just past the closing bracket.
fn parse_attr_condition(src: &str, open: usize) -> Option<(AttrCondition, usize)> {
    let bytes = src.as_bytes();
    let mut i = skip_spaces(bytes, open + 1);
    let (key, next) = parse_ident(src, i)?;
    let key = key.to_ascii_lowercase();
    i = skip_spaces(bytes, next);

    if *bytes.get(i)? == b']' {
        return Some((AttrCondition::Exists { key }, i + 1));
    }

    let op = match *bytes.get(i)? {
        b'=' => {
            i += 1;
            b'='
        }
        b @ (b'*' | b'~' | b'^' | b'$') if bytes.get(i + 1) == Some(&b'=') => {
            i += 2;
            b
        }
        _ => return None,
    };
    i = skip_spaces(bytes, i);

    let value = match *bytes.get(i)? {
        q @ (b'"' | b'\'') => {
            let close = src[i + 1..].find(q as char)? + i + 1;
            let v = src[i + 1..close].to_string();
            i = close + 1;
            v
        }
        _ => {
            let (v, next) = parse_ident(src, i)?;
            i = next;
            v
        }
    };

    i = skip_spaces(bytes, i);
    if *bytes.get(i)? != b']' {
        return None;
    }

    let cond = match op {
        b'=' => AttrCondition::Eq { key, value },
        b'*' => AttrCondition::Contains { key, value },
        b'~' => AttrCondition::Includes { key, value },
        b'^' => AttrCondition::StartsWith { key, value },
        _ => AttrCondition::EndsWith { key, value },
    };
    Some((cond, i + 1))
}
