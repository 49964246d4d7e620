use std::sync::LazyLock;

use regex::Regex;

static CAMEL_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("Invalid camel-case pattern"));

/// Prefixes form builders put in front of field names.
const FRAMEWORK_PREFIXES: [&str; 5] = ["frm_", "txt_", "fld_", "input_", "field_"];

/// Clean a raw label: collapse whitespace, drop required-markers and trailing
/// colons, cap the length.
pub fn normalize_label(raw: &str, max_len: usize) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    let trimmed = collapsed
        .trim_start_matches(|c: char| c == '*' || c.is_whitespace())
        .trim_end_matches(|c: char| c == '*' || c == ':' || c.is_whitespace());

    truncate_at_word(trimmed, max_len)
}

/// Cut to `max_chars`, backing up to the last space when one falls in the
/// second half of the kept text.
pub fn truncate_at_word(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let kept: String = text.chars().take(max_chars).collect();
    match kept.rfind(' ') {
        Some(pos) if pos >= kept.len() / 2 => kept[..pos].trim_end().to_string(),
        _ => kept.trim_end().to_string(),
    }
}

/// Turn an identifier such as `frm_firstName` or `billing-zip_code` into
/// readable words ("First name", "Billing zip code").
pub fn humanize_identifier(raw: &str) -> String {
    let mut s = raw.trim();

    for prefix in FRAMEWORK_PREFIXES {
        let has_prefix = s
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix));
        if has_prefix && s.len() > prefix.len() {
            s = &s[prefix.len()..];
            break;
        }
    }

    let spaced = CAMEL_BOUNDARY.replace_all(s, "$1 $2");
    let words: Vec<String> = spaced
        .split(|c: char| c == '_' || c == '-' || c == '[' || c == ']' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect();

    capitalize_first(&words.join(" "))
}

pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
