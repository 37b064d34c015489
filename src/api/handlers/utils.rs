//! Small helpers for input sanitizing, validation and markup escaping.

use regex::Regex;

/// Normalize an email for lookup/uniqueness checks.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
pub(crate) fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}

/// Clean a submitted username.
///
/// Markup and percent-encoded octets are always removed and whitespace is
/// collapsed. In `strict` mode only `[A-Za-z0-9 _.@-]` survives, which is what
/// usernames derived from an email address are held to.
pub(crate) fn sanitize_username(raw: &str, strict: bool) -> String {
    let mut value = replace_all(r"<[^>]*>", raw, "");
    value = replace_all(r"%[0-9a-fA-F]{2}", &value, "");
    value = replace_all(r"&[^;\s]+;", &value, "");
    if strict {
        value = replace_all(r"[^A-Za-z0-9 _.@-]", &value, "");
    }
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn replace_all(pattern: &str, haystack: &str, replacement: &str) -> String {
    match Regex::new(pattern) {
        Ok(regex) => regex.replace_all(haystack, replacement).into_owned(),
        Err(_) => haystack.to_string(),
    }
}

/// Escape text for interpolation into HTML content or attribute values.
pub(crate) fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Widget ids end up in element ids, so keep them to a safe alphabet.
pub(crate) fn valid_widget_id(id: &str) -> bool {
    Regex::new(r"^[A-Za-z0-9_-]{1,64}$").is_ok_and(|regex| regex.is_match(id))
}
