//! Surface-style classification of address strings.
//!
//! Rules are tried in order and the first match wins. The patterns
//! overlap, so the order is part of the contract.

use std::sync::LazyLock;

use osm_clean_audit_models::AddressStyle;
use regex::Regex;

/// Characters that make a string unusable as a column key.
static PROBLEM_CHARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[=+/&<>;'"?%#$@,. \t\r\n]"#).expect("valid regex"));

/// `(style, pattern)` in precedence order.
static RULES: LazyLock<Vec<(AddressStyle, Regex)>> = LazyLock::new(|| {
    [
        (AddressStyle::Lower, r"^[a-z_\s]+$"),
        (AddressStyle::Uppercase, r"^[A-Z_\s]+$"),
        (
            AddressStyle::Capitalized,
            r"^[A-Z][a-z]*\s+(?:[A-Z]?[a-z]*|\s+)*$",
        ),
        (AddressStyle::LowerColon, r"^[a-z_]*:[a-z_]*$"),
        (AddressStyle::UppercaseColon, r"^[A-Z_\s:]+$"),
        (
            AddressStyle::CapitalizedColon,
            r"^[A-Z][a-z]+\s+(?:[A-Z][a-z]*|\s+|:)*$",
        ),
    ]
    .into_iter()
    .map(|(style, pattern)| (style, Regex::new(pattern).expect("valid regex")))
    .collect()
});

/// Buckets `value` by how it is written.
#[must_use]
pub fn classify_address_style(value: &str) -> AddressStyle {
    if let Some((style, _)) = RULES.iter().find(|(_, re)| re.is_match(value)) {
        return *style;
    }
    if has_problem_chars(value) {
        return AddressStyle::ProblemChars;
    }
    AddressStyle::Other
}

/// Returns `true` if `value` contains any of
/// `= + / & < > ; ' " ? % # $ @ , .`, a space, tab, CR or LF.
#[must_use]
pub fn has_problem_chars(value: &str) -> bool {
    PROBLEM_CHARS_RE.is_match(value)
}
