use std::sync::LazyLock;

use regex::Regex;

static NON_UNIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\d-]").unwrap());

/// The course code column reads `"<dept abbr> <number>"`; the number, with
/// any trailing letter suffix ("491A"), is everything after the last space.
pub fn extract_number(raw: &str) -> String {
    match raw.rfind(' ') {
        Some(idx) => raw[idx..].trim().to_string(),
        None => raw.trim().to_string(),
    }
}

/// Keep only digits and hyphens so unit ranges like `"1-3"` survive.
pub fn extract_units(raw: &str) -> String {
    NON_UNIT_RE.replace_all(raw, "").to_string()
}
