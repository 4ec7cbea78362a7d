use std::sync::LazyLock;

use regex::Regex;

static PAREN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[()]").unwrap());

/// Department heading parts, split out of strings shaped like
/// `"Computer Engineering and Computer Science-(CECS)"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentParts {
    pub abbr: String,
    pub title: String,
}

/// Split at the last `-`; the trailing part minus its parentheses is the
/// abbreviation. A heading without a hyphen has no abbreviation to take.
pub fn extract(raw: &str) -> DepartmentParts {
    let Some(idx) = raw.rfind('-') else {
        return DepartmentParts {
            abbr: String::new(),
            title: raw.trim().to_string(),
        };
    };

    let (title, tail) = raw.split_at(idx);
    let abbr = PAREN_RE.replace_all(tail, "").replacen('-', "", 1);

    DepartmentParts {
        abbr: abbr.trim().to_string(),
        title: title.trim().to_string(),
    }
}
