//! Person-name helpers shared by the scrape verifier and the email generator.

use once_cell::sync::Lazy;
use regex::Regex;

static QUOTED_NICKNAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"["'].*?["']"#).expect("valid nickname regex"));
static NAME_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:jr|sr|ii|iii|iv)\b\.?").expect("valid suffix regex"));
static PARENTHESIZED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\([^)]*\)").expect("valid parenthesis regex"));

/// First and last name, lowercased ASCII. Either part may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameParts {
    pub first: String,
    pub last: String,
}

impl NameParts {
    pub fn is_empty(&self) -> bool {
        self.first.is_empty() && self.last.is_empty()
    }
}

/// Transliterates to ASCII (`José Müller` -> `Jose Muller`).
pub(crate) fn to_ascii(text: &str) -> String {
    deunicode::deunicode(text)
}

/// Splits a display name into first and last parts.
///
/// Nicknames in quotes, generational suffixes and parenthesized notes are
/// dropped. A single remaining token is treated as the first name.
pub fn split_name(name: &str) -> NameParts {
    if name.trim().is_empty() {
        return NameParts::default();
    }
    let ascii = to_ascii(name);
    let without_nick = QUOTED_NICKNAME.replace_all(&ascii, "");
    let without_suffix = NAME_SUFFIX.replace_all(&without_nick, "");
    let cleaned = PARENTHESIZED.replace_all(&without_suffix, "");

    let parts: Vec<&str> = cleaned
        .split_whitespace()
        .map(|p| p.trim_matches(','))
        .filter(|p| !p.is_empty())
        .collect();
    match parts.as_slice() {
        [] => NameParts::default(),
        [only] => NameParts {
            first: only.to_lowercase(),
            last: String::new(),
        },
        [first, .., last] => NameParts {
            first: first.to_lowercase(),
            last: last.to_lowercase(),
        },
    }
}
