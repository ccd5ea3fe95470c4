//! Cleanup applied to every completion before it reaches the user.

use std::sync::LazyLock;

use regex::Regex;

// Control characters other than whitespace. Whitespace controls (tab,
// newline, ...) are left for the collapse step so words do not run together.
static CONTROL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x00-\x1F\x7F-\x9F&&[^\s]]").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static ASTERISK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*+").unwrap());

/// Strip control characters, collapse whitespace runs to one space, drop
/// HTML/XML-like tags and asterisks, then trim.
///
/// Newline, tab and carriage return are not deleted with the other control
/// characters. They are whitespace, so they collapse to a single space:
/// `"Rest.\nDrink water."` becomes `"Rest. Drink water."`, not
/// `"Rest.Drink water."`.
pub fn sanitize_response(text: &str) -> String {
    let text = CONTROL_RE.replace_all(text, "");
    let text = WHITESPACE_RE.replace_all(&text, " ");
    let text = TAG_RE.replace_all(&text, "");
    let text = ASTERISK_RE.replace_all(&text, "");
    text.trim().to_string()
}
