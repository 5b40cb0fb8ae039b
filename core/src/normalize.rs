use crate::stopwords;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NON_ALPHA: Regex = Regex::new(r"[^a-z\s]").expect("valid regex");
}

/// Normalize text for vectorization: lowercase, strip everything outside
/// lowercase Latin letters and whitespace, drop stopwords, rejoin with
/// single spaces. Idempotent.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = NON_ALPHA.replace_all(&lowered, " ");
    stripped
        .split_whitespace()
        .filter(|t| !stopwords::is_stopword(t))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Collapse newlines and whitespace runs to single spaces. Callers apply
/// this to extracted document text before chunking.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
