use anyhow::{Context, Result};
use lazy_static::lazy_static;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Env var pointing at a newline-separated stopword file. When unset the
/// built-in English list is used.
pub const STOPWORDS_PATH_VAR: &str = "STOPWORDS_PATH";

// English stopword list, including the single-letter residue tokens
// ("s", "t", "d", ...) left behind once punctuation is stripped.
static ENGLISH: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "ain", "all", "am", "an", "and", "any",
    "are", "aren", "aren't", "as", "at",
    "be", "because", "been", "before", "being", "below", "between", "both", "but", "by",
    "can", "couldn", "couldn't",
    "d", "did", "didn", "didn't", "do", "does", "doesn", "doesn't", "doing", "don", "don't",
    "down", "during",
    "each", "few", "for", "from", "further",
    "had", "hadn", "hadn't", "has", "hasn", "hasn't", "have", "haven", "haven't", "having", "he",
    "her", "here", "hers", "herself", "him", "himself", "his", "how",
    "i", "if", "in", "into", "is", "isn", "isn't", "it", "it's", "its", "itself",
    "just",
    "ll",
    "m", "ma", "me", "mightn", "mightn't", "more", "most", "mustn", "mustn't", "my", "myself",
    "needn", "needn't", "no", "nor", "not", "now",
    "o", "of", "off", "on", "once", "only", "or", "other", "our", "ours", "ourselves", "out",
    "over", "own",
    "re",
    "s", "same", "shan", "shan't", "she", "she's", "should", "should've", "shouldn", "shouldn't",
    "so", "some", "such",
    "t", "than", "that", "that'll", "the", "their", "theirs", "them", "themselves", "then",
    "there", "these", "they", "this", "those", "through", "to", "too",
    "under", "until", "up",
    "ve", "very",
    "was", "wasn", "wasn't", "we", "were", "weren", "weren't", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "won", "won't", "wouldn", "wouldn't",
    "y", "you", "you'd", "you'll", "you're", "you've", "your", "yours", "yourself", "yourselves",
];

lazy_static! {
    static ref STOPWORDS: HashSet<String> = load();
}

/// True when `token` should be dropped before vectorization.
pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(token)
}

// Resolved once at first use. An unreadable override file degrades to an
// empty set (tokens pass unfiltered) instead of failing the pipeline.
fn load() -> HashSet<String> {
    match std::env::var(STOPWORDS_PATH_VAR) {
        Ok(path) => match read_list(Path::new(&path)) {
            Ok(words) => words,
            Err(err) => {
                tracing::warn!(%path, %err, "stopword list unavailable, filtering disabled");
                HashSet::new()
            }
        },
        Err(_) => ENGLISH.iter().map(|w| (*w).to_string()).collect(),
    }
}

fn read_list(path: &Path) -> Result<HashSet<String>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading stopword list {}", path.display()))?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect())
}
