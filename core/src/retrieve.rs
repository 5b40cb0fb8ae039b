use crate::index::{Index, PassageId, TermWeight};
use serde::Serialize;
use std::cmp::Ordering;

/// Returned verbatim whenever no passage has any lexical overlap with the
/// query.
pub const FALLBACK_ANSWER: &str =
    "Sorry, I couldn't find that information in the uploaded report.";

#[derive(Debug, Clone, Serialize)]
pub struct ScoredPassage {
    pub id: PassageId,
    pub score: f32,
}

/// Score every passage against `query` and return the top `k` by cosine
/// similarity, ties broken by ascending passage id. Empty when the query
/// projects to an empty vector.
pub fn retrieve(query: &str, index: &Index, k: usize) -> Vec<ScoredPassage> {
    let query_vector = index.query_vector(query);
    if query_vector.is_empty() {
        return Vec::new();
    }
    let mut scored: Vec<ScoredPassage> = index
        .vectors()
        .iter()
        .enumerate()
        .map(|(id, v)| ScoredPassage {
            id: id as PassageId,
            score: dot(&query_vector, v),
        })
        .collect();
    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    scored.truncate(k.max(1));
    scored
}

/// Top passages for `query`, or `None` when nothing is relevant: an empty
/// or whitespace-only query, no in-vocabulary terms, or a top score of
/// exactly zero.
pub fn best_passages(query: &str, index: &Index, k: usize) -> Option<Vec<ScoredPassage>> {
    if query.trim().is_empty() {
        return None;
    }
    let scored = retrieve(query, index, k);
    match scored.first() {
        Some(best) if best.score > 0.0 => Some(scored),
        _ => None,
    }
}

/// Answer `query` by concatenating the top passages' raw text in
/// descending-score order, or the fixed fallback when nothing matches.
pub fn answer(query: &str, index: &Index, k: usize) -> String {
    match best_passages(query, index, k) {
        Some(top) => join_passages(index, &top),
        None => FALLBACK_ANSWER.to_string(),
    }
}

/// Concatenate the raw text of the given passages, in order, with single
/// spaces.
pub fn join_passages(index: &Index, top: &[ScoredPassage]) -> String {
    top.iter()
        .filter_map(|s| index.passage(s.id))
        .map(|p| p.raw_text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

// Both vectors are sorted by term id, so cosine reduces to a merge walk.
fn dot(a: &[TermWeight], b: &[TermWeight]) -> f32 {
    let (mut i, mut j, mut sum) = (0, 0, 0.0);
    while i < a.len() && j < b.len() {
        match a[i].term_id.cmp(&b[j].term_id) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                sum += a[i].weight * b[j].weight;
                i += 1;
                j += 1;
            }
        }
    }
    sum
}
