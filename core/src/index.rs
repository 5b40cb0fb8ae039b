use crate::normalize::normalize;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

pub type TermId = u32;
pub type PassageId = u32;

/// Vocabulary size cap. Excess terms are dropped by descending corpus
/// frequency, ties broken by ascending term.
pub const MAX_VOCAB_TERMS: usize = 3000;

#[derive(Debug, Clone, Serialize)]
pub struct Passage {
    pub id: PassageId,
    /// Human-readable chunk surfaced to the user.
    pub raw_text: String,
    /// Lowercase, alphabetic-only, stopword-filtered form used for
    /// vectorization. Filled in by `Index::build`.
    #[serde(skip)]
    pub normalized_text: String,
}

impl Passage {
    pub fn new(id: PassageId, raw_text: String) -> Self {
        Self { id, raw_text, normalized_text: String::new() }
    }
}

/// Term → dense column index, immutable after index build.
#[derive(Debug, Default, Clone)]
pub struct Vocabulary {
    terms: HashMap<String, TermId>,
}

impl Vocabulary {
    fn from_passages(passages: &[Passage], cap: usize) -> Self {
        let mut corpus_tf: HashMap<&str, u64> = HashMap::new();
        for p in passages {
            for tok in p.normalized_text.split_whitespace() {
                *corpus_tf.entry(tok).or_insert(0) += 1;
            }
        }
        let mut ranked: Vec<(&str, u64)> = corpus_tf.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(cap);
        // Column ids in lexicographic term order, independent of frequency.
        let mut selected: Vec<&str> = ranked.into_iter().map(|(t, _)| t).collect();
        selected.sort_unstable();
        let terms = selected
            .into_iter()
            .enumerate()
            .map(|(i, t)| (t.to_string(), i as TermId))
            .collect();
        Self { terms }
    }

    pub fn term_id(&self, term: &str) -> Option<TermId> {
        self.terms.get(term).copied()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TermWeight {
    pub term_id: TermId,
    pub weight: f32,
}

/// TF-IDF weighted, L2-normalized vector, sorted by term id. Empty for
/// passages with no in-vocabulary tokens.
pub type SparseVector = Vec<TermWeight>;

/// Immutable vector space over one document's passages. Built exactly once;
/// every query is a pure read against it.
#[derive(Debug, Clone)]
pub struct Index {
    passages: Vec<Passage>,
    vocabulary: Vocabulary,
    idf: Vec<f32>,
    vectors: Vec<SparseVector>,
}

impl Index {
    pub fn build(mut passages: Vec<Passage>) -> Self {
        for p in &mut passages {
            p.normalized_text = normalize(&p.raw_text);
        }
        let vocabulary = Vocabulary::from_passages(&passages, MAX_VOCAB_TERMS);

        let n = passages.len();
        let mut df = vec![0u32; vocabulary.len()];
        for p in &passages {
            let mut seen: HashSet<TermId> = HashSet::new();
            for tok in p.normalized_text.split_whitespace() {
                if let Some(tid) = vocabulary.term_id(tok) {
                    if seen.insert(tid) {
                        df[tid as usize] += 1;
                    }
                }
            }
        }
        // Smoothed IDF: terms present in every passage get the lowest
        // still-positive weight, rare terms the highest.
        let idf: Vec<f32> = df
            .iter()
            .map(|&d| (((1 + n) as f32) / ((1 + d) as f32)).ln() + 1.0)
            .collect();

        let vectors: Vec<SparseVector> = passages
            .iter()
            .map(|p| weigh(&p.normalized_text, &vocabulary, &idf))
            .collect();

        tracing::debug!(passages = n, terms = vocabulary.len(), "index built");
        Self { passages, vocabulary, idf, vectors }
    }

    /// Project a query into the index's vector space. Out-of-vocabulary
    /// terms drop out; an empty result means no lexical overlap is possible.
    pub fn query_vector(&self, query: &str) -> SparseVector {
        weigh(&normalize(query), &self.vocabulary, &self.idf)
    }

    pub fn passages(&self) -> &[Passage] {
        &self.passages
    }

    pub fn passage(&self, id: PassageId) -> Option<&Passage> {
        self.passages.get(id as usize)
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn vectors(&self) -> &[SparseVector] {
        &self.vectors
    }

    pub fn vector(&self, id: PassageId) -> Option<&SparseVector> {
        self.vectors.get(id as usize)
    }
}

/// Sublinear TF × IDF, L2-normalized. The same transform serves passages at
/// build time and queries at answer time.
fn weigh(normalized: &str, vocabulary: &Vocabulary, idf: &[f32]) -> SparseVector {
    let mut counts: HashMap<TermId, u32> = HashMap::new();
    for tok in normalized.split_whitespace() {
        if let Some(tid) = vocabulary.term_id(tok) {
            *counts.entry(tid).or_insert(0) += 1;
        }
    }
    let mut weights: SparseVector = counts
        .into_iter()
        .map(|(tid, count)| TermWeight {
            term_id: tid,
            weight: (1.0 + (count as f32).ln()) * idf[tid as usize],
        })
        .collect();
    let norm = weights.iter().map(|w| w.weight * w.weight).sum::<f32>().sqrt();
    if norm > 0.0 {
        for w in &mut weights {
            w.weight /= norm;
        }
    }
    weights.sort_by_key(|w| w.term_id);
    weights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::chunk;

    fn build(text: &str) -> Index {
        Index::build(chunk(text, 80))
    }

    #[test]
    fn vectors_are_unit_length() {
        let index = build("Revenue grew strongly. Margins improved across segments.");
        for v in index.vectors() {
            let norm: f32 = v.iter().map(|w| w.weight * w.weight).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn all_stopword_passage_has_zero_vector() {
        let index = Index::build(vec![
            Passage::new(0, "It was the and of a but.".into()),
            Passage::new(1, "Factories expanded production capacity.".into()),
        ]);
        assert!(index.vector(0).unwrap().is_empty());
        assert!(!index.vector(1).unwrap().is_empty());
    }

    #[test]
    fn vocabulary_cap_keeps_most_frequent_terms() {
        let mut passages = vec![Passage::new(0, "alpha alpha alpha beta beta gamma".into())];
        passages[0].normalized_text = normalize(&passages[0].raw_text);
        let vocab = Vocabulary::from_passages(&passages, 2);
        assert_eq!(vocab.len(), 2);
        assert!(vocab.term_id("alpha").is_some());
        assert!(vocab.term_id("beta").is_some());
        assert!(vocab.term_id("gamma").is_none());
    }

    #[test]
    fn rare_terms_outweigh_ubiquitous_ones() {
        let index = Index::build(vec![
            Passage::new(0, "turnover grew steadily".into()),
            Passage::new(1, "turnover dipped briefly".into()),
            Passage::new(2, "turnover held flat".into()),
        ]);
        let vocab = index.vocabulary();
        let everywhere = vocab.term_id("turnover").unwrap();
        let rare = vocab.term_id("dipped").unwrap();
        let v = index.vector(1).unwrap();
        let weight_of = |tid| v.iter().find(|w| w.term_id == tid).unwrap().weight;
        assert!(weight_of(rare) > weight_of(everywhere));
        assert!(weight_of(everywhere) > 0.0);
    }
}
