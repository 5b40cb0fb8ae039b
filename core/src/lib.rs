//! Single-document question answering over a TF-IDF vector space.
//!
//! Pipeline: extracted text → [`chunker`] → passages → [`Index::build`] →
//! vocabulary + passage vectors → [`retrieve`] → ranked passages → answer.
//! The index is built once per document and read-only afterwards.

pub mod chunker;
mod index;
pub mod normalize;
pub mod retrieve;
pub mod stopwords;

pub use index::{Index, Passage, PassageId, SparseVector, TermId, TermWeight, Vocabulary,
    MAX_VOCAB_TERMS};
pub use retrieve::{best_passages, retrieve, ScoredPassage, FALLBACK_ANSWER};

pub const DEFAULT_CHUNK_SIZE: usize = 800;
pub const DEFAULT_TOP_K: usize = 2;

/// Chunk `document_text` into passages of at most `chunk_size` characters
/// and build the TF-IDF index over them. The text is expected to be
/// whitespace-normalized (see [`normalize::collapse_whitespace`]).
pub fn build_index(document_text: &str, chunk_size: usize) -> Index {
    Index::build(chunker::chunk(document_text, chunk_size))
}

/// Answer `query_text` from the `top_k` best-matching passages, falling
/// back to [`FALLBACK_ANSWER`] when nothing in the document is relevant.
pub fn answer(query_text: &str, index: &Index, top_k: usize) -> String {
    retrieve::answer(query_text, index, top_k)
}
