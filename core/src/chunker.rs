use crate::index::{Passage, PassageId};

/// Split document text into passages of at most `max_chars` characters,
/// never breaking inside a sentence. The bound is soft: a single sentence
/// longer than `max_chars` is emitted whole. Empty input yields one empty
/// passage.
pub fn chunk(text: &str, max_chars: usize) -> Vec<Passage> {
    let mut passages: Vec<Passage> = Vec::new();
    let mut buf = String::new();
    for s in split_sentences(text) {
        if buf.is_empty() {
            buf.push_str(s);
        } else if buf.len() + 1 + s.len() <= max_chars {
            buf.push(' ');
            buf.push_str(s);
        } else {
            let id = passages.len() as PassageId;
            passages.push(Passage::new(id, std::mem::take(&mut buf)));
            buf.push_str(s);
        }
    }
    let id = passages.len() as PassageId;
    passages.push(Passage::new(id, buf));
    passages
}

/// Sentence boundaries: a run of ASCII terminators followed by whitespace
/// or end of input. Trailing text without a terminator counts as a final
/// sentence.
fn split_sentences(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if !is_terminator(bytes[i]) || is_initial(bytes, i) {
            i += 1;
            continue;
        }
        let mut end = i + 1;
        while end < bytes.len() && is_terminator(bytes[end]) {
            end += 1;
        }
        if end == bytes.len() || bytes[end].is_ascii_whitespace() {
            push_trimmed(&mut sentences, &text[start..end]);
            start = end;
        }
        i = end;
    }
    if start < bytes.len() {
        push_trimmed(&mut sentences, &text[start..]);
    }
    sentences
}

fn is_terminator(b: u8) -> bool {
    matches!(b, b'.' | b'!' | b'?')
}

// "U.S.", "A. Smith": a single uppercase letter right before a period is an
// initial, not a sentence boundary.
fn is_initial(bytes: &[u8], i: usize) -> bool {
    bytes[i] == b'.'
        && i >= 1
        && bytes[i - 1].is_ascii_uppercase()
        && (i == 1 || bytes[i - 2] == b' ')
}

fn push_trimmed<'a>(sentences: &mut Vec<&'a str>, s: &'a str) {
    let s = s.trim();
    if !s.is_empty() {
        sentences.push(s);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_sentences_up_to_the_bound() {
        let text = "One two three. Four five six. Seven eight nine.";
        let passages = chunk(text, 30);
        assert_eq!(passages.len(), 2);
        assert_eq!(passages[0].raw_text, "One two three. Four five six.");
        assert_eq!(passages[1].raw_text, "Seven eight nine.");
        assert!(passages.iter().enumerate().all(|(i, p)| p.id == i as u32));
    }

    #[test]
    fn oversized_sentence_is_emitted_whole() {
        let long = "This single sentence is far longer than the configured passage budget.";
        let passages = chunk(long, 10);
        assert_eq!(passages.len(), 1);
        assert_eq!(passages[0].raw_text, long);
    }

    #[test]
    fn empty_input_yields_one_empty_passage() {
        let passages = chunk("", 800);
        assert_eq!(passages.len(), 1);
        assert_eq!(passages[0].id, 0);
        assert_eq!(passages[0].raw_text, "");
    }

    #[test]
    fn question_and_exclamation_terminators() {
        let sents = split_sentences("Did it work? It did! Good.");
        assert_eq!(sents, vec!["Did it work?", "It did!", "Good."]);
    }

    #[test]
    fn initials_do_not_end_sentences() {
        let sents = split_sentences("A. Smith signed the report. It was filed.");
        assert_eq!(sents.len(), 2);
        assert_eq!(sents[0], "A. Smith signed the report.");
    }

    #[test]
    fn trailing_text_without_terminator_is_a_sentence() {
        let sents = split_sentences("First part. and a trailing fragment");
        assert_eq!(sents, vec!["First part.", "and a trailing fragment"]);
    }
}
