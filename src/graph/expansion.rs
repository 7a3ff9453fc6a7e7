//! Named-entity expansion
//!
//! A multi-word entity ("Bank of America") is a single term to the
//! annotator. Expansion re-tokenizes its text without NER and maps the
//! resulting words back onto the document's own term ids, so that the
//! words can be ranked individually and linked to the rest of the text.

use crate::nlp::tokenizer::Retokenizer;
use crate::types::{Document, TokenId, TokenOccurrence};
use rustc_hash::FxHashMap;
use tracing::warn;

/// One distinct entity term that was split into sub-terms
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedEntity {
    /// Id of the entity term in the document
    pub entity_id: TokenId,
    /// Original entity text
    pub text: String,
    /// Sub-term ids in reading order
    pub sub_tokens: Vec<TokenId>,
}

/// Per-evaluation expansion context
///
/// Holds the value -> id lookup of the document, the synthetic id counter
/// and a cache of re-tokenized entity texts. Nothing here outlives one
/// document.
pub struct EntityExpander<'a> {
    retokenizer: &'a dyn Retokenizer,
    /// Lowercase value -> real term id, from single-word terms of the document
    known_ids: FxHashMap<String, TokenId>,
    /// Lowercase value -> synthetic id minted in this run
    synthetic_ids: FxHashMap<String, TokenId>,
    next_synthetic: i64,
    /// Entity text -> re-tokenized words (`None` after a failure)
    cache: FxHashMap<String, Option<Vec<TokenOccurrence>>>,
    failures: usize,
}

impl<'a> EntityExpander<'a> {
    /// Create an expander for one document
    pub fn new(retokenizer: &'a dyn Retokenizer, document: &Document) -> Self {
        let tokens = || document.sentences.iter().flat_map(|s| s.tokens.iter());

        let mut known_ids = FxHashMap::default();
        for token in tokens().filter(|t| !t.is_multi_word()) {
            known_ids
                .entry(token.value.to_lowercase())
                .or_insert(token.token_id);
        }

        // Minted ids stay below every id the document already uses
        let lowest = tokens().map(|t| t.token_id.0).min().unwrap_or(0);

        Self {
            retokenizer,
            known_ids,
            synthetic_ids: FxHashMap::default(),
            next_synthetic: lowest.min(0) - 1,
            cache: FxHashMap::default(),
            failures: 0,
        }
    }

    /// Split one entity occurrence into sub-term occurrences
    ///
    /// Offsets of the returned occurrences are absolute character offsets in
    /// the document; the collaborator's byte offsets are converted.
    /// Returns `None` when the collaborator fails or returns fewer than two
    /// well-formed words; the failure is logged and the entity is left as
    /// it is.
    pub fn expand(&mut self, entity: &TokenOccurrence) -> Option<Vec<TokenOccurrence>> {
        let words = self.retokenize(&entity.value)?;

        let sub_tokens = words
            .into_iter()
            .map(|word| {
                let key = word.value.to_lowercase();
                let token_id = self.resolve_id(&key);
                TokenOccurrence {
                    token_id,
                    value: word.value,
                    start: entity.start + char_offset(&entity.value, word.start),
                    end: entity.start + char_offset(&entity.value, word.end),
                    parts_of_speech: word.parts_of_speech,
                    named_entities: Default::default(),
                }
            })
            .collect();

        Some(sub_tokens)
    }

    /// Number of synthetic ids minted so far
    pub fn synthetic_count(&self) -> usize {
        self.synthetic_ids.len()
    }

    /// Number of entity texts the collaborator failed on
    pub fn failure_count(&self) -> usize {
        self.failures
    }

    fn retokenize(&mut self, text: &str) -> Option<Vec<TokenOccurrence>> {
        if let Some(cached) = self.cache.get(text) {
            return cached.clone();
        }

        let result = match self.retokenizer.tokenize_without_named_entities(text) {
            Ok(words) if Self::well_formed(text, &words) => Some(words),
            Ok(words) => {
                warn!(
                    entity = text,
                    words = words.len(),
                    "re-tokenization returned malformed data; entity not expanded"
                );
                None
            }
            Err(err) => {
                warn!(entity = text, error = %err, "re-tokenization failed; entity not expanded");
                None
            }
        };

        if result.is_none() {
            self.failures += 1;
        }
        self.cache.insert(text.to_string(), result.clone());
        result
    }

    fn well_formed(text: &str, words: &[TokenOccurrence]) -> bool {
        words.len() >= 2
            && words.iter().all(|w| {
                !w.value.trim().is_empty()
                    && w.start < w.end
                    && w.end <= text.len()
                    && text.is_char_boundary(w.start)
                    && text.is_char_boundary(w.end)
            })
    }

    fn resolve_id(&mut self, key: &str) -> TokenId {
        if let Some(&id) = self.known_ids.get(key) {
            return id;
        }
        if let Some(&id) = self.synthetic_ids.get(key) {
            return id;
        }
        let id = TokenId(self.next_synthetic);
        self.next_synthetic -= 1;
        self.synthetic_ids.insert(key.to_string(), id);
        id
    }
}

/// Character count of the first `byte` bytes of `text`
fn char_offset(text: &str, byte: usize) -> usize {
    text.get(..byte).map_or(0, |prefix| prefix.chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{KeywordError, Result};
    use crate::nlp::tokenizer::SimpleRetokenizer;
    use crate::types::Sentence;
    use std::cell::Cell;

    struct CountingRetokenizer {
        calls: Cell<usize>,
    }

    impl Retokenizer for CountingRetokenizer {
        fn tokenize_without_named_entities(&self, text: &str) -> Result<Vec<TokenOccurrence>> {
            self.calls.set(self.calls.get() + 1);
            SimpleRetokenizer::new().tokenize_without_named_entities(text)
        }
    }

    struct FailingRetokenizer;

    impl Retokenizer for FailingRetokenizer {
        fn tokenize_without_named_entities(&self, text: &str) -> Result<Vec<TokenOccurrence>> {
            Err(KeywordError::collaborator(text, "pipeline unavailable"))
        }
    }

    fn document() -> Document {
        Document::new(vec![Sentence::new(
            0,
            vec![
                TokenOccurrence::new(1, "America", 0, 7),
                TokenOccurrence::new(2, "Bank of America", 20, 35).with_named_entity("ORGANIZATION"),
            ],
        )])
    }

    #[test]
    fn test_expand_reuses_known_ids_and_mints_synthetic() {
        let doc = document();
        let retokenizer = SimpleRetokenizer::new();
        let mut expander = EntityExpander::new(&retokenizer, &doc);

        let subs = expander.expand(&doc.sentences[0].tokens[1]).unwrap();
        let ids: Vec<_> = subs.iter().map(|t| t.token_id).collect();

        // "america" matches the real term 1, the others get synthetic ids
        assert_eq!(ids[2], TokenId(1));
        assert_eq!(ids[0], TokenId(-1));
        assert_eq!(ids[1], TokenId(-2));
        assert_eq!(expander.synthetic_count(), 2);

        // Offsets are shifted into the document
        assert_eq!((subs[0].start, subs[0].end), (20, 24));
        assert_eq!((subs[2].start, subs[2].end), (28, 35));
    }

    #[test]
    fn test_synthetic_ids_are_stable_within_a_run() {
        let doc = document();
        let retokenizer = SimpleRetokenizer::new();
        let mut expander = EntityExpander::new(&retokenizer, &doc);

        let first = expander.expand(&doc.sentences[0].tokens[1]).unwrap();
        let other = TokenOccurrence::new(3, "Bank Holding", 40, 52).with_named_entity("ORGANIZATION");
        let second = expander.expand(&other).unwrap();

        assert_eq!(first[0].token_id, second[0].token_id); // "bank"
        assert_eq!(second[1].token_id, TokenId(-3)); // "holding"
    }

    #[test]
    fn test_retokenization_is_cached() {
        let doc = document();
        let retokenizer = CountingRetokenizer { calls: Cell::new(0) };
        let mut expander = EntityExpander::new(&retokenizer, &doc);

        let entity = &doc.sentences[0].tokens[1];
        assert!(expander.expand(entity).is_some());
        assert!(expander.expand(entity).is_some());
        assert_eq!(retokenizer.calls.get(), 1);
    }

    #[test]
    fn test_collaborator_failure_is_skipped() {
        let doc = document();
        let mut expander = EntityExpander::new(&FailingRetokenizer, &doc);

        assert!(expander.expand(&doc.sentences[0].tokens[1]).is_none());
        assert!(expander.expand(&doc.sentences[0].tokens[1]).is_none());
        // Cached failure: counted once, not retried
        assert_eq!(expander.failure_count(), 1);
    }

    #[test]
    fn test_synthetic_ids_avoid_negative_document_ids() {
        let doc = Document::new(vec![Sentence::new(
            0,
            vec![
                TokenOccurrence::new(-1, "river", 0, 5),
                TokenOccurrence::new(7, "Acme Holding", 6, 18).with_named_entity("ORGANIZATION"),
            ],
        )]);
        let retokenizer = SimpleRetokenizer::new();
        let mut expander = EntityExpander::new(&retokenizer, &doc);

        let subs = expander.expand(&doc.sentences[0].tokens[1]).unwrap();
        let ids: Vec<_> = subs.iter().map(|t| t.token_id).collect();
        assert_eq!(ids, vec![TokenId(-2), TokenId(-3)]);
        assert!(!ids.contains(&TokenId(-1)));
    }

    #[test]
    fn test_offsets_count_characters() {
        let entity = TokenOccurrence::new(5, "Café Müller", 10, 21).with_named_entity("PERSON");
        let doc = Document::new(vec![Sentence::new(0, vec![entity.clone()])]);
        let retokenizer = SimpleRetokenizer::new();
        let mut expander = EntityExpander::new(&retokenizer, &doc);

        let subs = expander.expand(&entity).unwrap();
        assert_eq!((subs[0].start, subs[0].end), (10, 14));
        assert_eq!((subs[1].start, subs[1].end), (15, 21));
        assert_eq!(subs[1].end, entity.end);
    }
}
