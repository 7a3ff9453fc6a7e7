//! Re-tokenization of named-entity text
//!
//! Named-entity expansion needs the text of a multi-word entity split back
//! into single-word terms, without the annotator merging them into one
//! entity again. The [`Retokenizer`] trait is that seam; callers with a
//! real NLP pipeline implement it, and [`SimpleRetokenizer`] provides a
//! UAX #29 word segmenter for everything else.

use crate::errors::{KeywordError, Result};
use crate::types::TokenOccurrence;
use unicode_segmentation::UnicodeSegmentation;

/// Tokenizes text without named-entity recognition.
///
/// # Contract
///
/// - Returned occurrences are ordered by `start`.
/// - Offsets are byte offsets into `text` (`0..text.len()`) on char
///   boundaries. Entity expansion turns them into the document's character
///   offsets.
/// - Token ids are local to the call; the caller re-identifies them.
pub trait Retokenizer {
    fn tokenize_without_named_entities(&self, text: &str) -> Result<Vec<TokenOccurrence>>;
}

/// A Unicode-aware word segmenter following UAX #29
#[derive(Debug, Clone, Default)]
pub struct SimpleRetokenizer {
    /// Lowercase and strip simple English inflections from values
    lemmatize: bool,
}

impl SimpleRetokenizer {
    /// Create a retokenizer that lowercases values
    pub fn new() -> Self {
        Self { lemmatize: false }
    }

    /// Builder method: enable basic English lemmatization
    pub fn with_lemmatization(mut self, lemmatize: bool) -> Self {
        self.lemmatize = lemmatize;
        self
    }

    /// Heuristic Penn Treebank tag for a word
    fn guess_pos(&self, word: &str, lower: &str) -> &'static str {
        match lower {
            "a" | "an" | "the" | "this" | "that" | "these" | "those" => return "DT",
            "and" | "or" | "but" | "nor" => return "CC",
            "of" | "to" | "in" | "for" | "on" | "with" | "at" | "from" | "by" | "about"
            | "as" | "into" | "over" | "under" => return "IN",
            _ => {}
        }

        if word.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
            return "CD";
        }
        if word.chars().next().is_some_and(|c| c.is_uppercase()) {
            return "NNP";
        }
        if lower.ends_with("ful")
            || lower.ends_with("ous")
            || lower.ends_with("ive")
            || lower.ends_with("able")
            || lower.ends_with("al")
            || lower.ends_with("ic")
        {
            return "JJ";
        }
        "NN"
    }

    /// Basic English lemmatization (plural and -ing/-ed endings)
    fn basic_lemmatize(&self, lower: &str) -> String {
        if lower.ends_with("ies") && lower.len() > 4 {
            return format!("{}y", &lower[..lower.len() - 3]);
        }
        if lower.ends_with("es") && lower.len() > 3 {
            let stem = &lower[..lower.len() - 2];
            if stem.ends_with("ss")
                || stem.ends_with("sh")
                || stem.ends_with("ch")
                || stem.ends_with('x')
            {
                return stem.to_string();
            }
        }
        if lower.ends_with('s') && lower.len() > 3 && !lower.ends_with("ss") {
            return lower[..lower.len() - 1].to_string();
        }
        lower.to_string()
    }
}

impl Retokenizer for SimpleRetokenizer {
    fn tokenize_without_named_entities(&self, text: &str) -> Result<Vec<TokenOccurrence>> {
        if text.trim().is_empty() {
            return Err(KeywordError::collaborator(text, "nothing to tokenize"));
        }

        let tokens = text
            .unicode_word_indices()
            .filter(|(_, word)| word.chars().any(|c| c.is_alphanumeric()))
            .enumerate()
            .map(|(i, (start, word))| {
                let lower = word.to_lowercase();
                let pos = self.guess_pos(word, &lower);
                let value = if self.lemmatize {
                    self.basic_lemmatize(&lower)
                } else {
                    lower
                };
                TokenOccurrence::new(i as i64, value, start, start + word.len()).with_pos(pos)
            })
            .collect();

        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_split() {
        let tokens = SimpleRetokenizer::new()
            .tokenize_without_named_entities("Bank of America")
            .unwrap();

        let values: Vec<_> = tokens.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(values, vec!["bank", "of", "america"]);
        assert_eq!((tokens[2].start, tokens[2].end), (8, 15));
        assert!(tokens[0].parts_of_speech.contains("NNP"));
        assert!(tokens[1].parts_of_speech.contains("IN"));
    }

    #[test]
    fn test_punctuation_dropped() {
        let tokens = SimpleRetokenizer::new()
            .tokenize_without_named_entities("Procter & Gamble, Inc.")
            .unwrap();
        let values: Vec<_> = tokens.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(values, vec!["procter", "gamble", "inc"]);
    }

    #[test]
    fn test_unicode_words() {
        let tokens = SimpleRetokenizer::new()
            .tokenize_without_named_entities("Café Müller")
            .unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].value, "café");
        assert_eq!(tokens[1].value, "müller");
    }

    #[test]
    fn test_lemmatization() {
        let retokenizer = SimpleRetokenizer::new().with_lemmatization(true);
        let tokens = retokenizer
            .tokenize_without_named_entities("United States Studies")
            .unwrap();
        let values: Vec<_> = tokens.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(values, vec!["united", "state", "study"]);
    }

    #[test]
    fn test_blank_text_is_collaborator_error() {
        let err = SimpleRetokenizer::new()
            .tokenize_without_named_entities("   ")
            .unwrap_err();
        assert!(err.is_recoverable());
    }
}
