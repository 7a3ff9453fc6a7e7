//! Stopword filtering
//!
//! Three built-in English tiers (see [`StopwordTier`]); the large tier pulls
//! in the list shipped by the `stop-words` crate. Custom words extend any
//! tier.

use crate::types::StopwordTier;
use rustc_hash::FxHashSet;
use stop_words::{get, LANGUAGE};

const SMALL: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is",
    "it", "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there",
    "these", "they", "this", "to", "was", "will", "with",
];

const MEDIUM_EXTRA: &[&str] = &[
    "about", "after", "again", "all", "also", "am", "any", "been", "before", "being", "both",
    "can", "could", "did", "do", "does", "doing", "during", "each", "few", "from", "further",
    "had", "has", "have", "having", "he", "her", "here", "hers", "him", "his", "how", "i",
    "its", "just", "me", "more", "most", "my", "nor", "now", "only", "other", "our", "ours",
    "out", "over", "own", "same", "she", "should", "so", "some", "than", "them", "those",
    "through", "too", "under", "until", "up", "very", "we", "were", "what", "when", "where",
    "which", "while", "who", "whom", "why", "would", "you", "your", "yours",
];

/// A filter for removing stopwords from text
#[derive(Debug, Clone)]
pub struct StopwordFilter {
    /// Set of stopwords (lowercase)
    stopwords: FxHashSet<String>,
    /// Whether the filter is case-sensitive
    case_sensitive: bool,
}

impl Default for StopwordFilter {
    fn default() -> Self {
        Self::new(StopwordTier::Small)
    }
}

impl StopwordFilter {
    /// Create a filter holding one of the built-in tiers
    pub fn new(tier: StopwordTier) -> Self {
        Self {
            stopwords: Self::load_tier(tier),
            case_sensitive: false,
        }
    }

    /// Create an empty stopword filter (no filtering)
    pub fn empty() -> Self {
        Self {
            stopwords: FxHashSet::default(),
            case_sensitive: false,
        }
    }

    /// Create a stopword filter from a custom list
    pub fn from_list(words: &[&str]) -> Self {
        Self {
            stopwords: words.iter().map(|w| w.to_lowercase()).collect(),
            case_sensitive: false,
        }
    }

    /// Set case sensitivity
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Add additional stopwords to the filter
    pub fn add_stopwords<S: AsRef<str>>(&mut self, words: &[S]) {
        for word in words {
            self.stopwords.insert(word.as_ref().to_lowercase());
        }
    }

    /// Remove stopwords from the filter
    pub fn remove_stopwords<S: AsRef<str>>(&mut self, words: &[S]) {
        for word in words {
            self.stopwords.remove(&word.as_ref().to_lowercase());
        }
    }

    /// Check if a word is a stopword
    pub fn is_stopword(&self, word: &str) -> bool {
        if self.case_sensitive {
            self.stopwords.contains(word)
        } else {
            self.stopwords.contains(&word.to_lowercase())
        }
    }

    /// Get the number of stopwords in the filter
    pub fn len(&self) -> usize {
        self.stopwords.len()
    }

    /// Check if the filter is empty
    pub fn is_empty(&self) -> bool {
        self.stopwords.is_empty()
    }

    fn load_tier(tier: StopwordTier) -> FxHashSet<String> {
        let mut words: FxHashSet<String> = SMALL.iter().map(|s| s.to_string()).collect();
        if matches!(tier, StopwordTier::Medium | StopwordTier::Large) {
            words.extend(MEDIUM_EXTRA.iter().map(|s| s.to_string()));
        }
        if tier == StopwordTier::Large {
            words.extend(get(LANGUAGE::English).iter().map(|s| s.to_lowercase()));
        }
        words
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_tier() {
        let filter = StopwordFilter::new(StopwordTier::Small);

        assert!(filter.is_stopword("the"));
        assert!(filter.is_stopword("The")); // case insensitive
        assert!(filter.is_stopword("of"));
        assert!(!filter.is_stopword("which"));
        assert!(!filter.is_stopword("computer"));
    }

    #[test]
    fn test_tiers_are_nested() {
        let small = StopwordFilter::new(StopwordTier::Small);
        let medium = StopwordFilter::new(StopwordTier::Medium);
        let large = StopwordFilter::new(StopwordTier::Large);

        assert!(small.len() < medium.len());
        assert!(medium.len() < large.len());
        assert!(medium.is_stopword("which"));
        assert!(large.is_stopword("which"));
        assert!(large.is_stopword("the"));
        assert!(!large.is_stopword("computer"));
    }

    #[test]
    fn test_custom_stopwords() {
        let mut filter = StopwordFilter::from_list(&["custom", "words"]);

        assert!(filter.is_stopword("custom"));
        assert!(!filter.is_stopword("the"));

        filter.add_stopwords(&["extra"]);
        assert!(filter.is_stopword("extra"));

        filter.remove_stopwords(&["custom"]);
        assert!(!filter.is_stopword("custom"));
    }

    #[test]
    fn test_empty_filter() {
        let filter = StopwordFilter::empty();
        assert!(!filter.is_stopword("the"));
        assert!(filter.is_empty());
    }

    #[test]
    fn test_case_sensitivity() {
        let filter = StopwordFilter::new(StopwordTier::Small).with_case_sensitive(true);
        assert!(filter.is_stopword("the"));
        assert!(!filter.is_stopword("The"));
    }
}
