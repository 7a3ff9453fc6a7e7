//! Result cleaning
//!
//! Drops single-word keywords already covered by a longer phrase and, in
//! dependency mode, keeps only the most distinctive keywords by tf-idf.

use crate::types::{Keyword, KeywordMap};
use tracing::debug;

/// Post-processor for assembled keywords
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultCleaner {
    /// Only treat a word as covered when it matches a whole word of the
    /// longer phrase ("car" is then kept next to "carpet cleaning")
    whole_words: bool,
}

impl ResultCleaner {
    /// Create a cleaner using plain substring containment
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: require whole-word containment
    pub fn with_whole_words(mut self, whole_words: bool) -> Self {
        self.whole_words = whole_words;
        self
    }

    /// Clean a result map in place, returning the number of removed keywords
    ///
    /// `keep` is only used in dependency mode: once subsumed words are gone,
    /// the remaining map is cut down to the `keep` keywords with the highest
    /// tf-idf. Callers size `keep` from the map as it was before cleaning, so
    /// subsumed words count toward it and the cut is a no-op whenever
    /// subsumption already brought the map to `keep` or fewer.
    pub fn clean(&self, results: &mut KeywordMap, keep: usize, use_dependency_mode: bool) -> usize {
        let before = results.len();

        let subsumed = self.subsumed(results);
        for key in &subsumed {
            results.remove(key);
        }

        let mut truncated = 0;
        if use_dependency_mode && results.len() > keep {
            let mut ranked: Vec<&Keyword> = results.values().collect();
            ranked.sort_by(|a, b| {
                b.tf_idf()
                    .total_cmp(&a.tf_idf())
                    .then_with(|| b.relevance.total_cmp(&a.relevance))
                    .then_with(|| a.normalized_text.cmp(&b.normalized_text))
            });
            let dropped: Vec<String> = ranked[keep..]
                .iter()
                .map(|kw| kw.normalized_text.clone())
                .collect();
            truncated = dropped.len();
            for key in dropped {
                results.remove(&key);
            }
        }

        debug!(
            subsumed = subsumed.len(),
            truncated,
            remaining = results.len(),
            "keywords cleaned"
        );

        before - results.len()
    }

    /// Keys of single-word keywords contained in a longer keyword
    ///
    /// Decided against a snapshot, so removal order does not matter.
    fn subsumed(&self, results: &KeywordMap) -> Vec<String> {
        let phrases: Vec<&str> = results
            .values()
            .filter(|kw| kw.word_count() > 1)
            .map(|kw| kw.normalized_text.as_str())
            .collect();

        results
            .values()
            .filter(|kw| kw.word_count() == 1)
            .filter(|kw| phrases.iter().any(|p| self.contains(p, &kw.normalized_text)))
            .map(|kw| kw.normalized_text.clone())
            .collect()
    }

    fn contains(&self, phrase: &str, word: &str) -> bool {
        if self.whole_words {
            phrase.split_whitespace().any(|w| w == word)
        } else {
            phrase.contains(word)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results(entries: &[(&str, f64, f64)]) -> KeywordMap {
        entries
            .iter()
            .map(|&(text, tf, idf)| {
                let kw = Keyword::new(text, 0.1, tf, idf, 1);
                (kw.normalized_text.clone(), kw)
            })
            .collect()
    }

    #[test]
    fn test_single_words_subsumed() {
        let mut map = results(&[
            ("computer", 1.0, 1.0),
            ("general purpose computer", 3.0, 3.0),
            ("purpose", 1.0, 1.0),
            ("network", 1.0, 1.0),
        ]);

        let removed = ResultCleaner::new().clean(&mut map, 0, false);
        assert_eq!(removed, 2);
        assert!(map.contains_key("general purpose computer"));
        assert!(map.contains_key("network"));
        assert!(!map.contains_key("computer"));
    }

    #[test]
    fn test_substring_versus_whole_word() {
        let entries = [("car", 1.0, 1.0), ("carpet cleaning", 2.0, 2.0)];

        let mut map = results(&entries);
        ResultCleaner::new().clean(&mut map, 0, false);
        assert!(!map.contains_key("car"));

        let mut map = results(&entries);
        ResultCleaner::new().with_whole_words(true).clean(&mut map, 0, false);
        assert!(map.contains_key("car"));
    }

    #[test]
    fn test_multi_word_phrases_never_subsumed() {
        let mut map = results(&[("neural network", 2.0, 2.0), ("deep neural network", 3.0, 3.0)]);
        assert_eq!(ResultCleaner::new().clean(&mut map, 0, false), 0);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_dependency_mode_keeps_top_tf_idf() {
        let mut map = results(&[
            ("alpha", 1.0, 1.0),
            ("beta", 4.0, 1.0),
            ("gamma", 2.0, 1.5),
            ("delta", 1.0, 0.5),
        ]);

        let removed = ResultCleaner::new().clean(&mut map, 2, true);
        assert_eq!(removed, 2);
        assert!(map.contains_key("beta"));
        assert!(map.contains_key("gamma"));
    }

    #[test]
    fn test_truncation_only_in_dependency_mode() {
        let mut map = results(&[("alpha", 1.0, 1.0), ("beta", 4.0, 1.0)]);
        ResultCleaner::new().clean(&mut map, 1, false);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_keep_applies_after_subsumption() {
        let mut map = results(&[
            ("graph", 1.0, 1.0),
            ("graph ranking", 3.0, 2.0),
            ("vertex", 2.0, 1.0),
            ("weights", 1.0, 0.5),
        ]);

        // Sized from the four keywords before cleaning; "graph" is subsumed
        let removed = ResultCleaner::new().clean(&mut map, 3, true);
        assert_eq!(removed, 1);
        assert_eq!(map.len(), 3);
        assert!(!map.contains_key("graph"));
        assert!(map.contains_key("weights"));

        let mut map = results(&[
            ("graph", 1.0, 1.0),
            ("graph ranking", 3.0, 2.0),
            ("vertex", 2.0, 1.0),
            ("weights", 1.0, 0.5),
        ]);
        let removed = ResultCleaner::new().clean(&mut map, 2, true);
        assert_eq!(removed, 2);
        assert!(map.contains_key("graph ranking"));
        assert!(map.contains_key("vertex"));
    }
}
