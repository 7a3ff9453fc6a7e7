//! Inverse document frequency sources
//!
//! Corpus statistics live with the persistent store, not in a single
//! evaluation run, so the phrase assembler asks an [`IdfSource`] for them.

use crate::types::TokenOccurrence;
use rustc_hash::FxHashMap;

/// Supplies the inverse document frequency of a term
pub trait IdfSource {
    fn idf(&self, token: &TokenOccurrence) -> f64;
}

/// Every term gets idf 1.0, so tf-idf reduces to tf
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformIdf;

impl IdfSource for UniformIdf {
    #[inline]
    fn idf(&self, _token: &TokenOccurrence) -> f64 {
        1.0
    }
}

/// Smoothed idf over a document-frequency table keyed by lowercase value
///
/// `idf = ln((1 + N) / (1 + df)) + 1`, which stays positive for terms seen
/// in every document and for unseen terms.
#[derive(Debug, Clone, Default)]
pub struct CorpusIdf {
    document_count: usize,
    document_frequencies: FxHashMap<String, usize>,
}

impl CorpusIdf {
    pub fn new(document_count: usize) -> Self {
        Self {
            document_count,
            document_frequencies: FxHashMap::default(),
        }
    }

    /// Build from the distinct term values of each document in a corpus
    pub fn from_documents<I, D, S>(documents: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut idf = Self::new(0);
        for terms in documents {
            idf.document_count += 1;
            let mut seen: Vec<String> = terms
                .into_iter()
                .map(|t| t.as_ref().to_lowercase())
                .collect();
            seen.sort_unstable();
            seen.dedup();
            for term in seen {
                *idf.document_frequencies.entry(term).or_insert(0) += 1;
            }
        }
        idf
    }

    /// Builder method: set the document frequency of one term
    pub fn with_document_frequency(mut self, term: &str, df: usize) -> Self {
        self.document_frequencies.insert(term.to_lowercase(), df);
        self
    }

    pub fn document_count(&self) -> usize {
        self.document_count
    }

    /// Smoothed idf of a raw term value
    pub fn idf_of(&self, term: &str) -> f64 {
        let df = self
            .document_frequencies
            .get(&term.to_lowercase())
            .copied()
            .unwrap_or(0);
        ((1.0 + self.document_count as f64) / (1.0 + df as f64)).ln() + 1.0
    }
}

impl IdfSource for CorpusIdf {
    fn idf(&self, token: &TokenOccurrence) -> f64 {
        self.idf_of(&token.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_idf() {
        let token = TokenOccurrence::new(1, "anything", 0, 8);
        assert_eq!(UniformIdf.idf(&token), 1.0);
    }

    #[test]
    fn test_rare_terms_score_higher() {
        let idf = CorpusIdf::from_documents(vec![
            vec!["computer", "science"],
            vec!["computer", "graphics"],
            vec!["computer", "science", "science"],
        ]);

        assert_eq!(idf.document_count(), 3);
        let common = idf.idf_of("computer");
        let rare = idf.idf_of("graphics");
        let unseen = idf.idf_of("biology");
        assert!((common - 1.0).abs() < 1e-12);
        assert!(rare > common);
        assert!(unseen > rare);
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let idf = CorpusIdf::new(10).with_document_frequency("Rust", 2);
        let token = TokenOccurrence::new(1, "rust", 0, 4);
        assert!((idf.idf(&token) - idf.idf_of("RUST")).abs() < 1e-12);
    }
}
