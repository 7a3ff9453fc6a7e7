//! Typed outputs of an evaluation run

use crate::types::{ranked_keywords, Keyword, KeywordMap};
use serde::Serialize;

/// Counters collected while evaluating one document
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EvaluationStats {
    /// Nodes of the co-occurrence graph
    pub node_count: usize,
    /// Directed edges of the co-occurrence graph
    pub edge_count: usize,
    /// Rank iterations performed
    pub iterations: usize,
    /// Whether ranking stopped on the convergence threshold
    pub converged: bool,
    /// Phrases and entities registered by the assembler
    pub registered: usize,
    /// Keywords removed by the result cleaner
    pub removed: usize,
}

/// Keywords of one document plus the run's counters
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    pub keywords: KeywordMap,
    pub stats: EvaluationStats,
}

impl Evaluation {
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    /// Keywords sorted by relevance descending, ties by text
    pub fn ranked(&self) -> Vec<&Keyword> {
        ranked_keywords(&self.keywords)
    }

    /// Top N keywords by relevance
    pub fn top_n(&self, n: usize) -> Vec<&Keyword> {
        let mut ranked = self.ranked();
        ranked.truncate(n);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranked_order() {
        let mut evaluation = Evaluation::default();
        for (text, relevance) in [("beta", 0.5), ("alpha", 0.5), ("gamma", 0.9)] {
            let kw = Keyword::new(text, relevance, 1.0, 1.0, 1);
            evaluation.keywords.insert(kw.normalized_text.clone(), kw);
        }

        let texts: Vec<_> = evaluation.ranked().iter().map(|k| k.normalized_text.as_str()).collect();
        assert_eq!(texts, vec!["gamma", "alpha", "beta"]);
        assert_eq!(evaluation.top_n(1)[0].normalized_text, "gamma");
        assert_eq!(evaluation.len(), 3);
    }
}
