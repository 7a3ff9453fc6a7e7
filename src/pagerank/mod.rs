//! Rank engine
//!
//! A damped random-walk fixed point over any weighted graph. The engine only
//! sees graphs through [`WeightedGraph`], so the same code ranks a freshly
//! built co-occurrence graph and a graph loaded from elsewhere.

pub mod standard;

use crate::errors::{KeywordError, Result};
use crate::types::TokenId;
use rustc_hash::FxHashMap;

/// Read-only view of a directed, weighted graph
pub trait WeightedGraph {
    /// All nodes, in a stable order
    fn node_ids(&self) -> Vec<TokenId>;

    /// Outgoing `(target, weight)` pairs of a node, in a stable order
    fn out_edges(&self, node: TokenId) -> Vec<(TokenId, f64)>;
}

/// Numeric options of the rank engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankOptions {
    /// Damping factor, exclusive range (0, 1)
    pub damping: f64,
    /// Hard upper bound on iterations
    pub max_iterations: usize,
    /// Early-stop bound on the largest per-node change; 0 disables it
    pub threshold: f64,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            damping: 0.85,
            max_iterations: 30,
            threshold: 0.0001,
        }
    }
}

impl RankOptions {
    pub fn validate(&self) -> Result<()> {
        if !(self.damping > 0.0 && self.damping < 1.0) {
            return Err(KeywordError::invalid_config(format!(
                "damping must be in (0, 1), got {}",
                self.damping
            )));
        }
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(KeywordError::invalid_config(format!(
                "convergence threshold must be a finite value >= 0, got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

/// Relevance score per node, in node order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankMap {
    ids: Vec<TokenId>,
    scores: Vec<f64>,
    index: FxHashMap<TokenId, usize>,
}

impl RankMap {
    /// Pair up nodes and their scores
    pub fn new(ids: Vec<TokenId>, scores: Vec<f64>) -> Self {
        debug_assert_eq!(ids.len(), scores.len());
        let index = ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();
        Self { ids, scores, index }
    }

    /// Score of a node, if it was ranked
    pub fn get(&self, node: TokenId) -> Option<f64> {
        self.index.get(&node).map(|&i| self.scores[i])
    }

    /// Score of a node, 0.0 when it was not ranked
    pub fn score(&self, node: TokenId) -> f64 {
        self.get(node).unwrap_or(0.0)
    }

    pub fn contains(&self, node: TokenId) -> bool {
        self.index.contains_key(&node)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Iterate over `(node, score)` in node order
    pub fn iter(&self) -> impl Iterator<Item = (TokenId, f64)> + '_ {
        self.ids.iter().copied().zip(self.scores.iter().copied())
    }

    /// Total rank mass
    pub fn sum(&self) -> f64 {
        self.scores.iter().sum()
    }

    /// Get top N nodes by score; ties keep node order
    pub fn top_n(&self, n: usize) -> Vec<(TokenId, f64)> {
        let mut ranked: Vec<_> = self.iter().collect();
        // sort_by is stable
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(n);
        ranked
    }
}

/// Result of a rank computation
#[derive(Debug, Clone, Default)]
pub struct RankResult {
    pub ranks: RankMap,
    /// Number of iterations performed
    pub iterations: usize,
    /// Largest per-node change in the last iteration
    pub delta: f64,
    /// Whether the early-stop condition was met
    pub converged: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_options_validation() {
        assert!(RankOptions::default().validate().is_ok());
        let bad = RankOptions {
            damping: 1.0,
            ..RankOptions::default()
        };
        assert!(bad.validate().is_err());
        let bad = RankOptions {
            threshold: f64::NAN,
            ..RankOptions::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_rank_map_lookup() {
        let ranks = RankMap::new(vec![TokenId(4), TokenId(2)], vec![0.25, 0.75]);
        assert_eq!(ranks.get(TokenId(2)), Some(0.75));
        assert_eq!(ranks.get(TokenId(9)), None);
        assert_eq!(ranks.score(TokenId(9)), 0.0);
        assert!((ranks.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_top_n_ties_keep_order() {
        let ranks = RankMap::new(
            vec![TokenId(1), TokenId(2), TokenId(3), TokenId(4)],
            vec![0.1, 0.3, 0.3, 0.3],
        );
        let top = ranks.top_n(2);
        assert_eq!(top, vec![(TokenId(2), 0.3), (TokenId(3), 0.3)]);
        assert_eq!(ranks.top_n(10).len(), 4);
    }
}
