//! Standard rank iteration
//!
//! Pull-style power iteration: every pass recomputes each node's score as
//! a fold over its incoming edges. Nodes whose total outgoing weight is
//! zero contribute nothing and are never divided by.

use super::{RankMap, RankOptions, RankResult, WeightedGraph};
use crate::graph::csr::CsrGraph;
use crate::types::TokenId;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tracing::trace;

/// Graphs at least this large rank their nodes in parallel
const PARALLEL_THRESHOLD: usize = 1000;

/// Damped random-walk rank engine
#[derive(Debug, Clone, Default)]
pub struct RankEngine {
    options: RankOptions,
}

impl RankEngine {
    /// Create an engine; `options` are expected to be validated
    pub fn new(options: RankOptions) -> Self {
        Self { options }
    }

    /// Set the damping factor
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.options.damping = damping;
        self
    }

    /// Set the maximum iterations
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.options.max_iterations = max_iterations;
        self
    }

    /// Set the convergence threshold
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.options.threshold = threshold;
        self
    }

    /// Rank the nodes of a graph
    ///
    /// `node_weights` selects the participating nodes; `None` ranks every
    /// node of the graph. Runs until the largest per-node change is within
    /// the threshold or the iteration cap is reached, whichever comes first.
    pub fn rank<G: WeightedGraph + ?Sized>(
        &self,
        graph: &G,
        node_weights: Option<&FxHashMap<TokenId, f64>>,
    ) -> RankResult {
        let nodes = Self::node_set(graph, node_weights);
        let csr = CsrGraph::from_graph(graph, &nodes);
        self.run(&csr)
    }

    /// Run the iteration on a prepared CSR graph
    pub fn run(&self, graph: &CsrGraph) -> RankResult {
        let n = graph.num_nodes;
        if n == 0 {
            return RankResult {
                converged: true,
                ..RankResult::default()
            };
        }

        let RankOptions {
            damping,
            max_iterations,
            threshold,
        } = self.options;
        let teleport = (1.0 - damping) / n as f64;

        let mut scores = vec![teleport; n];
        let mut iterations = 0;
        let mut delta = 0.0;
        let mut converged = false;

        while iterations < max_iterations {
            iterations += 1;

            let new_scores = Self::step(graph, &scores, damping, teleport);
            delta = scores
                .iter()
                .zip(&new_scores)
                .fold(0.0_f64, |max, (old, new)| max.max((old - new).abs()));
            scores = new_scores;

            trace!(iteration = iterations, delta, "rank iteration");

            if threshold > 0.0 && delta <= threshold {
                converged = true;
                break;
            }
        }

        RankResult {
            ranks: RankMap::new(graph.ids.clone(), scores),
            iterations,
            delta,
            converged,
        }
    }

    /// One pass: `new[e] = teleport + d * sum(rank[i] * w(i, e) / out(i))`
    fn step(graph: &CsrGraph, scores: &[f64], damping: f64, teleport: f64) -> Vec<f64> {
        let pull = |node: usize| -> f64 {
            let incoming = graph
                .incoming(node as u32)
                .fold(0.0, |acc, (source, weight)| {
                    let total = graph.node_total_weight(source);
                    if total > 0.0 {
                        acc + scores[source as usize] * weight / total
                    } else {
                        acc
                    }
                });
            teleport + damping * incoming
        };

        if graph.num_nodes >= PARALLEL_THRESHOLD {
            (0..graph.num_nodes).into_par_iter().map(pull).collect()
        } else {
            (0..graph.num_nodes).map(pull).collect()
        }
    }

    /// Participating nodes: weighted nodes in graph order, then weighted
    /// nodes absent from the graph by id
    fn node_set<G: WeightedGraph + ?Sized>(
        graph: &G,
        node_weights: Option<&FxHashMap<TokenId, f64>>,
    ) -> Vec<TokenId> {
        let all = graph.node_ids();
        let Some(weights) = node_weights else {
            return all;
        };

        let mut nodes: Vec<TokenId> = all
            .iter()
            .copied()
            .filter(|id| weights.contains_key(id))
            .collect();
        let mut extra: Vec<TokenId> = weights
            .keys()
            .copied()
            .filter(|id| !all.contains(id))
            .collect();
        extra.sort_unstable();
        nodes.extend(extra);
        nodes
    }
}
