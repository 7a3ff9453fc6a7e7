//! Compressed Sparse Row (CSR) graph representation
//!
//! The rank engine pulls mass into each node from its predecessors, so the
//! rows here hold *incoming* edges: node i's row lists every `(source,
//! weight)` with an edge `source -> i`. Each source's total outgoing weight
//! (over the whole input graph, not just the selected node set) is stored
//! alongside, which is the normalizer of the random walk.

use crate::pagerank::WeightedGraph;
use crate::types::TokenId;
use rustc_hash::FxHashMap;

/// Incoming-edge CSR over a fixed node set
#[derive(Debug, Clone)]
pub struct CsrGraph {
    /// Number of nodes
    pub num_nodes: usize,
    /// Row pointers: node i's incoming edges are at row_ptr[i]..row_ptr[i+1]
    pub row_ptr: Vec<usize>,
    /// Source node indices for each incoming edge
    pub col_idx: Vec<u32>,
    /// Edge weights
    pub weights: Vec<f64>,
    /// Total outgoing weight for each node
    pub total_weight: Vec<f64>,
    /// Term id of each node
    pub ids: Vec<TokenId>,
}

impl CsrGraph {
    /// Convert a weighted graph into incoming-edge CSR form
    ///
    /// Only edges between members of `nodes` become rows; edges leaving the
    /// set still count towards the source's total outgoing weight.
    pub fn from_graph<G: WeightedGraph + ?Sized>(graph: &G, nodes: &[TokenId]) -> Self {
        let num_nodes = nodes.len();
        let index: FxHashMap<TokenId, u32> = nodes
            .iter()
            .enumerate()
            .map(|(i, &id)| (id, i as u32))
            .collect();

        let mut incoming: Vec<Vec<(u32, f64)>> = vec![Vec::new(); num_nodes];
        let mut total_weight: Vec<f64> = Vec::with_capacity(num_nodes);

        for (source_idx, &source) in nodes.iter().enumerate() {
            let edges = graph.out_edges(source);
            total_weight.push(edges.iter().map(|(_, w)| w).sum());

            for (target, weight) in edges {
                if let Some(&target_idx) = index.get(&target) {
                    incoming[target_idx as usize].push((source_idx as u32, weight));
                }
            }
        }

        let mut row_ptr = Vec::with_capacity(num_nodes + 1);
        let mut col_idx = Vec::new();
        let mut weights = Vec::new();
        row_ptr.push(0);

        for row in incoming {
            for (source, weight) in row {
                col_idx.push(source);
                weights.push(weight);
            }
            row_ptr.push(col_idx.len());
        }

        Self {
            num_nodes,
            row_ptr,
            col_idx,
            weights,
            total_weight,
            ids: nodes.to_vec(),
        }
    }

    /// Iterate over the predecessors of a node
    pub fn incoming(&self, node: u32) -> impl Iterator<Item = (u32, f64)> + '_ {
        let start = self.row_ptr[node as usize];
        let end = self.row_ptr[node as usize + 1];
        (start..end).map(move |i| (self.col_idx[i], self.weights[i]))
    }

    /// Get the total outgoing weight of a node
    pub fn node_total_weight(&self, node: u32) -> f64 {
        self.total_weight[node as usize]
    }

    /// Check if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.num_nodes == 0
    }

    /// Number of edges between selected nodes
    pub fn num_edges(&self) -> usize {
        self.col_idx.len()
    }

    /// Nodes that never pass rank mass on
    pub fn dangling_nodes(&self) -> Vec<u32> {
        (0..self.num_nodes as u32)
            .filter(|&n| self.total_weight[n as usize] <= 0.0)
            .collect()
    }
}

impl Default for CsrGraph {
    fn default() -> Self {
        Self {
            num_nodes: 0,
            row_ptr: vec![0],
            col_idx: Vec::new(),
            weights: Vec::new(),
            total_weight: Vec::new(),
            ids: Vec::new(),
        }
    }
}
